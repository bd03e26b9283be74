// Moderation infrastructure - warnings and automod rules in SQLite

mod sqlite_automod_store;
mod sqlite_warn_store;

pub use sqlite_automod_store::SqliteAutomodStore;
pub use sqlite_warn_store::SqliteWarnStore;
