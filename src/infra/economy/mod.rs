// Economy infrastructure - SQLite storage for balances and the shop

mod sqlite_coin_store;
mod sqlite_shop_store;

pub use sqlite_coin_store::SqliteCoinStore;
pub use sqlite_shop_store::SqliteShopStore;
