// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "database.rs"]
pub mod database;

#[path = "http/json_client.rs"]
pub mod http;

#[path = "guild_settings/sqlite_guild_settings_store.rs"]
pub mod guild_settings;

#[path = "leveling/sqlite_store.rs"]
pub mod leveling;

#[path = "economy/mod.rs"]
pub mod economy;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "tickets/sqlite_ticket_store.rs"]
pub mod tickets;

#[path = "reminders/sqlite_reminder_store.rs"]
pub mod reminders;

#[path = "couples/sqlite_couple_store.rs"]
pub mod couples;

#[path = "audit/sqlite_audit_store.rs"]
pub mod audit;

#[path = "announcements/sqlite_announcement_store.rs"]
pub mod announcements;
