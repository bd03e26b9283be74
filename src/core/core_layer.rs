// The core module contains all business logic.
// Each feature gets its own submodule; nothing here knows about Discord.

#[path = "cache/ttl_cache.rs"]
pub mod cache;

#[path = "config/bot_config.rs"]
pub mod config;

#[path = "content/content_source.rs"]
pub mod content;

#[path = "scheduler/job_scheduler.rs"]
pub mod scheduler;

#[path = "guild_settings/guild_settings_service.rs"]
pub mod guild_settings;

#[path = "leveling/leveling_service.rs"]
pub mod leveling;

#[path = "economy/mod.rs"]
pub mod economy;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "tickets/ticket_service.rs"]
pub mod tickets;

#[path = "reminders/mod.rs"]
pub mod reminders;

#[path = "couples/mod.rs"]
pub mod couples;

#[path = "audit/mod.rs"]
pub mod audit;

#[path = "announcements/mod.rs"]
pub mod announcements;

#[path = "logging/mod.rs"]
pub mod logging;

#[path = "presence/presence_service.rs"]
pub mod presence;

#[path = "timezones/timezone_service.rs"]
pub mod timezones;

#[path = "fun/fun_service.rs"]
pub mod fun;

#[path = "prayer/prayer_service.rs"]
pub mod prayer;
