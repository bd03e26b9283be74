// Discord layer - commands, event handlers and scheduled jobs.

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub mod data;

#[path = "leveling/leveling_announcements.rs"]
pub mod leveling_announcements;

pub mod logging {
    pub mod commands;
    pub mod events;
    pub mod formatter;
}

pub mod moderation {
    pub mod automod_handler;
    pub mod commands;
    pub mod spam_handler;
}

pub mod members {
    #[path = "member_events.rs"]
    pub mod events;
}

pub mod jobs {
    pub mod delivery;
}

pub use data::{Context, Data, Error};
