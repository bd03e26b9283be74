// Discord commands module.
// Each feature gets its own command file.

use crate::discord::{Data, Error};

pub mod announcements;
pub mod audit;
pub mod couples;
pub mod economy;
pub mod fun;
pub mod help;
pub mod info;
pub mod leveling;
pub mod prayer;
pub mod presence;
pub mod reminders;
pub mod setup;
pub mod shop;
pub mod tickets;
pub mod timezones;

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        info::ping(),
        info::userinfo(),
        info::serverinfo(),
        info::botstats(),
        help::help(),
        timezones::timestamp(),
        setup::setup(),
        crate::discord::logging::commands::activitylog(),
        leveling::level(),
        economy::balance(),
        economy::daily(),
        economy::work(),
        economy::transfer(),
        economy::gamble(),
        economy::richest(),
        shop::shop(),
        shop::shopadmin(),
        crate::discord::moderation::commands::moderasi(),
        crate::discord::moderation::commands::automod(),
        tickets::ticket(),
        reminders::reminder(),
        couples::couple(),
        audit::audit(),
        announcements::announce(),
        fun::meme(),
        fun::quote(),
        fun::joke(),
        fun::dice(),
        fun::eight_ball_command(),
        fun::ship(),
        prayer::jadwalsholat(),
        prayer::carijadwalsholat(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn command_names_are_unique() {
        let commands = all();
        let names: HashSet<_> = commands.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names.len(), commands.len());
        assert!(names.contains("8ball"));
    }
}
