// Flood detection - too many messages from one member in a short window.
//
// Timestamps live in memory only. A restart forgets the window, which at
// ten seconds costs nothing.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;

pub const FLOOD_WINDOW_SECONDS: i64 = 10;
/// More messages than this inside the window counts as flooding.
pub const FLOOD_MAX_MESSAGES: usize = 5;

pub struct AntiSpamService {
    window: Duration,
    max_messages: usize,
    history: DashMap<(u64, u64), VecDeque<DateTime<Utc>>>,
}

impl AntiSpamService {
    pub fn new() -> Self {
        Self::with_limits(Duration::seconds(FLOOD_WINDOW_SECONDS), FLOOD_MAX_MESSAGES)
    }

    pub fn with_limits(window: Duration, max_messages: usize) -> Self {
        Self {
            window,
            max_messages,
            history: DashMap::new(),
        }
    }

    /// Record a message and report whether the member is now flooding.
    ///
    /// A positive verdict clears the member's window so the next burst is
    /// counted from scratch.
    pub fn record_message(&self, guild_id: u64, user_id: u64, at: DateTime<Utc>) -> bool {
        let key = (guild_id, user_id);
        let flooding = {
            let mut times = self.history.entry(key).or_default();
            times.push_back(at);
            while times
                .front()
                .is_some_and(|first| at - *first >= self.window)
            {
                times.pop_front();
            }
            times.len() > self.max_messages
        };

        if flooding {
            self.history.remove(&key);
        }
        flooding
    }

    /// Drop windows whose newest message is older than the window.
    pub fn prune(&self, now: DateTime<Utc>) {
        self.history.retain(|_, times| {
            times
                .back()
                .is_some_and(|last| now - *last < self.window)
        });
    }

    pub fn tracked_members(&self) -> usize {
        self.history.len()
    }
}

impl Default for AntiSpamService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn five_messages_are_fine_the_sixth_floods() {
        let service = AntiSpamService::new();
        for i in 0..5 {
            assert!(!service.record_message(1, 2, at(i)));
        }
        assert!(service.record_message(1, 2, at(5)));
    }

    #[test]
    fn messages_outside_the_window_do_not_count() {
        let service = AntiSpamService::new();
        for i in 0..5 {
            assert!(!service.record_message(1, 2, at(i)));
        }
        // The first message is exactly ten seconds old and has left the window.
        assert!(!service.record_message(1, 2, at(10)));
        assert!(!service.record_message(1, 2, at(30)));
    }

    #[test]
    fn members_and_guilds_are_counted_separately() {
        let service = AntiSpamService::new();
        for i in 0..5 {
            assert!(!service.record_message(1, 2, at(i)));
            assert!(!service.record_message(1, 3, at(i)));
            assert!(!service.record_message(9, 2, at(i)));
        }
        assert_eq!(service.tracked_members(), 3);
    }

    #[test]
    fn a_flood_resets_the_window() {
        let service = AntiSpamService::with_limits(Duration::seconds(10), 2);
        assert!(!service.record_message(1, 2, at(0)));
        assert!(!service.record_message(1, 2, at(1)));
        assert!(service.record_message(1, 2, at(2)));
        assert!(!service.record_message(1, 2, at(3)));
    }

    #[test]
    fn prune_drops_idle_members() {
        let service = AntiSpamService::new();
        service.record_message(1, 2, at(0));
        service.record_message(1, 3, at(8));
        service.prune(at(12));
        assert_eq!(service.tracked_members(), 1);
    }
}
