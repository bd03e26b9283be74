// Reminders: duration parsing plus the persisted reminder queue.

pub mod duration;
mod reminder_service;

pub use duration::{format_duration, is_allowed_reminder_delay, parse_duration};
pub use reminder_service::{NewReminder, Reminder, ReminderError, ReminderService, ReminderStore};
