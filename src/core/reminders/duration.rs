// Duration parsing for reminders.
//
// Accepts compact forms ("30m", "2h", "1d", "1w", "45s") and verbose forms in
// English or Indonesian ("30 minutes", "2 jam", "10 menit", "1 hari").

use std::time::Duration;

pub const MIN_REMINDER: Duration = Duration::from_secs(60);
pub const MAX_REMINDER: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Parse a duration string like "30 minutes", "2h" or "1 hari".
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    parse_compact_format(&input).or_else(|| parse_verbose_format(&input))
}

/// Parse compact formats like "30m", "2h", "1d", "45s".
fn parse_compact_format(input: &str) -> Option<Duration> {
    let split = input.find(|c: char| !c.is_ascii_digit())?;
    let (num_str, unit) = input.split_at(split);
    if num_str.is_empty() {
        return None;
    }

    let multiplier = match unit.trim() {
        "s" => 1,
        "m" => 60,
        "h" | "j" => 3600,
        "d" => 86400,
        "w" => 604800,
        _ => return None,
    };

    let number: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(number.checked_mul(multiplier)?))
}

/// Parse verbose formats like "30 minutes", "2 jam", "1 hari".
fn parse_verbose_format(input: &str) -> Option<Duration> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.len() != 2 {
        return None;
    }

    let number: u64 = parts[0].parse().ok()?;
    let multiplier = match parts[1] {
        "second" | "seconds" | "sec" | "secs" | "detik" => 1,
        "minute" | "minutes" | "min" | "mins" | "menit" => 60,
        "hour" | "hours" | "hr" | "hrs" | "jam" => 3600,
        "day" | "days" | "hari" => 86400,
        "week" | "weeks" | "minggu" | "pekan" => 604800,
        _ => return None,
    };

    Some(Duration::from_secs(number.checked_mul(multiplier)?))
}

/// Whether a reminder delay is within the allowed window.
pub fn is_allowed_reminder_delay(duration: Duration) -> bool {
    (MIN_REMINDER..=MAX_REMINDER).contains(&duration)
}

/// Format a duration for humans, e.g. "2 jam 5 menit".
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        return format!("{} detik", total_secs);
    }
    if total_secs < 3600 {
        return format!("{} menit", total_secs / 60);
    }
    if total_secs < 86400 {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        return if mins > 0 {
            format!("{} jam {} menit", hours, mins)
        } else {
            format!("{} jam", hours)
        };
    }

    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    if hours > 0 {
        format!("{} hari {} jam", days, hours)
    } else {
        format!("{} hari", days)
    }
}
