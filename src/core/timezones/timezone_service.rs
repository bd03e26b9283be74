// Time zone helpers behind `/timestamp`, `/announce schedule` and
// `/setup timezone`.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M",
];
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

const TZ_ALIASES: [(&str, &str); 11] = [
    ("WIB", "Asia/Jakarta"),
    ("WITA", "Asia/Makassar"),
    ("WIT", "Asia/Jayapura"),
    ("JAKARTA", "Asia/Jakarta"),
    ("JKT", "Asia/Jakarta"),
    ("ICT", "Asia/Bangkok"),
    ("SGP", "Asia/Singapore"),
    ("MAL", "Asia/Kuala_Lumpur"),
    ("KUALA", "Asia/Kuala_Lumpur"),
    ("UTC", "UTC"),
    ("GMT", "UTC"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimezoneError {
    #[error("Zona waktu '{0}' tidak dikenali.")]
    Unknown(String),

    #[error("Offset zona waktu '{0}' tidak valid.")]
    InvalidOffset(String),

    #[error("Waktu tidak boleh kosong.")]
    EmptyInput,

    #[error("Format waktu tidak dikenali. Gunakan format seperti '2025-01-31 19:45' atau '31-01-2025 19:45'.")]
    UnrecognizedFormat,

    #[error("Waktu tersebut tidak ada di zona waktu yang dipilih.")]
    NonexistentLocalTime,
}

/// Either an IANA zone or a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTz {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ResolvedTz {
    /// Interpret a wall-clock time in this zone. For repeated times
    /// (DST fall-back) the earlier instant wins.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, TimezoneError> {
        match self {
            ResolvedTz::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&dt.offset().fix()))
                .ok_or(TimezoneError::NonexistentLocalTime),
            ResolvedTz::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .ok_or(TimezoneError::NonexistentLocalTime),
        }
    }

    pub fn convert(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            ResolvedTz::Named(tz) => {
                let local = instant.with_timezone(tz);
                local.with_timezone(&local.offset().fix())
            }
            ResolvedTz::Fixed(offset) => instant.with_timezone(offset),
        }
    }
}

fn offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:UTC|GMT)?\s*([+-])\s*(\d{1,2})(?::?(\d{2}))?$")
            .expect("offset regex is valid")
    })
}

fn lookup_alias(candidate: &str) -> Option<&'static str> {
    let upper = candidate.to_uppercase();
    TZ_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, name)| *name)
}

/// Resolve an IANA name, a common alias (WIB, WITA, WIT, ...) or an offset
/// such as `UTC+7`, `GMT-03:30` or `+0530`. Blank input resolves `fallback`.
pub fn resolve_timezone(name: Option<&str>, fallback: &str) -> Result<ResolvedTz, TimezoneError> {
    let raw = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n,
        None => fallback.trim(),
    };
    let candidate = lookup_alias(raw).unwrap_or(raw);

    if let Ok(tz) = candidate.parse::<Tz>() {
        return Ok(ResolvedTz::Named(tz));
    }

    let caps = offset_regex()
        .captures(candidate)
        .ok_or_else(|| TimezoneError::Unknown(raw.to_string()))?;
    let hours: i32 = caps[2].parse().unwrap_or(99);
    let minutes: i32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).unwrap_or(99);
    if hours > 23 || minutes > 59 {
        return Err(TimezoneError::InvalidOffset(raw.to_string()));
    }
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .map(ResolvedTz::Fixed)
        .ok_or_else(|| TimezoneError::InvalidOffset(raw.to_string()))
}

/// Parse user input in `tz`. A bare date means midnight; a bare time means
/// that time on `reference`'s local date. Input carrying its own offset is
/// converted into `tz`.
pub fn parse_datetime_input(
    value: &str,
    tz: &ResolvedTz,
    reference: DateTime<Utc>,
) -> Result<DateTime<FixedOffset>, TimezoneError> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err(TimezoneError::EmptyInput);
    }

    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(tz.convert(aware.with_timezone(&Utc)));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return tz.localize(naive);
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(raw, fmt) {
            let date = tz.convert(reference).date_naive();
            return tz.localize(date.and_time(time));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or(TimezoneError::UnrecognizedFormat)?;
            return tz.localize(midnight);
        }
    }
    Err(TimezoneError::UnrecognizedFormat)
}

/// The seven Discord timestamp styles for `dt`.
pub fn timestamp_variants<T: TimeZone>(dt: &DateTime<T>) -> Vec<(&'static str, String)> {
    let unix = dt.timestamp();
    [
        ("Short Time", 't'),
        ("Long Time", 'T'),
        ("Short Date", 'd'),
        ("Long Date", 'D'),
        ("Short Date & Time", 'f'),
        ("Long Date & Time", 'F'),
        ("Relative", 'R'),
    ]
    .into_iter()
    .map(|(label, style)| (label, format!("<t:{}:{}>", unix, style)))
    .collect()
}

/// IANA name for named zones, `UTC±HH:MM` for fixed offsets.
pub fn format_timezone_display(tz: &ResolvedTz) -> String {
    match tz {
        ResolvedTz::Named(tz) => tz.name().to_string(),
        ResolvedTz::Fixed(offset) => {
            let total = offset.local_minus_utc();
            let sign = if total >= 0 { '+' } else { '-' };
            let total = total.abs();
            format!("UTC{}{:02}:{:02}", sign, total / 3600, (total % 3600) / 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn jakarta() -> ResolvedTz {
        resolve_timezone(Some("WIB"), "UTC").unwrap()
    }

    #[test]
    fn aliases_and_names_resolve() {
        assert_eq!(jakarta(), ResolvedTz::Named(chrono_tz::Asia::Jakarta));
        assert_eq!(
            resolve_timezone(Some("wita"), "UTC").unwrap(),
            ResolvedTz::Named(chrono_tz::Asia::Makassar)
        );
        assert_eq!(
            resolve_timezone(Some("Europe/Berlin"), "UTC").unwrap(),
            ResolvedTz::Named(chrono_tz::Europe::Berlin)
        );
        assert_eq!(
            resolve_timezone(None, "Asia/Jakarta").unwrap(),
            ResolvedTz::Named(chrono_tz::Asia::Jakarta)
        );
        assert_eq!(
            resolve_timezone(Some("   "), "GMT").unwrap(),
            ResolvedTz::Named(chrono_tz::UTC)
        );
    }

    #[test]
    fn offsets_resolve() {
        let plus7 = resolve_timezone(Some("UTC+7"), "UTC").unwrap();
        assert_eq!(plus7, ResolvedTz::Fixed(FixedOffset::east_opt(7 * 3600).unwrap()));
        assert_eq!(format_timezone_display(&plus7), "UTC+07:00");

        let minus = resolve_timezone(Some("GMT-03:30"), "UTC").unwrap();
        assert_eq!(format_timezone_display(&minus), "UTC-03:30");

        let bare = resolve_timezone(Some("+0530"), "UTC").unwrap();
        assert_eq!(format_timezone_display(&bare), "UTC+05:30");

        assert_eq!(
            resolve_timezone(Some("UTC+24"), "UTC"),
            Err(TimezoneError::InvalidOffset("UTC+24".into()))
        );
        assert_eq!(
            resolve_timezone(Some("Mars/Olympus"), "UTC"),
            Err(TimezoneError::Unknown("Mars/Olympus".into()))
        );
    }

    #[test]
    fn parses_supported_formats() {
        let tz = jakarta();
        let reference = Utc.with_ymd_and_hms(2025, 1, 31, 3, 0, 0).unwrap();

        let full = parse_datetime_input("2025-01-31 19:45", &tz, reference).unwrap();
        assert_eq!(full.timestamp(), Utc.with_ymd_and_hms(2025, 1, 31, 12, 45, 0).unwrap().timestamp());

        let dmy = parse_datetime_input("31/01/2025 19:45", &tz, reference).unwrap();
        assert_eq!(dmy, full);

        let date_only = parse_datetime_input("31-01-2025", &tz, reference).unwrap();
        assert_eq!((date_only.hour(), date_only.minute()), (0, 0));

        let time_only = parse_datetime_input("08:15", &tz, reference).unwrap();
        assert_eq!(time_only.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(time_only.hour(), 8);

        let iso = parse_datetime_input("2025-01-31T12:45:00Z", &tz, reference).unwrap();
        assert_eq!(iso, full);
        assert_eq!(iso.hour(), 19);

        assert_eq!(
            parse_datetime_input("besok pagi", &tz, reference),
            Err(TimezoneError::UnrecognizedFormat)
        );
        assert_eq!(
            parse_datetime_input("  ", &tz, reference),
            Err(TimezoneError::EmptyInput)
        );
    }

    #[test]
    fn timestamp_styles() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let variants = timestamp_variants(&dt);
        assert_eq!(variants.len(), 7);
        assert_eq!(variants[0], ("Short Time", "<t:1735689600:t>".to_string()));
        assert_eq!(variants[6].1, "<t:1735689600:R>");
    }

    #[test]
    fn named_display_is_iana_key() {
        assert_eq!(format_timezone_display(&jakarta()), "Asia/Jakarta");
    }
}
