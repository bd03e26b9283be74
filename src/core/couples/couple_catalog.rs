// Static couple content: gifts, milestones, date ideas and compatibility
// blurbs, plus the small formatting helpers shared by the couple embeds.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gift {
    pub key: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub cost: i64,
    pub love: i64,
    pub description: &'static str,
}

pub const GIFTS: [Gift; 5] = [
    Gift {
        key: "flowers",
        name: "Bukiet Bunga",
        emoji: "💐",
        cost: 250,
        love: 35,
        description: "Harum bunga pilihan untuk mengawali hari pasanganmu.",
    },
    Gift {
        key: "chocolate",
        name: "Cokelat Artisan",
        emoji: "🍫",
        cost: 420,
        love: 55,
        description: "Sekotak cokelat premium dengan kartu ucapan manis.",
    },
    Gift {
        key: "stars",
        name: "Lampu Bintang",
        emoji: "🌟",
        cost: 650,
        love: 75,
        description: "Proyektor galaksi untuk menemani malam panjang kalian.",
    },
    Gift {
        key: "ring",
        name: "Cincin Janji",
        emoji: "💍",
        cost: 900,
        love: 110,
        description: "Simbol komitmen baru yang penuh makna.",
    },
    Gift {
        key: "vacation",
        name: "Staycation Romantis",
        emoji: "🏖️",
        cost: 1400,
        love: 150,
        description: "Liburan singkat untuk mengisi ulang energi cinta kalian.",
    },
];

pub fn find_gift(key: &str) -> Option<&'static Gift> {
    GIFTS.iter().find(|g| g.key.eq_ignore_ascii_case(key.trim()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneKind {
    LovePoints,
    Streak,
    Memories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneDef {
    pub key: &'static str,
    pub kind: MilestoneKind,
    pub threshold: i64,
    pub title: &'static str,
    pub description: &'static str,
}

pub const MILESTONES: [MilestoneDef; 7] = [
    MilestoneDef {
        key: "love_200",
        kind: MilestoneKind::LovePoints,
        threshold: 200,
        title: "Benih Cinta",
        description: "Mengumpulkan 200 love points pertama kalian.",
    },
    MilestoneDef {
        key: "love_500",
        kind: MilestoneKind::LovePoints,
        threshold: 500,
        title: "Cinta Membara",
        description: "Menembus 500 love points!",
    },
    MilestoneDef {
        key: "love_1000",
        kind: MilestoneKind::LovePoints,
        threshold: 1000,
        title: "Legenda Asmara",
        description: "1.000 love points, bukti cinta yang tak tergoyahkan.",
    },
    MilestoneDef {
        key: "streak_3",
        kind: MilestoneKind::Streak,
        threshold: 3,
        title: "Trio Hari Bahagia",
        description: "Check-in bareng selama 3 hari berturut-turut.",
    },
    MilestoneDef {
        key: "streak_7",
        kind: MilestoneKind::Streak,
        threshold: 7,
        title: "Minggu Mesra",
        description: "Menjaga check-in harian selama satu minggu penuh.",
    },
    MilestoneDef {
        key: "memory_5",
        kind: MilestoneKind::Memories,
        threshold: 5,
        title: "Album Kasih",
        description: "Mencatat 5 memori romantis dalam jurnal cinta.",
    },
    MilestoneDef {
        key: "memory_15",
        kind: MilestoneKind::Memories,
        threshold: 15,
        title: "Sejuta Cerita",
        description: "Mencapai 15 memori penuh kehangatan.",
    },
];

pub fn find_milestone(key: &str) -> Option<&'static MilestoneDef> {
    MILESTONES.iter().find(|m| m.key == key)
}

pub const DATE_IDEAS: [&str; 10] = [
    "Masak resep baru bersama sambil memutar playlist nostalgia.",
    "Tulis surat cinta lalu bacakan bergantian di voice channel.",
    "Jadwalkan movie night dengan voting film favorit komunitas.",
    "Keliling kota virtual dengan mengganti foto profil dan status tematik.",
    "Lakukan sesi foto screenshot lucu di server dengan filter bot kamera.",
    "Mainkan truth or dare ringan khusus pasangan di channel privat.",
    "Buat daftar impian masa depan kalian dan pin di memori pasangan.",
    "Adakan piknik digital: share wallpaper pemandangan dan cerita kenangan.",
    "Bangun playlist duet dan dengarkan bareng.",
    "Susun bucket list traveling dan voting destinasi favorit komunitas.",
];

pub fn random_date_idea() -> &'static str {
    DATE_IDEAS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DATE_IDEAS[0])
}

const COMPATIBILITY: [(u8, &str); 5] = [
    (30, "Chemistry kalian masih perlu dipupuk, tapi potensinya besar!"),
    (60, "Sudah lumayan serasi, tetap rajin check-in ya!"),
    (80, "Kalian pasangan yang solid dan saling memahami."),
    (95, "Soulmate alert! Cinta kalian bikin server iri."),
    (101, "Definisi pasangan goals. Jagalah kebersamaan ini selamanya!"),
];

/// Blurb for the first threshold the score is below.
pub fn compatibility_message(score: u8) -> &'static str {
    COMPATIBILITY
        .iter()
        .find(|(threshold, _)| score < *threshold)
        .map(|(_, message)| *message)
        .unwrap_or(COMPATIBILITY[COMPATIBILITY.len() - 1].1)
}

// ============================================================================
// FORMATTING
// ============================================================================

/// "X jam Y menit", dropping zero parts; "Z detik" when under a minute.
pub fn format_timedelta(delta: Duration) -> String {
    let total = delta.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} jam", hours));
    }
    if minutes > 0 {
        parts.push(format!("{} menit", minutes));
    }
    if parts.is_empty() {
        parts.push(format!("{} detik", seconds));
    }
    parts.join(" ")
}

/// Time together as years/months/days (365 and 30 day units).
pub fn format_duration_since(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - start).num_days().max(0);
    let years = days / 365;
    let months = (days % 365) / 30;
    let days = (days % 365) % 30;

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{} tahun", years));
    }
    if months > 0 {
        parts.push(format!("{} bulan", months));
    }
    if days > 0 {
        parts.push(format!("{} hari", days));
    }
    if parts.is_empty() {
        return "baru saja".to_string();
    }
    parts.join(", ")
}

/// Accept `#abc`, `abc`, `#aabbcc` or `aabbcc`; return `#AABBCC`.
pub fn normalize_hex_color(value: &str) -> Option<String> {
    let cleaned = value.trim().trim_start_matches('#');
    if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded = match cleaned.len() {
        3 => cleaned.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => cleaned.to_string(),
        _ => return None,
    };
    Some(format!("#{}", expanded.to_uppercase()))
}

/// Parse a normalized `#RRGGBB` colour into an embed colour value.
pub fn color_from_hex(value: Option<&str>) -> Option<u32> {
    u32::from_str_radix(value?.trim_start_matches('#'), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn gift_lookup_is_case_insensitive() {
        let ring = find_gift(" Ring ").unwrap();
        assert_eq!(ring.cost, 900);
        assert_eq!(ring.love, 110);
        assert!(find_gift("car").is_none());
    }

    #[test]
    fn compatibility_thresholds() {
        assert_eq!(compatibility_message(0), COMPATIBILITY[0].1);
        assert_eq!(compatibility_message(29), COMPATIBILITY[0].1);
        assert_eq!(compatibility_message(30), COMPATIBILITY[1].1);
        assert_eq!(compatibility_message(80), COMPATIBILITY[3].1);
        assert_eq!(compatibility_message(95), COMPATIBILITY[4].1);
        assert_eq!(compatibility_message(100), COMPATIBILITY[4].1);
    }

    #[test]
    fn date_idea_comes_from_catalog() {
        assert!(DATE_IDEAS.contains(&random_date_idea()));
    }

    #[test]
    fn timedelta_formatting() {
        assert_eq!(format_timedelta(Duration::seconds(42)), "42 detik");
        assert_eq!(format_timedelta(Duration::minutes(5)), "5 menit");
        assert_eq!(format_timedelta(Duration::hours(3)), "3 jam");
        assert_eq!(
            format_timedelta(Duration::hours(19) + Duration::minutes(59)),
            "19 jam 59 menit"
        );
    }

    #[test]
    fn duration_since_formatting() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_duration_since(start, start), "baru saja");
        assert_eq!(
            format_duration_since(start, start + Duration::days(400)),
            "1 tahun, 1 bulan, 5 hari"
        );
        assert_eq!(format_duration_since(start, start + Duration::days(60)), "2 bulan");
    }

    #[test]
    fn hex_colors_are_normalized() {
        assert_eq!(normalize_hex_color("#f6a"), Some("#FF66AA".to_string()));
        assert_eq!(normalize_hex_color("ff66aa"), Some("#FF66AA".to_string()));
        assert_eq!(normalize_hex_color("#12345"), None);
        assert_eq!(normalize_hex_color("zzz"), None);
        assert_eq!(color_from_hex(Some("#FF66AA")), Some(0xFF66AA));
        assert_eq!(color_from_hex(None), None);
    }
}
