// Daily prayer schedules for Indonesia (MyQuran) and Malaysia (JAKIM zones
// via WaktuSolat), with month payloads and location lookups cached.

use crate::core::cache::TtlCache;
use crate::core::content::{ContentError, ContentSource};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const MYQURAN_BASE: &str = "https://api.myquran.com/v2/sholat";
const WAKTUSOLAT_BASE: &str = "https://api.waktusolat.app";

const SCHEDULE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const LOOKUP_TTL: Duration = Duration::from_secs(12 * 60 * 60);
const MIN_KEYWORD_CHARS: usize = 2;
pub const CHOICE_LABEL_LIMIT: usize = 95;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Indonesia,
    Malaysia,
}

impl Country {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "indonesia" | "id" => Some(Country::Indonesia),
            "malaysia" | "my" => Some(Country::Malaysia),
            _ => None,
        }
    }

    pub fn timezone(&self) -> Tz {
        match self {
            Country::Indonesia => chrono_tz::Asia::Jakarta,
            Country::Malaysia => chrono_tz::Asia::Kuala_Lumpur,
        }
    }

    pub fn source_host(&self) -> &'static str {
        match self {
            Country::Indonesia => "api.myquran.com",
            Country::Malaysia => "api.waktusolat.app",
        }
    }
}

/// One day of prayer times, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerSchedule {
    pub country: Country,
    pub location_code: String,
    pub title: String,
    pub description: String,
    pub times: Vec<(&'static str, String)>,
    pub hijri: Option<String>,
    pub footer: String,
}

/// A city (Indonesia) or JAKIM zone (Malaysia) search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationMatch {
    pub code: String,
    pub name: String,
    pub detail: Option<String>,
}

impl LocationMatch {
    /// Autocomplete label, cut to Discord's choice name limit.
    pub fn choice_label(&self) -> String {
        let label = match &self.detail {
            Some(detail) => format!("{} – {}", self.name, detail),
            None => self.name.clone(),
        };
        truncate_label(&label, CHOICE_LABEL_LIMIT)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrayerError {
    #[error("Bulan harus di antara 1-12.")]
    InvalidMonth,

    #[error("Tanggal harus di antara 1-{max_day} untuk bulan tersebut.")]
    InvalidDay { max_day: u32 },

    #[error("Negara tidak didukung.")]
    UnsupportedCountry,

    #[error("API MyQuran: {0}")]
    Upstream(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Permintaan ke API gagal dengan status {0}.")]
    Status(u16),

    #[error("Tidak dapat terhubung ke layanan jadwal sholat.")]
    Unreachable,
}

impl From<ContentError> for PrayerError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Status { status, .. } => PrayerError::Status(status),
            ContentError::Http(_) | ContentError::InvalidResponse(_) => PrayerError::Unreachable,
        }
    }
}

// ============================================================================
// DATE HELPERS
// ============================================================================

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// Fill missing parts from "today" in the country's zone, then validate.
pub fn build_target_date(
    country: Country,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    now: DateTime<Utc>,
) -> Result<NaiveDate, PrayerError> {
    let today = now.with_timezone(&country.timezone()).date_naive();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        return Err(PrayerError::InvalidMonth);
    }
    let max_day = days_in_month(year, month).ok_or(PrayerError::InvalidMonth)?;
    let day = day.unwrap_or(today.day());
    if !(1..=max_day).contains(&day) {
        return Err(PrayerError::InvalidDay { max_day });
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(PrayerError::InvalidDay { max_day })
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct PrayerService<C: ContentSource> {
    source: C,
    schedule_cache: TtlCache<String, Value>,
    lookup_cache: TtlCache<String, Value>,
}

impl<C: ContentSource> PrayerService<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            schedule_cache: TtlCache::new(SCHEDULE_TTL),
            lookup_cache: TtlCache::new(LOOKUP_TTL),
        }
    }

    pub async fn daily_schedule(
        &self,
        country: Country,
        location: &str,
        date: NaiveDate,
    ) -> Result<PrayerSchedule, PrayerError> {
        let location = location.trim();
        match country {
            Country::Indonesia => {
                let month = self.indonesia_month(location, date.year(), date.month()).await?;
                indonesia_schedule(location, &month, date)
            }
            Country::Malaysia => {
                let month = self.malaysia_month(location, date.year(), date.month()).await?;
                malaysia_schedule(location, &month, date)
            }
        }
    }

    /// Locations whose name or code contains `keyword`. Keywords shorter than
    /// two characters match nothing.
    pub async fn search(
        &self,
        country: Country,
        keyword: &str,
    ) -> Result<Vec<LocationMatch>, PrayerError> {
        let keyword = keyword.trim();
        if keyword.chars().count() < MIN_KEYWORD_CHARS {
            return Ok(Vec::new());
        }
        match country {
            Country::Indonesia => self.search_indonesia(keyword).await,
            Country::Malaysia => self.search_malaysia(keyword).await,
        }
    }

    async fn indonesia_month(&self, city: &str, year: i32, month: u32) -> Result<Value, PrayerError> {
        let key = format!("id:{}:{}:{:02}", city, year, month);
        let url = format!("{}/jadwal/{}/{}/{:02}", MYQURAN_BASE, encode_component(city), year, month);
        self.schedule_cache
            .get_or_set(key, || async move {
                let payload = self.source.fetch_json(&url).await?;
                ensure_myquran_ok(&payload, false)?;
                match payload.get("data") {
                    Some(data) if data.get("jadwal").is_some() => Ok(data.clone()),
                    _ => Err(PrayerError::NotFound(
                        "Data jadwal Indonesia tidak ditemukan.".into(),
                    )),
                }
            })
            .await
    }

    async fn malaysia_month(&self, zone: &str, year: i32, month: u32) -> Result<Value, PrayerError> {
        let key = format!("my:{}:{}:{:02}", zone, year, month);
        let url = format!(
            "{}/v2/solat/{}?year={}&month={}",
            WAKTUSOLAT_BASE,
            encode_component(zone),
            year,
            month
        );
        self.schedule_cache
            .get_or_set(key, || async move {
                let mut payload = self.source.fetch_json(&url).await?;
                if payload.get("prayers").is_none() {
                    return Err(PrayerError::NotFound(
                        "Data jadwal Malaysia tidak ditemukan.".into(),
                    ));
                }
                match self.malaysia_zone_detail(zone).await {
                    Ok(Some(detail)) => {
                        if let Some(obj) = payload.as_object_mut() {
                            obj.insert("zone_detail".into(), detail);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Zone list unavailable for {}: {}", zone, e),
                }
                Ok(payload)
            })
            .await
    }

    async fn search_indonesia(&self, keyword: &str) -> Result<Vec<LocationMatch>, PrayerError> {
        let key = format!("lookup:id:{}", keyword.to_lowercase());
        let url = format!("{}/kota/cari/{}", MYQURAN_BASE, encode_component(keyword));
        let data = self
            .lookup_cache
            .get_or_set(key, || async move {
                let payload = self.source.fetch_json(&url).await?;
                ensure_myquran_ok(&payload, true)?;
                match payload.get("data") {
                    None | Some(Value::Null) => Ok(Value::Array(Vec::new())),
                    Some(list @ Value::Array(_)) => Ok(list.clone()),
                    Some(_) => Err(PrayerError::NotFound(
                        "Data kota Indonesia tidak valid.".into(),
                    )),
                }
            })
            .await?;

        Ok(data
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| LocationMatch {
                        code: value_text(&item["id"]).unwrap_or_else(|| "-".into()),
                        name: value_text(&item["lokasi"]).unwrap_or_else(|| "Tidak diketahui".into()),
                        detail: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn malaysia_zones(&self) -> Result<Value, PrayerError> {
        let url = format!("{}/zones", WAKTUSOLAT_BASE);
        self.lookup_cache
            .get_or_set("lookup:my:zones".to_string(), || async move {
                let payload = self.source.fetch_json(&url).await?;
                if payload.is_array() {
                    Ok(payload)
                } else {
                    Err(PrayerError::NotFound("Data zona Malaysia tidak valid.".into()))
                }
            })
            .await
    }

    async fn malaysia_zone_detail(&self, zone: &str) -> Result<Option<Value>, PrayerError> {
        let zones = self.malaysia_zones().await?;
        let wanted = zone.to_uppercase();
        Ok(zones.as_array().and_then(|list| {
            list.iter()
                .find(|z| value_text(&z["jakimCode"]).map(|c| c.to_uppercase()) == Some(wanted.clone()))
                .cloned()
        }))
    }

    async fn search_malaysia(&self, keyword: &str) -> Result<Vec<LocationMatch>, PrayerError> {
        let zones = self.malaysia_zones().await?;
        let needle = keyword.to_lowercase();
        Ok(zones
            .as_array()
            .map(|list| {
                list.iter()
                    .filter(|zone| {
                        ["jakimCode", "negeri", "daerah"].iter().any(|field| {
                            value_text(&zone[*field])
                                .map(|v| v.to_lowercase().contains(&needle))
                                .unwrap_or(false)
                        })
                    })
                    .map(zone_match)
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ============================================================================
// PAYLOAD MAPPING
// ============================================================================

fn ensure_myquran_ok(payload: &Value, missing_is_ok: bool) -> Result<(), PrayerError> {
    let ok = payload
        .get("status")
        .and_then(Value::as_bool)
        .unwrap_or(missing_is_ok);
    if ok {
        return Ok(());
    }
    let message = payload["message"]
        .as_str()
        .unwrap_or("Permintaan tidak berhasil.");
    Err(PrayerError::Upstream(message.to_string()))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn zone_match(zone: &Value) -> LocationMatch {
    let code = value_text(&zone["jakimCode"]).unwrap_or_else(|| "-".into());
    let name = match value_text(&zone["negeri"]).filter(|n| !n.is_empty()) {
        Some(negeri) => format!("{} • {}", code, negeri),
        None => code.clone(),
    };
    LocationMatch {
        code,
        name,
        detail: value_text(&zone["daerah"]).filter(|d| !d.is_empty()),
    }
}

fn indonesia_schedule(
    city: &str,
    month: &Value,
    date: NaiveDate,
) -> Result<PrayerSchedule, PrayerError> {
    let iso = date.format("%Y-%m-%d").to_string();
    let day = month["jadwal"]
        .as_array()
        .and_then(|days| days.iter().find(|d| d["date"].as_str() == Some(iso.as_str())))
        .ok_or_else(|| {
            PrayerError::NotFound(
                "Jadwal untuk tanggal tersebut tidak tersedia pada API MyQuran.".into(),
            )
        })?;

    let location = value_text(&month["lokasi"]).unwrap_or_else(|| city.to_string());
    let mut description = day["tanggal"]
        .as_str()
        .or_else(|| day["date"].as_str())
        .unwrap_or_default()
        .to_string();
    if let Some(region) = month["daerah"].as_str() {
        description.push('\n');
        description.push_str(&title_case(region));
    }

    let times = [
        ("Imsak", "imsak"),
        ("Subuh", "subuh"),
        ("Terbit", "terbit"),
        ("Dhuha", "dhuha"),
        ("Dzuhur", "dzuhur"),
        ("Ashar", "ashar"),
        ("Maghrib", "maghrib"),
        ("Isya", "isya"),
    ]
    .into_iter()
    .filter_map(|(label, key)| {
        day[key]
            .as_str()
            .filter(|v| !v.is_empty())
            .map(|v| (label, v.to_string()))
    })
    .collect();

    Ok(PrayerSchedule {
        country: Country::Indonesia,
        location_code: city.to_string(),
        title: format!("Jadwal Sholat • {}", title_case(&location)),
        description: description.trim().to_string(),
        times,
        hijri: None,
        footer: format!("Sumber: {} • ID Kota: {}", Country::Indonesia.source_host(), city),
    })
}

fn malaysia_schedule(
    zone: &str,
    month: &Value,
    date: NaiveDate,
) -> Result<PrayerSchedule, PrayerError> {
    let day = month["prayers"]
        .as_array()
        .and_then(|days| {
            days.iter()
                .find(|d| d["day"].as_u64() == Some(u64::from(date.day())))
        })
        .ok_or_else(|| {
            PrayerError::NotFound(
                "Jadwal untuk tanggal tersebut tidak tersedia pada API WaktuSolat.".into(),
            )
        })?;

    let detail = month.get("zone_detail");
    let state = detail
        .and_then(|d| d["negeri"].as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let district = detail
        .and_then(|d| d["daerah"].as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let label = match state {
        Some(state) => state.to_string(),
        None => value_text(&month["zone"]).unwrap_or_else(|| zone.to_string()),
    };

    let mut lines = vec![date.format("%A, %d %B %Y").to_string()];
    if let Some(district) = district {
        lines.push(district.to_string());
    }

    let tz = Country::Malaysia.timezone();
    let mut times = Vec::new();
    for (label, key) in [
        ("Subuh", "fajr"),
        ("Syuruk", "syuruk"),
        ("Dzuhur", "dhuhr"),
        ("Ashar", "asr"),
        ("Maghrib", "maghrib"),
        ("Isya", "isha"),
    ] {
        let local = day[key]
            .as_i64()
            .and_then(|epoch| tz.timestamp_opt(epoch, 0).single())
            .ok_or_else(|| PrayerError::NotFound("Data waktu solat tidak valid.".into()))?;
        times.push((label, local.format("%H:%M").to_string()));
    }

    Ok(PrayerSchedule {
        country: Country::Malaysia,
        location_code: zone.to_string(),
        title: format!("Jadwal Solat • {}", label),
        description: lines.join("\n"),
        times,
        hijri: day["hijri"].as_str().filter(|h| !h.is_empty()).map(str::to_string),
        footer: format!(
            "Sumber: {} • Zona JAKIM: {}",
            Country::Malaysia.source_host(),
            zone
        ),
    })
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

/// "KOTA KEDIRI" -> "Kota Kediri".
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Form-style percent encoding for a single path or query component.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::tests::FakeSource;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn kediri_month() -> Value {
        json!({
            "status": true,
            "data": {
                "lokasi": "KOTA KEDIRI",
                "daerah": "JAWA TIMUR",
                "jadwal": [{
                    "date": "2024-06-03",
                    "tanggal": "Senin, 03/06/2024",
                    "imsak": "04:09",
                    "subuh": "04:19",
                    "terbit": "05:36",
                    "dhuha": "06:05",
                    "dzuhur": "11:34",
                    "ashar": "14:53",
                    "maghrib": "17:24",
                    "isya": "18:38"
                }]
            }
        })
    }

    fn stamp(hour: u32, minute: u32) -> i64 {
        chrono_tz::Asia::Kuala_Lumpur
            .with_ymd_and_hms(2025, 6, 1, hour, minute, 0)
            .unwrap()
            .timestamp()
    }

    fn zones() -> Value {
        json!([
            {"jakimCode": "SGR01", "negeri": "Selangor", "daerah": "Gombak, Petaling, Sepang"},
            {"jakimCode": "JHR02", "negeri": "Johor", "daerah": "Johor Bahru, Kota Tinggi"}
        ])
    }

    fn fake() -> FakeSource {
        FakeSource::default()
            .with("https://api.myquran.com/v2/sholat/jadwal/1632/2024/06", kediri_month())
            .with(
                "https://api.waktusolat.app/v2/solat/SGR01?year=2025&month=6",
                json!({
                    "zone": "SGR01",
                    "prayers": [{
                        "day": 1,
                        "hijri": "1446-12-04",
                        "fajr": stamp(5, 31),
                        "syuruk": stamp(6, 47),
                        "dhuhr": stamp(13, 12),
                        "asr": stamp(16, 30),
                        "maghrib": stamp(19, 24),
                        "isha": stamp(20, 40)
                    }]
                }),
            )
            .with("https://api.waktusolat.app/zones", zones())
            .with(
                "https://api.myquran.com/v2/sholat/kota/cari/kediri",
                json!({"status": true, "data": [
                    {"id": "1632", "lokasi": "KOTA KEDIRI"},
                    {"id": "1609", "lokasi": "KAB. KEDIRI"}
                ]}),
            )
            .with(
                "https://api.myquran.com/v2/sholat/jadwal/9999/2024/06",
                json!({"status": false, "message": "Kota tidak ditemukan"}),
            )
    }

    fn time_of<'a>(schedule: &'a PrayerSchedule, label: &str) -> &'a str {
        schedule
            .times
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[tokio::test]
    async fn indonesia_day_schedule() {
        let service = PrayerService::new(fake());
        let schedule = service
            .daily_schedule(Country::Indonesia, "1632", date(2024, 6, 3))
            .await
            .unwrap();
        assert_eq!(schedule.title, "Jadwal Sholat • Kota Kediri");
        assert_eq!(schedule.description, "Senin, 03/06/2024\nJawa Timur");
        assert_eq!(time_of(&schedule, "Subuh"), "04:19");
        assert_eq!(time_of(&schedule, "Maghrib"), "17:24");
        assert_eq!(schedule.times.len(), 8);
        assert!(schedule.footer.contains("ID Kota: 1632"));
    }

    #[tokio::test]
    async fn month_payload_is_cached() {
        let service = PrayerService::new(fake());
        service
            .daily_schedule(Country::Indonesia, "1632", date(2024, 6, 3))
            .await
            .unwrap();
        let missing = service
            .daily_schedule(Country::Indonesia, "1632", date(2024, 6, 4))
            .await;
        assert!(matches!(missing, Err(PrayerError::NotFound(_))));
        assert_eq!(service.source.call_count(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_message() {
        let service = PrayerService::new(fake());
        let err = service
            .daily_schedule(Country::Indonesia, "9999", date(2024, 6, 3))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API MyQuran: Kota tidak ditemukan");

        let err = service
            .daily_schedule(Country::Indonesia, "1", date(2024, 6, 3))
            .await
            .unwrap_err();
        assert_eq!(err, PrayerError::Status(404));
    }

    #[tokio::test]
    async fn malaysia_day_schedule_with_zone_detail() {
        let service = PrayerService::new(fake());
        let schedule = service
            .daily_schedule(Country::Malaysia, "SGR01", date(2025, 6, 1))
            .await
            .unwrap();
        assert_eq!(schedule.title, "Jadwal Solat • Selangor");
        assert!(schedule.description.contains("Gombak"));
        assert_eq!(time_of(&schedule, "Subuh"), "05:31");
        assert_eq!(time_of(&schedule, "Maghrib"), "19:24");
        assert_eq!(time_of(&schedule, "Isya"), "20:40");
        assert_eq!(schedule.hijri.as_deref(), Some("1446-12-04"));
        assert!(schedule.footer.contains("SGR01"));
    }

    #[tokio::test]
    async fn searches() {
        let service = PrayerService::new(fake());
        let cities = service.search(Country::Indonesia, " kediri ").await.unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].code, "1632");
        assert_eq!(cities[0].choice_label(), "KOTA KEDIRI");

        let zones = service.search(Country::Malaysia, "johor").await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].code, "JHR02");
        assert_eq!(zones[0].choice_label(), "JHR02 • Johor – Johor Bahru, Kota Tinggi");

        assert!(service.search(Country::Malaysia, "sgr").await.unwrap().len() == 1);
        assert!(service.search(Country::Malaysia, "zon tidak ada").await.unwrap().is_empty());
        assert!(service.search(Country::Indonesia, "k").await.unwrap().is_empty());
    }

    #[test]
    fn target_date_rules() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 20, 0, 0).unwrap();
        // 20:00 UTC is already the next day in Jakarta.
        assert_eq!(
            build_target_date(Country::Indonesia, None, None, None, now),
            Ok(date(2024, 2, 11))
        );
        assert_eq!(
            build_target_date(Country::Indonesia, Some(2024), Some(2), Some(29), now),
            Ok(date(2024, 2, 29))
        );
        assert_eq!(
            build_target_date(Country::Indonesia, Some(2023), Some(2), Some(29), now),
            Err(PrayerError::InvalidDay { max_day: 28 })
        );
        let err = build_target_date(Country::Malaysia, Some(2024), Some(13), Some(1), now).unwrap_err();
        assert_eq!(err.to_string(), "Bulan harus di antara 1-12.");
    }

    #[test]
    fn helpers() {
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(title_case("KAB. KEDIRI"), "Kab. Kediri");
        assert_eq!(encode_component("kota baru/x"), "kota+baru%2Fx");
        assert_eq!(truncate_label(&"a".repeat(100), 95).chars().count(), 95);
        assert_eq!(Country::parse("Malaysia"), Some(Country::Malaysia));
        assert_eq!(Country::parse("brunei"), None);
    }
}
