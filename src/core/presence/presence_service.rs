// Rich presence: bot statistics rendered into rotating activity templates.
//
// Nothing here touches the gateway; the Discord layer collects a snapshot,
// asks the rotation for the next template and applies the result.

use crate::core::config::{PresenceActivity, PresenceConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceSnapshot {
    pub guild_count: usize,
    pub member_count: u64,
    pub human_count: u64,
    pub bot_count: u64,
    pub commands_count: usize,
    pub latency_ms: f64,
    pub shard_count: u32,
    pub scheduler_jobs: usize,
    pub pending_reminders: usize,
    pub owner_count: usize,
    pub uptime: Duration,
    pub database_connected: bool,
    pub version: String,
}

impl PresenceSnapshot {
    pub fn uptime_seconds(&self) -> u64 {
        self.uptime.as_secs()
    }

    /// Template variables. `activity_index` is 1-based.
    pub fn to_context(&self, activity_index: usize, activity_total: usize) -> HashMap<&'static str, String> {
        let mut ctx = HashMap::new();
        ctx.insert("guild_count", self.guild_count.to_string());
        ctx.insert("member_count", self.member_count.to_string());
        ctx.insert("human_count", self.human_count.to_string());
        ctx.insert("bot_count", self.bot_count.to_string());
        ctx.insert("commands_count", self.commands_count.to_string());
        ctx.insert("latency_ms", format!("{:.2}", self.latency_ms));
        ctx.insert("shard_count", self.shard_count.to_string());
        ctx.insert("scheduler_jobs", self.scheduler_jobs.to_string());
        ctx.insert("pending_reminders", self.pending_reminders.to_string());
        ctx.insert("owner_count", self.owner_count.to_string());
        ctx.insert("uptime_seconds", self.uptime_seconds().to_string());
        ctx.insert("uptime_human", humanize_duration(self.uptime));
        ctx.insert(
            "database_status",
            if self.database_connected {
                "🟢 tersambung"
            } else {
                "🔴 putus"
            }
            .to_string(),
        );
        ctx.insert("version", self.version.clone());
        ctx.insert(
            "activity_pool",
            (self.scheduler_jobs + self.pending_reminders).to_string(),
        );
        ctx.insert("activity_index", activity_index.to_string());
        ctx.insert("activity_total", activity_total.to_string());
        ctx
    }
}

/// Fill `{key}` placeholders. Unknown keys are left as written.
pub fn format_template(template: &str, context: &HashMap<&'static str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match context.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// "baru saja" for zero, otherwise the two largest non-zero units.
pub fn humanize_duration(duration: Duration) -> String {
    let mut remainder = duration.as_secs();
    if remainder == 0 {
        return "baru saja".to_string();
    }
    let units = [("hari", 86_400), ("jam", 3_600), ("menit", 60), ("detik", 1)];
    let mut parts = Vec::new();
    for (label, size) in units {
        let value = remainder / size;
        remainder %= size;
        if value > 0 {
            parts.push(format!("{} {}", value, label));
        }
        if parts.len() == 2 {
            break;
        }
    }
    parts.join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Idle,
    DoNotDisturb,
    Invisible,
    Offline,
}

impl PresenceStatus {
    /// Unknown values fall back to online.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "idle" | "away" => PresenceStatus::Idle,
            "dnd" | "do_not_disturb" | "busy" => PresenceStatus::DoNotDisturb,
            "invisible" => PresenceStatus::Invisible,
            "offline" => PresenceStatus::Offline,
            _ => PresenceStatus::Online,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Playing,
    Watching,
    Listening,
    Competing,
    Streaming,
    Custom,
}

impl ActivityKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "watching" => ActivityKind::Watching,
            "listening" => ActivityKind::Listening,
            "competing" => ActivityKind::Competing,
            "streaming" => ActivityKind::Streaming,
            "custom" => ActivityKind::Custom,
            _ => ActivityKind::Playing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPresence {
    pub kind: ActivityKind,
    pub text: String,
    pub status: PresenceStatus,
}

/// Round-robin over the configured activity templates.
pub struct PresenceRotation {
    activities: Vec<PresenceActivity>,
    status: PresenceStatus,
    interval: Duration,
    cursor: AtomicUsize,
}

impl PresenceRotation {
    pub fn new(config: &PresenceConfig) -> Self {
        Self {
            activities: config.activities.clone(),
            status: PresenceStatus::parse(&config.default_status),
            interval: Duration::from_secs(config.interval_seconds()),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn status(&self) -> PresenceStatus {
        self.status
    }

    /// Render the next template against `snapshot`.
    pub fn next(&self, snapshot: &PresenceSnapshot) -> Option<RenderedPresence> {
        let total = self.activities.len();
        if total == 0 {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % total;
        let template = &self.activities[index];
        let context = snapshot.to_context(index + 1, total);
        Some(RenderedPresence {
            kind: ActivityKind::parse(&template.kind),
            text: format_template(&template.text, &context),
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PresenceSnapshot {
        PresenceSnapshot {
            guild_count: 3,
            member_count: 120,
            human_count: 110,
            bot_count: 10,
            commands_count: 40,
            latency_ms: 42.456,
            shard_count: 1,
            scheduler_jobs: 2,
            pending_reminders: 5,
            owner_count: 1,
            uptime: Duration::from_secs(3_725),
            database_connected: true,
            version: "0.3.0".into(),
        }
    }

    #[test]
    fn context_has_derived_keys() {
        let ctx = snapshot().to_context(2, 3);
        assert_eq!(ctx["uptime_seconds"], "3725");
        assert_eq!(ctx["uptime_human"], "1 jam 2 menit");
        assert_eq!(ctx["database_status"], "🟢 tersambung");
        assert_eq!(ctx["activity_pool"], "7");
        assert_eq!(ctx["latency_ms"], "42.46");
        assert_eq!(ctx["activity_index"], "2");
    }

    #[test]
    fn unknown_placeholders_survive() {
        let ctx = snapshot().to_context(1, 1);
        assert_eq!(
            format_template("{guild_count} server, {mystery} dan {", &ctx),
            "3 server, {mystery} dan {"
        );
        assert_eq!(format_template("tanpa variabel", &ctx), "tanpa variabel");
    }

    #[test]
    fn humanize_keeps_two_units() {
        assert_eq!(humanize_duration(Duration::ZERO), "baru saja");
        assert_eq!(humanize_duration(Duration::from_secs(45)), "45 detik");
        assert_eq!(humanize_duration(Duration::from_secs(90_061)), "1 hari 1 jam");
        assert_eq!(humanize_duration(Duration::from_secs(86_405)), "1 hari 5 detik");
    }

    #[test]
    fn status_and_kind_parsing() {
        assert_eq!(PresenceStatus::parse("Away"), PresenceStatus::Idle);
        assert_eq!(PresenceStatus::parse("busy"), PresenceStatus::DoNotDisturb);
        assert_eq!(PresenceStatus::parse("invisible"), PresenceStatus::Invisible);
        assert_eq!(PresenceStatus::parse("???"), PresenceStatus::Online);
        assert_eq!(ActivityKind::parse("LISTENING"), ActivityKind::Listening);
        assert_eq!(ActivityKind::parse("dancing"), ActivityKind::Playing);
    }

    #[test]
    fn rotation_is_round_robin() {
        let config = PresenceConfig {
            rotation_seconds: 1,
            ..PresenceConfig::default()
        };
        let rotation = PresenceRotation::new(&config);
        assert_eq!(rotation.interval(), Duration::from_secs(5));

        let snap = snapshot();
        let first = rotation.next(&snap).unwrap();
        let second = rotation.next(&snap).unwrap();
        rotation.next(&snap).unwrap();
        let fourth = rotation.next(&snap).unwrap();
        assert_eq!(first.text, "3 server");
        assert_eq!(first.kind, ActivityKind::Watching);
        assert_eq!(second.text, "120 anggota");
        assert_eq!(fourth, first);
    }

    #[test]
    fn empty_rotation_renders_nothing() {
        let config = PresenceConfig {
            activities: Vec::new(),
            ..PresenceConfig::default()
        };
        let rotation = PresenceRotation::new(&config);
        assert!(rotation.is_empty());
        assert!(rotation.next(&snapshot()).is_none());
    }
}
