// Bot configuration loaded from the environment (and `.env` via dotenv).
//
// Parsing goes through `from_lookup` so tests can feed a map instead of
// mutating the real process environment.

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/forus.db";
const DEFAULT_ROTATION_SECONDS: u64 = 60;
const MIN_ROTATION_SECONDS: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN tidak ditemukan. Tambahkan pada file .env atau environment variable.")]
    MissingToken,
}

/// One entry of the rich-presence rotation, e.g. `watching|{guild_count} server`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceActivity {
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PresenceConfig {
    pub enabled: bool,
    pub rotation_seconds: u64,
    pub default_status: String,
    pub activities: Vec<PresenceActivity>,
}

impl PresenceConfig {
    /// Rotation interval with the 5 second floor applied.
    pub fn interval_seconds(&self) -> u64 {
        self.rotation_seconds.max(MIN_ROTATION_SECONDS)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation_seconds: DEFAULT_ROTATION_SECONDS,
            default_status: "online".to_string(),
            activities: default_activities(),
        }
    }
}

fn default_activities() -> Vec<PresenceActivity> {
    vec![
        PresenceActivity {
            kind: "watching".to_string(),
            text: "{guild_count} server".to_string(),
        },
        PresenceActivity {
            kind: "listening".to_string(),
            text: "{member_count} anggota".to_string(),
        },
        PresenceActivity {
            kind: "playing".to_string(),
            text: "online {uptime_human}".to_string(),
        },
    ]
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub guild_ids: Vec<u64>,
    pub database_url: String,
    pub log_level: String,
    pub owner_ids: Vec<u64>,
    pub presence: PresenceConfig,
}

impl BotConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let guild_ids = parse_id_list(lookup("DISCORD_GUILD_IDS").as_deref());
        let owner_ids = parse_id_list(lookup("OWNER_IDS").as_deref());

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| normalize_database_url(&v))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let log_level = lookup("LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "INFO".to_string())
            .trim()
            .to_uppercase();

        let mut presence = PresenceConfig::default();
        if let Some(enabled) = lookup("PRESENCE_ENABLED").and_then(|v| parse_bool(&v)) {
            presence.enabled = enabled;
        }
        if let Some(seconds) = lookup("PRESENCE_ROTATION_SECONDS").and_then(|v| v.trim().parse().ok()) {
            presence.rotation_seconds = seconds;
        }
        if let Some(status) = lookup("PRESENCE_STATUS").filter(|v| !v.trim().is_empty()) {
            presence.default_status = status.trim().to_lowercase();
        }
        if let Some(raw) = lookup("PRESENCE_ACTIVITIES") {
            let parsed = parse_activities(&raw);
            if !parsed.is_empty() {
                presence.activities = parsed;
            }
        }

        Ok(Self {
            token,
            guild_ids,
            database_url,
            log_level,
            owner_ids,
            presence,
        })
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }

    /// Map LOG_LEVEL onto a tracing level. WARNING and CRITICAL are accepted too.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" | "CRITICAL" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

fn parse_id_list(raw: Option<&str>) -> Vec<u64> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<u64>().ok())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    // Older deployments configured an async driver prefix; sqlx wants the plain scheme.
    if let Some(path) = raw.strip_prefix("sqlite+aiosqlite:///") {
        return format!("sqlite://{}", path);
    }
    if raw.starts_with("sqlite:") {
        return raw.to_string();
    }
    format!("sqlite://{}", raw)
}

fn parse_activities(raw: &str) -> Vec<PresenceActivity> {
    raw.split(";;")
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once('|') {
                Some((kind, text)) if !text.trim().is_empty() => Some(PresenceActivity {
                    kind: kind.trim().to_lowercase(),
                    text: text.trim().to_string(),
                }),
                Some(_) => None,
                None => Some(PresenceActivity {
                    kind: "playing".to_string(),
                    text: entry.to_string(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn missing_token_is_an_error() {
        assert_eq!(config_from(&[]).unwrap_err(), ConfigError::MissingToken);
        assert_eq!(
            config_from(&[("DISCORD_TOKEN", "   ")]).unwrap_err(),
            ConfigError::MissingToken
        );
    }

    #[test]
    fn defaults_are_applied() {
        let config = config_from(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.token, "abc");
        assert!(config.guild_ids.is_empty());
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.log_level, "INFO");
        assert!(config.presence.enabled);
        assert_eq!(config.presence.activities.len(), 3);
    }

    #[test]
    fn id_lists_skip_garbage() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_IDS", "123, 456,,abc"),
            ("OWNER_IDS", "42"),
        ])
        .unwrap();
        assert_eq!(config.guild_ids, vec![123, 456]);
        assert!(config.is_owner(42));
        assert!(!config.is_owner(43));
    }

    #[test]
    fn database_url_is_normalized() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DATABASE_URL", "sqlite+aiosqlite:///./bot.db"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite://./bot.db");

        let config = config_from(&[("DISCORD_TOKEN", "abc"), ("DATABASE_URL", "data/x.db")]).unwrap();
        assert_eq!(config.database_url, "sqlite://data/x.db");
    }

    #[test]
    fn log_level_is_uppercased_and_mapped() {
        let config = config_from(&[("DISCORD_TOKEN", "abc"), ("LOG_LEVEL", "debug")]).unwrap();
        assert_eq!(config.log_level, "DEBUG");
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);

        let config = config_from(&[("DISCORD_TOKEN", "abc"), ("LOG_LEVEL", "warning")]).unwrap();
        assert_eq!(config.tracing_level(), tracing::Level::WARN);
    }

    #[test]
    fn presence_activities_are_parsed() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("PRESENCE_ACTIVITIES", "watching|{guild_count} server;; hello ;;bad|"),
            ("PRESENCE_ROTATION_SECONDS", "2"),
            ("PRESENCE_ENABLED", "off"),
        ])
        .unwrap();
        assert!(!config.presence.enabled);
        assert_eq!(config.presence.interval_seconds(), 5);
        assert_eq!(
            config.presence.activities,
            vec![
                PresenceActivity {
                    kind: "watching".into(),
                    text: "{guild_count} server".into()
                },
                PresenceActivity {
                    kind: "playing".into(),
                    text: "hello".into()
                },
            ]
        );
    }
}
