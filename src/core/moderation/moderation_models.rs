// Moderation domain models - warnings and automod rules.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer turns violations into deletes, notices and audit rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Aturan automod tidak dikenal: {0}")]
    UnknownRule(String),

    #[error("Alasan tidak boleh kosong.")]
    EmptyReason,
}

/// A manual warning issued by a moderator.
#[derive(Debug, Clone, PartialEq)]
pub struct Warn {
    pub id: i64,
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// The automod checks a guild can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    LinkFilter,
    MentionLimit,
    Caps,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [RuleType::LinkFilter, RuleType::MentionLimit, RuleType::Caps];

    /// Name used in the database and in audit entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::LinkFilter => "link_filter",
            RuleType::MentionLimit => "mention_limit",
            RuleType::Caps => "caps",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ModerationError> {
        match raw.trim().to_lowercase().as_str() {
            "link_filter" => Ok(RuleType::LinkFilter),
            "mention_limit" => Ok(RuleType::MentionLimit),
            "caps" => Ok(RuleType::Caps),
            other => Err(ModerationError::UnknownRule(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleType::LinkFilter => "Filter Tautan",
            RuleType::MentionLimit => "Batas Mention",
            RuleType::Caps => "Huruf Kapital",
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored rule. The payload shape depends on the rule type:
/// `{"allow_domains": [..]}`, `{"max_mentions": n}` or
/// `{"threshold": f, "min_length": n}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomodRule {
    pub guild_id: u64,
    pub rule_type: RuleType,
    pub payload: Value,
    pub is_active: bool,
}

/// One rule a message broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule_type: RuleType,
    pub reason: &'static str,
}
