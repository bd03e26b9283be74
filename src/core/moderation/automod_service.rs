// Automod - rule evaluation plus the cached per-guild rule set.
//
// `evaluate` is a pure function over the message and the rules so it can be
// tested without any store. The service only adds persistence and caching.

use super::moderation_models::{AutomodRule, ModerationError, RuleType, Violation};
use crate::core::cache::TtlCache;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

const LINK_REASON: &str = "Pesan mengandung tautan yang tidak diperbolehkan.";
const MENTION_REASON: &str = "Jumlah mention melebihi batas yang diizinkan.";
const CAPS_REASON: &str = "Pesan didominasi huruf kapital.";

const DEFAULT_CAPS_MIN_LENGTH: usize = 15;
const DEFAULT_CAPS_THRESHOLD: f64 = 0.7;
const RULE_CACHE_TTL: Duration = Duration::from_secs(60);

fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| {
        Regex::new(r"(?i)https?://[^\s]+").expect("link regex is valid")
    })
}

// ============================================================================
// RULE EVALUATION
// ============================================================================

/// Check a message against a guild's rules. Inactive rules are skipped.
pub fn evaluate(content: &str, mention_count: usize, rules: &[AutomodRule]) -> Vec<Violation> {
    let normalized = content.trim();
    rules
        .iter()
        .filter(|rule| rule.is_active)
        .filter_map(|rule| {
            let (violated, reason) = match rule.rule_type {
                RuleType::LinkFilter => (violates_link_filter(normalized, &rule.payload), LINK_REASON),
                RuleType::MentionLimit => (
                    violates_mention_limit(mention_count, &rule.payload),
                    MENTION_REASON,
                ),
                RuleType::Caps => (violates_caps(normalized, &rule.payload), CAPS_REASON),
            };
            violated.then_some(Violation {
                rule_type: rule.rule_type,
                reason,
            })
        })
        .collect()
}

fn violates_link_filter(content: &str, payload: &Value) -> bool {
    if content.is_empty() {
        return false;
    }
    let allow: HashSet<String> = payload
        .get("allow_domains")
        .and_then(Value::as_array)
        .map(|domains| {
            domains
                .iter()
                .map(|d| match d {
                    Value::String(s) => s.to_lowercase(),
                    other => other.to_string().to_lowercase(),
                })
                .collect()
        })
        .unwrap_or_default();

    link_regex().find_iter(content).any(|m| match extract_domain(m.as_str()) {
        Some(domain) => !allow.contains(&domain),
        None => true,
    })
}

/// Text between `//` and the next `/`, lowercased.
pub fn extract_domain(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("//")?;
    let domain = rest.split('/').next().unwrap_or(rest);
    Some(domain.to_lowercase())
}

fn violates_mention_limit(mention_count: usize, payload: &Value) -> bool {
    match payload.get("max_mentions").and_then(Value::as_i64) {
        Some(max) if max > 0 => mention_count as i64 > max,
        _ => false,
    }
}

fn violates_caps(content: &str, payload: &Value) -> bool {
    let min_length = payload
        .get("min_length")
        .and_then(Value::as_i64)
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_CAPS_MIN_LENGTH);
    let threshold = payload
        .get("threshold")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CAPS_THRESHOLD);

    if threshold <= 0.0 || content.chars().count() < min_length {
        return false;
    }

    let (letters, upper) = content
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });
    if letters == 0 {
        return false;
    }
    upper as f64 / letters as f64 >= threshold
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait AutomodStore: Send + Sync {
    /// Insert or replace the rule for `(guild, type)`.
    async fn upsert_rule(&self, rule: &AutomodRule) -> Result<(), ModerationError>;

    async fn get_rule(
        &self,
        guild_id: u64,
        rule_type: RuleType,
    ) -> Result<Option<AutomodRule>, ModerationError>;

    /// Returns false when the rule does not exist.
    async fn set_active(
        &self,
        guild_id: u64,
        rule_type: RuleType,
        active: bool,
    ) -> Result<bool, ModerationError>;

    async fn list_rules(&self, guild_id: u64) -> Result<Vec<AutomodRule>, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AutomodService<S: AutomodStore> {
    store: S,
    cache: TtlCache<u64, Vec<AutomodRule>>,
}

impl<S: AutomodStore> AutomodService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: TtlCache::new(RULE_CACHE_TTL),
        }
    }

    pub async fn set_rule(
        &self,
        guild_id: u64,
        rule_type: RuleType,
        payload: Value,
        is_active: bool,
    ) -> Result<AutomodRule, ModerationError> {
        let rule = AutomodRule {
            guild_id,
            rule_type,
            payload,
            is_active,
        };
        self.store.upsert_rule(&rule).await?;
        self.cache.invalidate(&guild_id).await;
        tracing::info!(guild_id, rule = %rule_type, is_active, "Automod rule updated");
        Ok(rule)
    }

    pub async fn get_rule(
        &self,
        guild_id: u64,
        rule_type: RuleType,
    ) -> Result<Option<AutomodRule>, ModerationError> {
        self.store.get_rule(guild_id, rule_type).await
    }

    pub async fn set_active(
        &self,
        guild_id: u64,
        rule_type: RuleType,
        active: bool,
    ) -> Result<bool, ModerationError> {
        let changed = self.store.set_active(guild_id, rule_type, active).await?;
        self.cache.invalidate(&guild_id).await;
        Ok(changed)
    }

    pub async fn list_rules(&self, guild_id: u64) -> Result<Vec<AutomodRule>, ModerationError> {
        self.store.list_rules(guild_id).await
    }

    async fn cached_rules(&self, guild_id: u64) -> Result<Vec<AutomodRule>, ModerationError> {
        self.cache
            .get_or_set(guild_id, || self.store.list_rules(guild_id))
            .await
    }

    /// Evaluate a message against the guild's (cached) rules.
    pub async fn check_message(
        &self,
        guild_id: u64,
        content: &str,
        mention_count: usize,
    ) -> Result<Vec<Violation>, ModerationError> {
        let rules = self.cached_rules(guild_id).await?;
        if rules.is_empty() {
            return Ok(Vec::new());
        }
        Ok(evaluate(content, mention_count, &rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rule(rule_type: RuleType, payload: Value) -> AutomodRule {
        AutomodRule {
            guild_id: 1,
            rule_type,
            payload,
            is_active: true,
        }
    }

    #[test]
    fn link_regex_finds_each_link() {
        let found: Vec<_> = link_regex()
            .find_iter("a HTTP://x.test/1 b https://y.test")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["HTTP://x.test/1", "https://y.test"]);
    }

    #[test]
    fn link_filter_allows_whitelisted_domain() {
        let rules = [rule(
            RuleType::LinkFilter,
            json!({"allow_domains": ["example.com"]}),
        )];
        assert!(evaluate("kunjungi https://example.com/page", 0, &rules).is_empty());
        assert!(evaluate("HTTPS://EXAMPLE.COM/page", 0, &rules).is_empty());
    }

    #[test]
    fn link_filter_blocks_other_domains() {
        let rules = [rule(
            RuleType::LinkFilter,
            json!({"allow_domains": ["example.com"]}),
        )];
        let violations = evaluate("http://malicious.test", 0, &rules);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_type, RuleType::LinkFilter);
        assert_eq!(violations[0].reason, LINK_REASON);

        // One bad link among good ones is enough.
        let mixed = "https://example.com dan https://evil.test/x";
        assert_eq!(evaluate(mixed, 0, &rules).len(), 1);
    }

    #[test]
    fn link_filter_without_allow_list_blocks_everything() {
        let rules = [rule(RuleType::LinkFilter, json!({}))];
        assert_eq!(evaluate("lihat https://a.b", 0, &rules).len(), 1);
        assert!(evaluate("tidak ada tautan", 0, &rules).is_empty());
    }

    #[test]
    fn caps_rule_detects_uppercase() {
        let rules = [rule(
            RuleType::Caps,
            json!({"threshold": 0.6, "min_length": 5}),
        )];
        assert_eq!(evaluate("INI PENGUMUMAN PENTING!!!", 0, &rules).len(), 1);
        assert!(evaluate("ini pengumuman biasa", 0, &rules).is_empty());
    }

    #[test]
    fn caps_rule_respects_defaults_and_disable() {
        let defaults = [rule(RuleType::Caps, json!({}))];
        // Shorter than the default min length of 15.
        assert!(evaluate("HALO SEMUA", 0, &defaults).is_empty());
        assert_eq!(evaluate("HALO SEMUANYA APA KABAR", 0, &defaults).len(), 1);

        let disabled = [rule(RuleType::Caps, json!({"threshold": 0}))];
        assert!(evaluate("HALO SEMUANYA APA KABAR", 0, &disabled).is_empty());

        let digits_only = [rule(RuleType::Caps, json!({"min_length": 1}))];
        assert!(evaluate("1234567890123456", 0, &digits_only).is_empty());
    }

    #[test]
    fn mention_limit_violation() {
        let rules = [rule(RuleType::MentionLimit, json!({"max_mentions": 2}))];
        assert_eq!(evaluate("halo", 5, &rules).len(), 1);
        assert!(evaluate("halo", 2, &rules).is_empty());

        let invalid = [rule(RuleType::MentionLimit, json!({"max_mentions": 0}))];
        assert!(evaluate("halo", 50, &invalid).is_empty());
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let mut inactive = rule(RuleType::MentionLimit, json!({"max_mentions": 1}));
        inactive.is_active = false;
        assert!(evaluate("halo", 10, &[inactive]).is_empty());
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(
            extract_domain("https://Discord.GG/abc"),
            Some("discord.gg".to_string())
        );
        assert_eq!(extract_domain("no-scheme"), None);
    }

    #[derive(Default)]
    struct CountingStore {
        rules: DashMap<(u64, RuleType), AutomodRule>,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl AutomodStore for CountingStore {
        async fn upsert_rule(&self, rule: &AutomodRule) -> Result<(), ModerationError> {
            self.rules
                .insert((rule.guild_id, rule.rule_type), rule.clone());
            Ok(())
        }

        async fn get_rule(
            &self,
            guild_id: u64,
            rule_type: RuleType,
        ) -> Result<Option<AutomodRule>, ModerationError> {
            Ok(self.rules.get(&(guild_id, rule_type)).map(|r| r.clone()))
        }

        async fn set_active(
            &self,
            guild_id: u64,
            rule_type: RuleType,
            active: bool,
        ) -> Result<bool, ModerationError> {
            match self.rules.get_mut(&(guild_id, rule_type)) {
                Some(mut rule) => {
                    rule.is_active = active;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn list_rules(&self, guild_id: u64) -> Result<Vec<AutomodRule>, ModerationError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rules
                .iter()
                .filter(|r| r.guild_id == guild_id)
                .map(|r| r.clone())
                .collect())
        }
    }

    #[tokio::test]
    async fn rules_are_cached_and_invalidated_on_change() {
        let service = AutomodService::new(CountingStore::default());
        service
            .set_rule(1, RuleType::MentionLimit, json!({"max_mentions": 2}), true)
            .await
            .unwrap();

        assert_eq!(service.check_message(1, "hai", 3).await.unwrap().len(), 1);
        assert_eq!(service.check_message(1, "hai", 3).await.unwrap().len(), 1);
        assert_eq!(service.store.list_calls.load(Ordering::SeqCst), 1);

        assert!(service
            .set_active(1, RuleType::MentionLimit, false)
            .await
            .unwrap());
        assert!(service.check_message(1, "hai", 3).await.unwrap().is_empty());
        assert_eq!(service.store.list_calls.load(Ordering::SeqCst), 2);

        assert!(!service.set_active(1, RuleType::Caps, true).await.unwrap());
    }
}
