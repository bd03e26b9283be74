// Message XP, the level curve and level reward roles.
//
// XP is gated by a per-member cooldown stored with the profile, so a restart
// does not hand out a fresh award.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::ops::RangeInclusive;
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A member's XP and level in one guild.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProfile {
    pub guild_id: u64,
    pub user_id: u64,
    pub xp: u64,
    pub level: u32,
    /// Last message that earned XP. Persisted so the cooldown survives restarts.
    pub last_message_at: Option<DateTime<Utc>>,
}

impl LevelProfile {
    pub fn empty(guild_id: u64, user_id: u64) -> Self {
        Self {
            guild_id,
            user_id,
            xp: 0,
            level: 0,
            last_message_at: None,
        }
    }
}

/// Where a member sits inside their current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBreakdown {
    pub level: u32,
    pub xp_into_level: u64,
    pub xp_for_next_level: u64,
}

#[derive(Debug, Clone)]
pub struct LevelProgress {
    pub profile: LevelProfile,
    pub xp_into_level: u64,
    pub xp_for_next_level: u64,
    pub xp_remaining: u64,
    pub previous_level: u32,
    pub leveled_up: bool,
}

/// A role handed out when a member reaches `level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelReward {
    pub guild_id: u64,
    pub level: u32,
    pub role_id: u64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum LevelingError {
    #[error("User is on cooldown. Time remaining: {0:?}")]
    OnCooldown(std::time::Duration),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid user or guild ID")]
    InvalidId,
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Persistence for level profiles and level rewards.
#[async_trait]
pub trait LevelStore: Send + Sync {
    async fn get_profile(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<LevelProfile>, LevelingError>;

    /// Atomically add XP (creating the profile if needed). Returns the new total.
    async fn add_xp(&self, guild_id: u64, user_id: u64, amount: u64) -> Result<u64, LevelingError>;

    async fn set_level(&self, guild_id: u64, user_id: u64, level: u32)
        -> Result<(), LevelingError>;

    async fn set_last_message_at(
        &self,
        guild_id: u64,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<(), LevelingError>;

    /// Top profiles by XP, highest first.
    async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<LevelProfile>, LevelingError>;

    async fn profiles_with_min_level(
        &self,
        guild_id: u64,
        level: u32,
    ) -> Result<Vec<LevelProfile>, LevelingError>;

    /// Upsert the reward for a level.
    async fn set_reward(&self, reward: LevelReward) -> Result<(), LevelingError>;

    async fn remove_reward(&self, guild_id: u64, level: u32) -> Result<bool, LevelingError>;

    /// All rewards of a guild ordered by level.
    async fn list_rewards(&self, guild_id: u64) -> Result<Vec<LevelReward>, LevelingError>;
}

// ============================================================================
// LEVEL CURVE
// ============================================================================

/// XP needed to go from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32) -> u64 {
    let level = level as u64;
    5 * level * level + 50 * level + 100
}

/// Derive the level from total XP by peeling off each level's threshold.
pub fn level_from_xp(total_xp: u64) -> LevelBreakdown {
    let mut level = 0u32;
    let mut remaining = total_xp;
    loop {
        let needed = xp_for_next_level(level);
        if remaining < needed {
            return LevelBreakdown {
                level,
                xp_into_level: remaining,
                xp_for_next_level: needed,
            };
        }
        remaining -= needed;
        level += 1;
    }
}

/// Total XP at which `level` is first reached.
pub fn total_xp_for_level(level: u32) -> u64 {
    (0..level).map(xp_for_next_level).sum()
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct LevelingService<S: LevelStore> {
    store: S,
    /// XP rolled per eligible message.
    xp_per_message: RangeInclusive<u64>,
    /// Cooldown between XP gains (prevents spam farming).
    cooldown: Duration,
}

impl<S: LevelStore> LevelingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            xp_per_message: 15..=25,
            cooldown: Duration::seconds(60),
        }
    }

    fn validate_ids(guild_id: u64, user_id: u64) -> Result<(), LevelingError> {
        if user_id == 0 || guild_id == 0 {
            Err(LevelingError::InvalidId)
        } else {
            Ok(())
        }
    }

    /// Process a chat message and potentially award XP.
    ///
    /// Returns `Err(LevelingError::OnCooldown)` while the member is still
    /// gated, otherwise the progress after the award. `leveled_up` tells the
    /// caller whether to announce.
    pub async fn process_message(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<LevelProgress, LevelingError> {
        Self::validate_ids(guild_id, user_id)?;

        if let Some(profile) = self.store.get_profile(guild_id, user_id).await? {
            if let Some(last) = profile.last_message_at {
                let elapsed = now - last;
                if elapsed < self.cooldown {
                    let remaining = (self.cooldown - elapsed).to_std().unwrap_or_default();
                    return Err(LevelingError::OnCooldown(remaining));
                }
            }
        }

        let amount = rand::thread_rng().gen_range(self.xp_per_message.clone());
        let mut progress = self.add_xp(guild_id, user_id, amount).await?;
        self.store
            .set_last_message_at(guild_id, user_id, now)
            .await?;
        progress.profile.last_message_at = Some(now);
        Ok(progress)
    }

    /// Add XP directly and recompute the level.
    pub async fn add_xp(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: u64,
    ) -> Result<LevelProgress, LevelingError> {
        Self::validate_ids(guild_id, user_id)?;

        let previous_level = self
            .store
            .get_profile(guild_id, user_id)
            .await?
            .map(|p| p.level)
            .unwrap_or(0);

        let total = self.store.add_xp(guild_id, user_id, amount).await?;
        let breakdown = level_from_xp(total);
        if breakdown.level != previous_level {
            self.store
                .set_level(guild_id, user_id, breakdown.level)
                .await?;
        }

        let profile = self
            .store
            .get_profile(guild_id, user_id)
            .await?
            .unwrap_or_else(|| LevelProfile {
                xp: total,
                level: breakdown.level,
                ..LevelProfile::empty(guild_id, user_id)
            });

        Ok(Self::progress_from(profile, previous_level))
    }

    pub async fn get_progress(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<LevelProgress, LevelingError> {
        Self::validate_ids(guild_id, user_id)?;
        let profile = self
            .store
            .get_profile(guild_id, user_id)
            .await?
            .unwrap_or_else(|| LevelProfile::empty(guild_id, user_id));
        let level = profile.level;
        Ok(Self::progress_from(profile, level))
    }

    fn progress_from(profile: LevelProfile, previous_level: u32) -> LevelProgress {
        let breakdown = level_from_xp(profile.xp);
        LevelProgress {
            xp_into_level: breakdown.xp_into_level,
            xp_for_next_level: breakdown.xp_for_next_level,
            xp_remaining: breakdown
                .xp_for_next_level
                .saturating_sub(breakdown.xp_into_level),
            leveled_up: breakdown.level > previous_level,
            previous_level,
            profile,
        }
    }

    pub async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<LevelProfile>, LevelingError> {
        if guild_id == 0 {
            return Err(LevelingError::InvalidId);
        }
        self.store.leaderboard(guild_id, limit).await
    }

    pub async fn profiles_with_min_level(
        &self,
        guild_id: u64,
        level: u32,
    ) -> Result<Vec<LevelProfile>, LevelingError> {
        self.store.profiles_with_min_level(guild_id, level).await
    }

    pub async fn set_reward(
        &self,
        guild_id: u64,
        level: u32,
        role_id: u64,
    ) -> Result<LevelReward, LevelingError> {
        let reward = LevelReward {
            guild_id,
            level,
            role_id,
        };
        self.store.set_reward(reward.clone()).await?;
        Ok(reward)
    }

    pub async fn remove_reward(&self, guild_id: u64, level: u32) -> Result<bool, LevelingError> {
        self.store.remove_reward(guild_id, level).await
    }

    pub async fn list_rewards(&self, guild_id: u64) -> Result<Vec<LevelReward>, LevelingError> {
        self.store.list_rewards(guild_id).await
    }

    pub async fn get_reward_for_level(
        &self,
        guild_id: u64,
        level: u32,
    ) -> Result<Option<LevelReward>, LevelingError> {
        Ok(self
            .store
            .list_rewards(guild_id)
            .await?
            .into_iter()
            .find(|r| r.level == level))
    }

    /// Every reward a member at `level` should hold.
    pub async fn rewards_up_to(
        &self,
        guild_id: u64,
        level: u32,
    ) -> Result<Vec<LevelReward>, LevelingError> {
        Ok(self
            .store
            .list_rewards(guild_id)
            .await?
            .into_iter()
            .filter(|r| r.level <= level)
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dashmap::DashMap;

    #[derive(Default)]
    pub(crate) struct MockLevelStore {
        profiles: DashMap<(u64, u64), LevelProfile>,
        rewards: DashMap<(u64, u32), LevelReward>,
    }

    #[async_trait]
    impl LevelStore for MockLevelStore {
        async fn get_profile(
            &self,
            guild_id: u64,
            user_id: u64,
        ) -> Result<Option<LevelProfile>, LevelingError> {
            Ok(self.profiles.get(&(guild_id, user_id)).map(|p| p.clone()))
        }

        async fn add_xp(
            &self,
            guild_id: u64,
            user_id: u64,
            amount: u64,
        ) -> Result<u64, LevelingError> {
            let mut entry = self
                .profiles
                .entry((guild_id, user_id))
                .or_insert_with(|| LevelProfile::empty(guild_id, user_id));
            entry.xp += amount;
            Ok(entry.xp)
        }

        async fn set_level(
            &self,
            guild_id: u64,
            user_id: u64,
            level: u32,
        ) -> Result<(), LevelingError> {
            if let Some(mut p) = self.profiles.get_mut(&(guild_id, user_id)) {
                p.level = level;
            }
            Ok(())
        }

        async fn set_last_message_at(
            &self,
            guild_id: u64,
            user_id: u64,
            at: DateTime<Utc>,
        ) -> Result<(), LevelingError> {
            if let Some(mut p) = self.profiles.get_mut(&(guild_id, user_id)) {
                p.last_message_at = Some(at);
            }
            Ok(())
        }

        async fn leaderboard(
            &self,
            guild_id: u64,
            limit: usize,
        ) -> Result<Vec<LevelProfile>, LevelingError> {
            let mut all: Vec<LevelProfile> = self
                .profiles
                .iter()
                .filter(|p| p.guild_id == guild_id)
                .map(|p| p.clone())
                .collect();
            all.sort_by(|a, b| b.xp.cmp(&a.xp));
            all.truncate(limit);
            Ok(all)
        }

        async fn profiles_with_min_level(
            &self,
            guild_id: u64,
            level: u32,
        ) -> Result<Vec<LevelProfile>, LevelingError> {
            Ok(self
                .profiles
                .iter()
                .filter(|p| p.guild_id == guild_id && p.level >= level)
                .map(|p| p.clone())
                .collect())
        }

        async fn set_reward(&self, reward: LevelReward) -> Result<(), LevelingError> {
            self.rewards.insert((reward.guild_id, reward.level), reward);
            Ok(())
        }

        async fn remove_reward(&self, guild_id: u64, level: u32) -> Result<bool, LevelingError> {
            Ok(self.rewards.remove(&(guild_id, level)).is_some())
        }

        async fn list_rewards(&self, guild_id: u64) -> Result<Vec<LevelReward>, LevelingError> {
            let mut rewards: Vec<LevelReward> = self
                .rewards
                .iter()
                .filter(|r| r.guild_id == guild_id)
                .map(|r| r.clone())
                .collect();
            rewards.sort_by_key(|r| r.level);
            Ok(rewards)
        }
    }

    fn make_service() -> LevelingService<MockLevelStore> {
        LevelingService::new(MockLevelStore::default())
    }

    #[test]
    fn curve_matches_formula() {
        assert_eq!(xp_for_next_level(0), 100);
        assert_eq!(xp_for_next_level(1), 155);
        assert_eq!(xp_for_next_level(2), 220);
        assert_eq!(xp_for_next_level(10), 1100);
    }

    #[test]
    fn level_is_derived_by_subtracting_thresholds() {
        assert_eq!(
            level_from_xp(0),
            LevelBreakdown {
                level: 0,
                xp_into_level: 0,
                xp_for_next_level: 100
            }
        );
        assert_eq!(level_from_xp(99).level, 0);
        assert_eq!(level_from_xp(100).level, 1);
        assert_eq!(level_from_xp(254).level, 1);
        let at_two = level_from_xp(255);
        assert_eq!(at_two.level, 2);
        assert_eq!(at_two.xp_into_level, 0);
        assert_eq!(at_two.xp_for_next_level, 220);
        assert_eq!(total_xp_for_level(2), 255);
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let mut last = 0;
        for xp in (0..50_000).step_by(37) {
            let level = level_from_xp(xp).level;
            assert!(level >= last);
            last = level;
        }
    }

    #[tokio::test]
    async fn add_xp_reports_level_up() {
        let service = make_service();
        let progress = service.add_xp(1, 2, 500).await.unwrap();
        // 100 + 155 + 220 = 475, so 25 XP into level 3.
        assert_eq!(progress.profile.level, 3);
        assert_eq!(progress.previous_level, 0);
        assert!(progress.leveled_up);
        assert_eq!(progress.xp_into_level, 25);
        assert_eq!(progress.xp_for_next_level, 295);
        assert_eq!(progress.xp_remaining, 270);

        let again = service.add_xp(1, 2, 1).await.unwrap();
        assert!(!again.leveled_up);
        assert_eq!(again.profile.xp, 501);
    }

    #[tokio::test]
    async fn message_cooldown_is_enforced() {
        let service = make_service();
        let now = Utc::now();

        service.process_message(1, 2, now).await.unwrap();
        let xp_after_first = service.get_progress(1, 2).await.unwrap().profile.xp;
        assert!((15..=25).contains(&xp_after_first));

        let err = service
            .process_message(1, 2, now + Duration::seconds(30))
            .await
            .unwrap_err();
        assert!(matches!(err, LevelingError::OnCooldown(d) if d.as_secs() <= 30));

        service
            .process_message(1, 2, now + Duration::seconds(61))
            .await
            .unwrap();
        let xp_after_second = service.get_progress(1, 2).await.unwrap().profile.xp;
        assert!(xp_after_second > xp_after_first);
    }

    #[tokio::test]
    async fn process_message_reports_level_up() {
        let service = make_service();
        service.add_xp(1, 2, 95).await.unwrap();
        let progress = service.process_message(1, 2, Utc::now()).await.unwrap();
        assert!(progress.leveled_up);
        assert_eq!(progress.previous_level, 0);
        assert_eq!(progress.profile.level, 1);
        assert!(progress.profile.last_message_at.is_some());
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected() {
        let service = make_service();
        assert!(matches!(
            service.add_xp(0, 1, 10).await,
            Err(LevelingError::InvalidId)
        ));
    }

    #[tokio::test]
    async fn rewards_are_filtered_by_level() {
        let service = make_service();
        service.set_reward(1, 5, 500).await.unwrap();
        service.set_reward(1, 10, 1000).await.unwrap();
        service.set_reward(2, 1, 1).await.unwrap();

        let up_to_seven = service.rewards_up_to(1, 7).await.unwrap();
        assert_eq!(up_to_seven.len(), 1);
        assert_eq!(up_to_seven[0].role_id, 500);

        assert_eq!(service.rewards_up_to(1, 10).await.unwrap().len(), 2);
        assert!(service.get_reward_for_level(1, 10).await.unwrap().is_some());
        assert!(service.remove_reward(1, 10).await.unwrap());
        assert!(!service.remove_reward(1, 10).await.unwrap());
        assert_eq!(service.list_rewards(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_xp() {
        let service = make_service();
        service.add_xp(1, 10, 50).await.unwrap();
        service.add_xp(1, 11, 500).await.unwrap();
        service.add_xp(1, 12, 200).await.unwrap();

        let top = service.leaderboard(1, 2).await.unwrap();
        assert_eq!(top.iter().map(|p| p.user_id).collect::<Vec<_>>(), vec![11, 12]);

        let min_level = service.profiles_with_min_level(1, 1).await.unwrap();
        assert_eq!(min_level.len(), 2);
    }
}
