// Couple service - proposals, love points, check-ins, gifts, the shared
// profile and the memory journal.

use super::couple_catalog::{find_gift, normalize_hex_color, Gift, MilestoneDef, MilestoneKind, MILESTONES};
use super::couple_models::*;
use crate::core::economy::{CoinStore, EconomyService};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use std::collections::HashSet;

pub const LOVE_COOLDOWN_HOURS: i64 = 20;
pub const LOVE_SYNC_WINDOW_HOURS: i64 = 6;
pub const LOVE_SYNC_BONUS: i64 = 12;
pub const MAX_OPTIONAL_MESSAGE: usize = 240;
pub const MAX_TITLE: usize = 80;
pub const MAX_LOVE_SONG: usize = 200;
pub const MAX_PROFILE_BIO: usize = 500;
pub const MAX_MOOD: usize = 50;
pub const MAX_MEMORY_BODY: usize = 600;
pub const MAX_MEMORIES: i64 = 50;
pub const CHECKIN_BASE_REWARD: i64 = 22;
pub const CHECKIN_STREAK_BONUS: i64 = 6;
pub const CHECKIN_MAX_BONUS: i64 = 48;

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone)]
pub struct AffectionResult {
    pub record: CoupleRecord,
    pub points: i64,
    pub bonus: i64,
    pub unlocked: Vec<&'static MilestoneDef>,
}

#[derive(Debug, Clone)]
pub struct CheckinResult {
    pub record: CoupleRecord,
    pub reward: i64,
    pub streak: u32,
    pub unlocked: Vec<&'static MilestoneDef>,
}

#[derive(Debug, Clone)]
pub struct GiftResult {
    pub record: CoupleRecord,
    pub gift: &'static Gift,
    pub new_balance: i64,
    pub unlocked: Vec<&'static MilestoneDef>,
}

#[derive(Debug, Clone)]
pub struct MemoryResult {
    pub memory: CoupleMemory,
    pub unlocked: Vec<&'static MilestoneDef>,
}

/// Everything the status/profile embeds need in one fetch.
#[derive(Debug, Clone)]
pub struct CoupleOverview {
    pub record: CoupleRecord,
    pub profile: CoupleProfile,
    pub latest_memory: Option<CoupleMemory>,
    pub achieved: Vec<&'static MilestoneDef>,
    pub next_milestone: Option<&'static MilestoneDef>,
}

/// Reward for a check-in at the given streak length.
pub fn checkin_reward(streak: u32) -> i64 {
    let bonus = CHECKIN_STREAK_BONUS * (streak.saturating_sub(1) as i64);
    CHECKIN_BASE_REWARD + bonus.min(CHECKIN_MAX_BONUS)
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait CoupleStore: Send + Sync {
    async fn get(&self, couple_id: i64) -> Result<Option<CoupleRecord>, CoupleError>;

    /// Newest record of `user` in `guild` whose status is one of `statuses`.
    async fn find_relationship(
        &self,
        guild_id: u64,
        user_id: u64,
        statuses: &[CoupleStatus],
    ) -> Result<Option<CoupleRecord>, CoupleError>;

    async fn get_pending_for_target(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CoupleRecord>, CoupleError>;

    /// Insert a pending record. Must fail with `AlreadyCommitted` if either
    /// member already holds a pending or active record.
    async fn create_proposal(&self, proposal: &NewProposal) -> Result<CoupleRecord, CoupleError>;

    /// Move `couple_id` from `from` to `to` if it is still in `from`.
    async fn transition(
        &self,
        couple_id: i64,
        from: CoupleStatus,
        to: CoupleStatus,
        anniversary: Option<NaiveDate>,
        ended_by: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Option<CoupleRecord>, CoupleError>;

    async fn update_anniversary(
        &self,
        couple_id: i64,
        anniversary: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<CoupleRecord>, CoupleError>;

    /// Add points to an active couple.
    async fn add_love_points(
        &self,
        couple_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<CoupleRecord>, CoupleError>;

    async fn set_last_affection(
        &self,
        couple_id: i64,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<(), CoupleError>;

    /// Active couples by love points, oldest first on ties.
    async fn leaderboard(&self, guild_id: u64, limit: usize)
        -> Result<Vec<CoupleRecord>, CoupleError>;

    async fn get_profile(&self, couple_id: i64) -> Result<Option<CoupleProfile>, CoupleError>;

    async fn save_profile(&self, profile: &CoupleProfile) -> Result<(), CoupleError>;

    /// Record a member's check-in for a day. Returns false if it already exists.
    async fn record_checkin(
        &self,
        couple_id: i64,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<bool, CoupleError>;

    async fn add_memory(
        &self,
        couple_id: i64,
        title: &str,
        description: Option<&str>,
        created_by: u64,
        now: DateTime<Utc>,
    ) -> Result<CoupleMemory, CoupleError>;

    /// Newest first.
    async fn list_memories(
        &self,
        couple_id: i64,
        limit: usize,
    ) -> Result<Vec<CoupleMemory>, CoupleError>;

    async fn delete_memory(&self, couple_id: i64, memory_id: i64) -> Result<bool, CoupleError>;

    async fn count_memories(&self, couple_id: i64) -> Result<i64, CoupleError>;

    async fn latest_memory(&self, couple_id: i64) -> Result<Option<CoupleMemory>, CoupleError>;

    async fn list_milestones(&self, couple_id: i64) -> Result<Vec<CoupleMilestone>, CoupleError>;

    /// Insert once. Returns false if the milestone was already recorded.
    async fn record_milestone(
        &self,
        couple_id: i64,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, CoupleError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct CoupleService<S: CoupleStore> {
    store: S,
}

fn check_length(
    value: Option<&str>,
    field: &'static str,
    max: usize,
) -> Result<(), CoupleError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CoupleError::FieldTooLong { field, max }),
        _ => Ok(()),
    }
}

impl<S: CoupleStore> CoupleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub async fn propose(
        &self,
        guild_id: u64,
        initiator_id: u64,
        target_id: u64,
        target_is_bot: bool,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CoupleRecord, CoupleError> {
        if target_is_bot {
            return Err(CoupleError::TargetIsBot);
        }
        if target_id == initiator_id {
            return Err(CoupleError::SelfProposal);
        }
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if message
            .as_deref()
            .is_some_and(|m| m.chars().count() > MAX_OPTIONAL_MESSAGE)
        {
            return Err(CoupleError::MessageTooLong(MAX_OPTIONAL_MESSAGE));
        }

        let open = [CoupleStatus::Pending, CoupleStatus::Active];
        if self
            .store
            .find_relationship(guild_id, initiator_id, &open)
            .await?
            .is_some()
        {
            return Err(CoupleError::AlreadyCommitted);
        }
        if self
            .store
            .find_relationship(guild_id, target_id, &open)
            .await?
            .is_some()
        {
            return Err(CoupleError::TargetCommitted(target_id));
        }

        let record = self
            .store
            .create_proposal(&NewProposal {
                guild_id,
                initiator_id,
                target_id,
                message,
                created_at: now,
            })
            .await?;
        tracing::info!(guild_id, couple_id = record.id, initiator_id, target_id, "Couple proposal created");
        Ok(record)
    }

    /// Answer the pending proposal addressed to `user_id`.
    pub async fn respond(
        &self,
        guild_id: u64,
        user_id: u64,
        accept: bool,
        now: DateTime<Utc>,
    ) -> Result<CoupleRecord, CoupleError> {
        let pending = self
            .store
            .get_pending_for_target(guild_id, user_id)
            .await?
            .ok_or(CoupleError::NoPendingProposal)?;

        let action = if accept {
            CoupleAction::Accept
        } else {
            CoupleAction::Reject
        };
        let next = pending.status.transition(action)?;
        let (anniversary, ended_by) = if accept {
            (Some(pending.anniversary.unwrap_or_else(|| now.date_naive())), None)
        } else {
            (None, Some(user_id))
        };

        self.store
            .transition(pending.id, pending.status, next, anniversary, ended_by, now)
            .await?
            .ok_or(CoupleError::NoPendingProposal)
    }

    pub async fn breakup(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<CoupleRecord, CoupleError> {
        let record = self.active_for(guild_id, user_id).await?;
        let next = record.status.transition(CoupleAction::Breakup)?;
        self.store
            .transition(record.id, record.status, next, None, Some(user_id), now)
            .await?
            .ok_or(CoupleError::NoActiveCouple)
    }

    /// The user's pending or active record, if any.
    pub async fn status(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CoupleRecord>, CoupleError> {
        self.store
            .find_relationship(guild_id, user_id, &[CoupleStatus::Pending, CoupleStatus::Active])
            .await
    }

    pub async fn active_for(&self, guild_id: u64, user_id: u64) -> Result<CoupleRecord, CoupleError> {
        self.store
            .find_relationship(guild_id, user_id, &[CoupleStatus::Active])
            .await?
            .ok_or(CoupleError::NoActiveCouple)
    }

    pub async fn set_anniversary(
        &self,
        guild_id: u64,
        user_id: u64,
        raw_date: &str,
        now: DateTime<Utc>,
    ) -> Result<CoupleRecord, CoupleError> {
        let record = self.active_for(guild_id, user_id).await?;
        let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
            .map_err(|_| CoupleError::InvalidDate)?;
        if date > now.date_naive() {
            return Err(CoupleError::FutureDate);
        }
        self.store
            .update_anniversary(record.id, date, now)
            .await?
            .ok_or(CoupleError::NoActiveCouple)
    }

    pub async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<CoupleRecord>, CoupleError> {
        self.store.leaderboard(guild_id, limit).await
    }

    // ------------------------------------------------------------------
    // Love points
    // ------------------------------------------------------------------

    pub async fn send_affection(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<AffectionResult, CoupleError> {
        let record = self.active_for(guild_id, user_id).await?;
        let cooldown = Duration::hours(LOVE_COOLDOWN_HOURS);

        if let Some(last) = record.last_affection_for(user_id) {
            if now - last < cooldown {
                return Err(CoupleError::OnCooldown(cooldown - (now - last)));
            }
        }

        let partner_last = record
            .partner_id(user_id)
            .and_then(|partner| record.last_affection_for(partner));
        let bonus = match partner_last {
            Some(at) if (now - at).num_seconds().abs() <= LOVE_SYNC_WINDOW_HOURS * 3600 => {
                LOVE_SYNC_BONUS
            }
            _ => 0,
        };
        let points = rand::thread_rng().gen_range(18..=40) + bonus;

        let updated = self
            .store
            .add_love_points(record.id, points, now)
            .await?
            .ok_or(CoupleError::NoActiveCouple)?;
        self.store.set_last_affection(record.id, user_id, now).await?;

        let unlocked = self.check_milestones(&updated).await?;
        Ok(AffectionResult {
            record: updated,
            points,
            bonus,
            unlocked,
        })
    }

    /// Daily check-in. Each member checks in once per UTC day; the shared
    /// streak grows when the couple's previous check-in was yesterday.
    pub async fn checkin(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<CheckinResult, CoupleError> {
        let record = self.active_for(guild_id, user_id).await?;
        let today = now.date_naive();

        if !self.store.record_checkin(record.id, user_id, today).await? {
            return Err(CoupleError::AlreadyCheckedIn);
        }

        let mut profile = self.profile(record.id).await?;
        profile.checkin_streak = match profile.last_checkin_date {
            Some(last) if last == today => profile.checkin_streak.max(1),
            Some(last) if today.pred_opt() == Some(last) => profile.checkin_streak + 1,
            _ => 1,
        };
        profile.last_checkin_date = Some(today);
        self.store.save_profile(&profile).await?;

        let reward = checkin_reward(profile.checkin_streak);
        let updated = self
            .store
            .add_love_points(record.id, reward, now)
            .await?
            .ok_or(CoupleError::NoActiveCouple)?;

        let unlocked = self.check_milestones(&updated).await?;
        Ok(CheckinResult {
            record: updated,
            reward,
            streak: profile.checkin_streak,
            unlocked,
        })
    }

    /// Buy a gift for the partner with the giver's coins.
    pub async fn send_gift<C: CoinStore>(
        &self,
        economy: &EconomyService<C>,
        guild_id: u64,
        user_id: u64,
        gift_key: &str,
        now: DateTime<Utc>,
    ) -> Result<GiftResult, CoupleError> {
        let gift = find_gift(gift_key).ok_or_else(|| CoupleError::UnknownGift(gift_key.to_string()))?;
        let record = self.active_for(guild_id, user_id).await?;

        let new_balance = economy.spend(guild_id, user_id, gift.cost).await?;
        let updated = match self.store.add_love_points(record.id, gift.love, now).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                economy.adjust(guild_id, user_id, gift.cost).await?;
                return Err(CoupleError::NoActiveCouple);
            }
            Err(e) => {
                economy.adjust(guild_id, user_id, gift.cost).await?;
                return Err(e);
            }
        };

        let unlocked = self.check_milestones(&updated).await?;
        Ok(GiftResult {
            record: updated,
            gift,
            new_balance,
            unlocked,
        })
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    pub async fn profile(&self, couple_id: i64) -> Result<CoupleProfile, CoupleError> {
        Ok(self
            .store
            .get_profile(couple_id)
            .await?
            .unwrap_or_else(|| CoupleProfile::empty(couple_id)))
    }

    pub async fn update_profile(
        &self,
        guild_id: u64,
        user_id: u64,
        patch: ProfilePatch,
    ) -> Result<CoupleProfile, CoupleError> {
        if patch.is_empty() {
            return Err(CoupleError::NoChanges);
        }
        check_length(patch.title.as_deref(), "Judul", MAX_TITLE)?;
        check_length(patch.love_song.as_deref(), "Lagu favorit", MAX_LOVE_SONG)?;
        check_length(patch.bio.as_deref(), "Bio", MAX_PROFILE_BIO)?;
        check_length(patch.current_mood.as_deref(), "Mood", MAX_MOOD)?;
        let theme_color = match patch.theme_color.as_deref() {
            Some(raw) => Some(normalize_hex_color(raw).ok_or(CoupleError::InvalidColor)?),
            None => None,
        };

        let record = self.active_for(guild_id, user_id).await?;
        let mut profile = self.profile(record.id).await?;
        if patch.title.is_some() {
            profile.title = patch.title;
        }
        if theme_color.is_some() {
            profile.theme_color = theme_color;
        }
        if patch.love_song.is_some() {
            profile.love_song = patch.love_song;
        }
        if patch.bio.is_some() {
            profile.bio = patch.bio;
        }
        if patch.current_mood.is_some() {
            profile.current_mood = patch.current_mood;
        }
        self.store.save_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn overview(&self, record: CoupleRecord) -> Result<CoupleOverview, CoupleError> {
        let profile = self.profile(record.id).await?;
        let latest_memory = self.store.latest_memory(record.id).await?;
        let achieved_keys: HashSet<String> = self
            .store
            .list_milestones(record.id)
            .await?
            .into_iter()
            .map(|m| m.milestone_key)
            .collect();
        let achieved = MILESTONES
            .iter()
            .filter(|m| achieved_keys.contains(m.key))
            .collect();
        let next_milestone = MILESTONES.iter().find(|m| !achieved_keys.contains(m.key));
        Ok(CoupleOverview {
            record,
            profile,
            latest_memory,
            achieved,
            next_milestone,
        })
    }

    // ------------------------------------------------------------------
    // Memories
    // ------------------------------------------------------------------

    pub async fn add_memory(
        &self,
        guild_id: u64,
        user_id: u64,
        title: &str,
        body: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MemoryResult, CoupleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoupleError::NoChanges);
        }
        check_length(Some(title), "Judul memori", MAX_TITLE)?;
        let body = body.map(str::trim).filter(|b| !b.is_empty());
        check_length(body, "Cerita", MAX_MEMORY_BODY)?;

        let record = self.active_for(guild_id, user_id).await?;
        if self.store.count_memories(record.id).await? >= MAX_MEMORIES {
            return Err(CoupleError::MemoryAlbumFull);
        }

        let memory = self
            .store
            .add_memory(record.id, title, body, user_id, now)
            .await?;
        let unlocked = self.check_milestones(&record).await?;
        Ok(MemoryResult { memory, unlocked })
    }

    /// Memories of the active (or most recently ended) couple, newest first.
    pub async fn list_memories(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<CoupleMemory>, CoupleError> {
        let record = self
            .store
            .find_relationship(guild_id, user_id, &[CoupleStatus::Active, CoupleStatus::Ended])
            .await?
            .ok_or(CoupleError::NoActiveCouple)?;
        self.store
            .list_memories(record.id, limit.clamp(1, 10))
            .await
    }

    pub async fn delete_memory(
        &self,
        guild_id: u64,
        user_id: u64,
        memory_id: i64,
    ) -> Result<bool, CoupleError> {
        let record = self.active_for(guild_id, user_id).await?;
        self.store.delete_memory(record.id, memory_id).await
    }

    pub async fn count_memories(&self, couple_id: i64) -> Result<i64, CoupleError> {
        self.store.count_memories(couple_id).await
    }

    // ------------------------------------------------------------------
    // Milestones
    // ------------------------------------------------------------------

    /// Record every milestone the couple now qualifies for and return the new ones.
    pub async fn check_milestones(
        &self,
        record: &CoupleRecord,
    ) -> Result<Vec<&'static MilestoneDef>, CoupleError> {
        let achieved: HashSet<String> = self
            .store
            .list_milestones(record.id)
            .await?
            .into_iter()
            .map(|m| m.milestone_key)
            .collect();

        let mut profile: Option<CoupleProfile> = None;
        let mut memories: Option<i64> = None;
        let mut unlocked = Vec::new();
        let now = Utc::now();

        for milestone in MILESTONES.iter() {
            if achieved.contains(milestone.key) {
                continue;
            }
            let value = match milestone.kind {
                MilestoneKind::LovePoints => record.love_points,
                MilestoneKind::Streak => {
                    if profile.is_none() {
                        profile = Some(self.profile(record.id).await?);
                    }
                    profile.as_ref().map(|p| p.checkin_streak as i64).unwrap_or(0)
                }
                MilestoneKind::Memories => {
                    if memories.is_none() {
                        memories = Some(self.store.count_memories(record.id).await?);
                    }
                    memories.unwrap_or(0)
                }
            };
            if value >= milestone.threshold
                && self
                    .store
                    .record_milestone(record.id, milestone.key, now)
                    .await?
            {
                tracing::info!(couple_id = record.id, milestone = milestone.key, "Couple milestone unlocked");
                unlocked.push(milestone);
            }
        }
        Ok(unlocked)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::economy::economy_service::tests::InMemoryCoinStore;
    use crate::core::economy::EconomyError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        couples: Vec<CoupleRecord>,
        profiles: HashMap<i64, CoupleProfile>,
        checkins: HashSet<(i64, u64, NaiveDate)>,
        memories: Vec<CoupleMemory>,
        milestones: Vec<CoupleMilestone>,
    }

    #[derive(Default)]
    struct MockCoupleStore {
        state: Mutex<State>,
    }

    #[async_trait]
    impl CoupleStore for MockCoupleStore {
        async fn get(&self, couple_id: i64) -> Result<Option<CoupleRecord>, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state.couples.iter().find(|c| c.id == couple_id).cloned())
        }

        async fn find_relationship(
            &self,
            guild_id: u64,
            user_id: u64,
            statuses: &[CoupleStatus],
        ) -> Result<Option<CoupleRecord>, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .couples
                .iter()
                .rev()
                .find(|c| c.guild_id == guild_id && c.is_member(user_id) && statuses.contains(&c.status))
                .cloned())
        }

        async fn get_pending_for_target(
            &self,
            guild_id: u64,
            user_id: u64,
        ) -> Result<Option<CoupleRecord>, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .couples
                .iter()
                .rev()
                .find(|c| {
                    c.guild_id == guild_id
                        && c.pending_target_id == user_id
                        && c.status == CoupleStatus::Pending
                })
                .cloned())
        }

        async fn create_proposal(&self, p: &NewProposal) -> Result<CoupleRecord, CoupleError> {
            let mut state = self.state.lock().unwrap();
            if state.couples.iter().any(|c| {
                c.guild_id == p.guild_id
                    && c.status.is_open()
                    && (c.is_member(p.initiator_id) || c.is_member(p.target_id))
            }) {
                return Err(CoupleError::AlreadyCommitted);
            }
            let (one, two) = sorted_pair(p.initiator_id, p.target_id);
            let record = CoupleRecord {
                id: state.couples.len() as i64 + 1,
                guild_id: p.guild_id,
                member_one_id: one,
                member_two_id: two,
                initiator_id: p.initiator_id,
                pending_target_id: p.target_id,
                status: CoupleStatus::Pending,
                proposal_message: p.message.clone(),
                anniversary: None,
                love_points: 0,
                last_affection_one: None,
                last_affection_two: None,
                created_at: p.created_at,
                updated_at: p.created_at,
                ended_at: None,
                ended_by: None,
            };
            state.couples.push(record.clone());
            Ok(record)
        }

        async fn transition(
            &self,
            couple_id: i64,
            from: CoupleStatus,
            to: CoupleStatus,
            anniversary: Option<NaiveDate>,
            ended_by: Option<u64>,
            now: DateTime<Utc>,
        ) -> Result<Option<CoupleRecord>, CoupleError> {
            let mut state = self.state.lock().unwrap();
            let Some(c) = state
                .couples
                .iter_mut()
                .find(|c| c.id == couple_id && c.status == from)
            else {
                return Ok(None);
            };
            c.status = to;
            if anniversary.is_some() {
                c.anniversary = anniversary;
            }
            if ended_by.is_some() {
                c.ended_by = ended_by;
                c.ended_at = Some(now);
            }
            c.updated_at = now;
            Ok(Some(c.clone()))
        }

        async fn update_anniversary(
            &self,
            couple_id: i64,
            anniversary: NaiveDate,
            now: DateTime<Utc>,
        ) -> Result<Option<CoupleRecord>, CoupleError> {
            let mut state = self.state.lock().unwrap();
            Ok(state
                .couples
                .iter_mut()
                .find(|c| c.id == couple_id && c.status == CoupleStatus::Active)
                .map(|c| {
                    c.anniversary = Some(anniversary);
                    c.updated_at = now;
                    c.clone()
                }))
        }

        async fn add_love_points(
            &self,
            couple_id: i64,
            amount: i64,
            now: DateTime<Utc>,
        ) -> Result<Option<CoupleRecord>, CoupleError> {
            let mut state = self.state.lock().unwrap();
            Ok(state
                .couples
                .iter_mut()
                .find(|c| c.id == couple_id && c.status == CoupleStatus::Active)
                .map(|c| {
                    c.love_points += amount;
                    c.updated_at = now;
                    c.clone()
                }))
        }

        async fn set_last_affection(
            &self,
            couple_id: i64,
            user_id: u64,
            at: DateTime<Utc>,
        ) -> Result<(), CoupleError> {
            let mut state = self.state.lock().unwrap();
            if let Some(c) = state.couples.iter_mut().find(|c| c.id == couple_id) {
                if user_id == c.member_one_id {
                    c.last_affection_one = Some(at);
                } else if user_id == c.member_two_id {
                    c.last_affection_two = Some(at);
                }
            }
            Ok(())
        }

        async fn leaderboard(
            &self,
            guild_id: u64,
            limit: usize,
        ) -> Result<Vec<CoupleRecord>, CoupleError> {
            let state = self.state.lock().unwrap();
            let mut rows: Vec<CoupleRecord> = state
                .couples
                .iter()
                .filter(|c| c.guild_id == guild_id && c.status == CoupleStatus::Active)
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.love_points
                    .cmp(&a.love_points)
                    .then(a.created_at.cmp(&b.created_at))
            });
            rows.truncate(limit);
            Ok(rows)
        }

        async fn get_profile(&self, couple_id: i64) -> Result<Option<CoupleProfile>, CoupleError> {
            Ok(self.state.lock().unwrap().profiles.get(&couple_id).cloned())
        }

        async fn save_profile(&self, profile: &CoupleProfile) -> Result<(), CoupleError> {
            self.state
                .lock()
                .unwrap()
                .profiles
                .insert(profile.couple_id, profile.clone());
            Ok(())
        }

        async fn record_checkin(
            &self,
            couple_id: i64,
            user_id: u64,
            date: NaiveDate,
        ) -> Result<bool, CoupleError> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .checkins
                .insert((couple_id, user_id, date)))
        }

        async fn add_memory(
            &self,
            couple_id: i64,
            title: &str,
            description: Option<&str>,
            created_by: u64,
            now: DateTime<Utc>,
        ) -> Result<CoupleMemory, CoupleError> {
            let mut state = self.state.lock().unwrap();
            let memory = CoupleMemory {
                id: state.memories.len() as i64 + 1,
                couple_id,
                title: title.to_string(),
                description: description.map(str::to_string),
                created_by,
                created_at: now,
            };
            state.memories.push(memory.clone());
            Ok(memory)
        }

        async fn list_memories(
            &self,
            couple_id: i64,
            limit: usize,
        ) -> Result<Vec<CoupleMemory>, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .memories
                .iter()
                .rev()
                .filter(|m| m.couple_id == couple_id)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn delete_memory(&self, couple_id: i64, memory_id: i64) -> Result<bool, CoupleError> {
            let mut state = self.state.lock().unwrap();
            let before = state.memories.len();
            state
                .memories
                .retain(|m| !(m.couple_id == couple_id && m.id == memory_id));
            Ok(state.memories.len() != before)
        }

        async fn count_memories(&self, couple_id: i64) -> Result<i64, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state.memories.iter().filter(|m| m.couple_id == couple_id).count() as i64)
        }

        async fn latest_memory(&self, couple_id: i64) -> Result<Option<CoupleMemory>, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .memories
                .iter()
                .rev()
                .find(|m| m.couple_id == couple_id)
                .cloned())
        }

        async fn list_milestones(&self, couple_id: i64) -> Result<Vec<CoupleMilestone>, CoupleError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .milestones
                .iter()
                .filter(|m| m.couple_id == couple_id)
                .cloned()
                .collect())
        }

        async fn record_milestone(
            &self,
            couple_id: i64,
            key: &str,
            now: DateTime<Utc>,
        ) -> Result<bool, CoupleError> {
            let mut state = self.state.lock().unwrap();
            if state
                .milestones
                .iter()
                .any(|m| m.couple_id == couple_id && m.milestone_key == key)
            {
                return Ok(false);
            }
            state.milestones.push(CoupleMilestone {
                couple_id,
                milestone_key: key.to_string(),
                achieved_at: now,
            });
            Ok(true)
        }
    }

    const GUILD: u64 = 1;
    const ALICE: u64 = 10;
    const BOB: u64 = 20;
    const CAROL: u64 = 30;

    async fn active_couple(service: &CoupleService<MockCoupleStore>, now: DateTime<Utc>) -> CoupleRecord {
        service
            .propose(GUILD, ALICE, BOB, false, Some("mau jadi pasanganku?".into()), now)
            .await
            .unwrap();
        service.respond(GUILD, BOB, true, now).await.unwrap()
    }

    #[tokio::test]
    async fn propose_validations() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();

        assert!(matches!(
            service.propose(GUILD, ALICE, BOB, true, None, now).await,
            Err(CoupleError::TargetIsBot)
        ));
        assert!(matches!(
            service.propose(GUILD, ALICE, ALICE, false, None, now).await,
            Err(CoupleError::SelfProposal)
        ));
        assert!(matches!(
            service
                .propose(GUILD, ALICE, BOB, false, Some("x".repeat(241)), now)
                .await,
            Err(CoupleError::MessageTooLong(240))
        ));

        service.propose(GUILD, ALICE, BOB, false, None, now).await.unwrap();
        assert!(matches!(
            service.propose(GUILD, ALICE, CAROL, false, None, now).await,
            Err(CoupleError::AlreadyCommitted)
        ));
        assert!(matches!(
            service.propose(GUILD, CAROL, BOB, false, None, now).await,
            Err(CoupleError::TargetCommitted(BOB))
        ));
    }

    #[tokio::test]
    async fn accept_sets_anniversary_and_pair_is_sorted() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();
        service.propose(GUILD, BOB, ALICE, false, None, now).await.unwrap();

        // Only the target can answer.
        assert!(matches!(
            service.respond(GUILD, BOB, true, now).await,
            Err(CoupleError::NoPendingProposal)
        ));

        let record = service.respond(GUILD, ALICE, true, now).await.unwrap();
        assert_eq!(record.status, CoupleStatus::Active);
        assert_eq!(record.anniversary, Some(now.date_naive()));
        assert_eq!((record.member_one_id, record.member_two_id), (ALICE, BOB));
        assert_eq!(record.initiator_id, BOB);
    }

    #[tokio::test]
    async fn reject_and_breakup_free_both_members() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();

        service.propose(GUILD, ALICE, BOB, false, None, now).await.unwrap();
        let rejected = service.respond(GUILD, BOB, false, now).await.unwrap();
        assert_eq!(rejected.status, CoupleStatus::Rejected);
        assert_eq!(rejected.ended_by, Some(BOB));

        let record = active_couple(&service, now).await;
        assert_eq!(record.status, CoupleStatus::Active);
        let ended = service.breakup(GUILD, ALICE, now).await.unwrap();
        assert_eq!(ended.status, CoupleStatus::Ended);
        assert!(service.status(GUILD, ALICE).await.unwrap().is_none());
        assert!(matches!(
            service.breakup(GUILD, ALICE, now).await,
            Err(CoupleError::NoActiveCouple)
        ));

        // Both can start over.
        service.propose(GUILD, BOB, CAROL, false, None, now).await.unwrap();
    }

    #[tokio::test]
    async fn affection_cooldown_and_sync_bonus() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();
        active_couple(&service, now).await;

        let first = service.send_affection(GUILD, ALICE, now).await.unwrap();
        assert_eq!(first.bonus, 0);
        assert!((18..=40).contains(&first.points));

        let err = service
            .send_affection(GUILD, ALICE, now + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoupleError::OnCooldown(d) if d == Duration::hours(19)));

        // Partner within 6 hours gets the sync bonus.
        let second = service
            .send_affection(GUILD, BOB, now + Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(second.bonus, LOVE_SYNC_BONUS);
        assert!((30..=52).contains(&second.points));
        assert_eq!(second.record.love_points, first.points + second.points);

        let later = service
            .send_affection(GUILD, ALICE, now + Duration::hours(20))
            .await
            .unwrap();
        assert_eq!(later.bonus, 0);
    }

    #[test]
    fn checkin_reward_curve() {
        assert_eq!(checkin_reward(1), 22);
        assert_eq!(checkin_reward(2), 28);
        assert_eq!(checkin_reward(9), 22 + 48);
        assert_eq!(checkin_reward(30), 22 + 48);
    }

    #[tokio::test]
    async fn checkin_streak_rules() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();
        active_couple(&service, now).await;

        let day1 = service.checkin(GUILD, ALICE, now).await.unwrap();
        assert_eq!(day1.streak, 1);
        assert_eq!(day1.reward, 22);
        assert!(matches!(
            service.checkin(GUILD, ALICE, now).await,
            Err(CoupleError::AlreadyCheckedIn)
        ));

        // Partner on the same day keeps the streak.
        let partner = service.checkin(GUILD, BOB, now).await.unwrap();
        assert_eq!(partner.streak, 1);

        let day2 = service
            .checkin(GUILD, ALICE, now + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(day2.streak, 2);
        assert_eq!(day2.reward, 28);

        let day3 = service
            .checkin(GUILD, ALICE, now + Duration::days(2))
            .await
            .unwrap();
        assert_eq!(day3.streak, 3);
        assert!(day3.unlocked.iter().any(|m| m.key == "streak_3"));

        // Skipping a day resets.
        let day5 = service
            .checkin(GUILD, ALICE, now + Duration::days(4))
            .await
            .unwrap();
        assert_eq!(day5.streak, 1);
    }

    #[tokio::test]
    async fn gifts_spend_coins_and_add_love() {
        let service = CoupleService::new(MockCoupleStore::default());
        let economy = EconomyService::new(InMemoryCoinStore::default());
        let now = Utc::now();
        active_couple(&service, now).await;

        let err = service
            .send_gift(&economy, GUILD, ALICE, "ring", now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoupleError::Economy(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(economy.balance(GUILD, ALICE).await.unwrap(), 0);

        economy.adjust(GUILD, ALICE, 1000).await.unwrap();
        let result = service
            .send_gift(&economy, GUILD, ALICE, "ring", now)
            .await
            .unwrap();
        assert_eq!(result.new_balance, 100);
        assert_eq!(result.record.love_points, 110);

        assert!(matches!(
            service.send_gift(&economy, GUILD, ALICE, "yacht", now).await,
            Err(CoupleError::UnknownGift(_))
        ));
    }

    #[tokio::test]
    async fn milestones_unlock_once() {
        let service = CoupleService::new(MockCoupleStore::default());
        let economy = EconomyService::new(InMemoryCoinStore::default());
        let now = Utc::now();
        active_couple(&service, now).await;
        economy.adjust(GUILD, ALICE, 5000).await.unwrap();

        let first = service
            .send_gift(&economy, GUILD, ALICE, "vacation", now)
            .await
            .unwrap();
        assert!(first.unlocked.is_empty());

        let second = service
            .send_gift(&economy, GUILD, ALICE, "chocolate", now)
            .await
            .unwrap();
        assert_eq!(
            second.unlocked.iter().map(|m| m.key).collect::<Vec<_>>(),
            vec!["love_200"]
        );

        let third = service
            .send_gift(&economy, GUILD, ALICE, "flowers", now)
            .await
            .unwrap();
        assert!(third.unlocked.is_empty());
    }

    #[tokio::test]
    async fn memories_and_profile() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();
        let record = active_couple(&service, now).await;

        for i in 0..5 {
            let result = service
                .add_memory(GUILD, ALICE, &format!("Kenangan {}", i), Some("seru"), now)
                .await
                .unwrap();
            if i == 4 {
                assert!(result.unlocked.iter().any(|m| m.key == "memory_5"));
            }
        }
        let listed = service.list_memories(GUILD, BOB, 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].title, "Kenangan 4");

        assert!(matches!(
            service
                .add_memory(GUILD, ALICE, "ok", Some("x".repeat(601).as_str()), now)
                .await,
            Err(CoupleError::FieldTooLong { max: 600, .. })
        ));

        assert!(service.delete_memory(GUILD, BOB, listed[0].id).await.unwrap());
        assert!(!service.delete_memory(GUILD, BOB, listed[0].id).await.unwrap());

        assert!(matches!(
            service
                .update_profile(GUILD, ALICE, ProfilePatch::default())
                .await,
            Err(CoupleError::NoChanges)
        ));
        assert!(matches!(
            service
                .update_profile(
                    GUILD,
                    ALICE,
                    ProfilePatch {
                        theme_color: Some("nope".into()),
                        ..Default::default()
                    }
                )
                .await,
            Err(CoupleError::InvalidColor)
        ));
        let profile = service
            .update_profile(
                GUILD,
                BOB,
                ProfilePatch {
                    title: Some("Duo Senja".into()),
                    theme_color: Some("f6a".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.couple_id, record.id);
        assert_eq!(profile.theme_color.as_deref(), Some("#FF66AA"));

        let overview = service.overview(record).await.unwrap();
        assert_eq!(overview.profile.title.as_deref(), Some("Duo Senja"));
        assert!(overview.achieved.iter().any(|m| m.key == "memory_5"));
        assert_eq!(overview.next_milestone.map(|m| m.key), Some("love_200"));
    }

    #[tokio::test]
    async fn anniversary_rules() {
        let service = CoupleService::new(MockCoupleStore::default());
        let now = Utc::now();
        active_couple(&service, now).await;

        assert!(matches!(
            service.set_anniversary(GUILD, ALICE, "kemarin", now).await,
            Err(CoupleError::InvalidDate)
        ));
        let tomorrow = (now + Duration::days(1)).date_naive().to_string();
        assert!(matches!(
            service.set_anniversary(GUILD, ALICE, &tomorrow, now).await,
            Err(CoupleError::FutureDate)
        ));
        let updated = service
            .set_anniversary(GUILD, ALICE, "2024-02-14", now)
            .await
            .unwrap();
        assert_eq!(updated.anniversary, NaiveDate::from_ymd_opt(2024, 2, 14));
        assert!(matches!(
            service.set_anniversary(GUILD, CAROL, "2024-02-14", now).await,
            Err(CoupleError::NoActiveCouple)
        ));
    }

    #[tokio::test]
    async fn leaderboard_orders_by_points_then_age() {
        let service = CoupleService::new(MockCoupleStore::default());
        let economy = EconomyService::new(InMemoryCoinStore::default());
        let now = Utc::now();

        service.propose(GUILD, ALICE, BOB, false, None, now).await.unwrap();
        service.respond(GUILD, BOB, true, now).await.unwrap();
        service
            .propose(GUILD, CAROL, 40, false, None, now + Duration::seconds(1))
            .await
            .unwrap();
        service.respond(GUILD, 40, true, now).await.unwrap();

        let board = service.leaderboard(GUILD, 10).await.unwrap();
        assert_eq!(board[0].member_one_id, ALICE);

        economy.adjust(GUILD, CAROL, 500).await.unwrap();
        service
            .send_gift(&economy, GUILD, CAROL, "flowers", now)
            .await
            .unwrap();
        let board = service.leaderboard(GUILD, 10).await.unwrap();
        assert_eq!(board[0].member_one_id, CAROL);
    }
}
