// SQLite implementation of the CoupleStore trait

use crate::core::couples::{
    sorted_pair, CoupleError, CoupleMemory, CoupleMilestone, CoupleProfile, CoupleRecord,
    CoupleStatus, CoupleStore, NewProposal,
};
use crate::infra::database::{opt_id, parse_date, parse_time, to_text};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteCoupleStore {
    pool: Pool<Sqlite>,
}

impl SqliteCoupleStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS couples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                member_one_id INTEGER NOT NULL,
                member_two_id INTEGER NOT NULL,
                initiator_id INTEGER NOT NULL,
                pending_target_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                proposal_message TEXT,
                anniversary TEXT,
                love_points INTEGER NOT NULL DEFAULT 0,
                last_affection_one TEXT,
                last_affection_two TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                ended_at TEXT,
                ended_by INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // A member may hold at most one open record per guild on each side of the pair.
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_couples_open_one
            ON couples(guild_id, member_one_id) WHERE status IN ('pending', 'active')
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_couples_open_two
            ON couples(guild_id, member_two_id) WHERE status IN ('pending', 'active')
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS couple_profiles (
                couple_id INTEGER PRIMARY KEY REFERENCES couples(id) ON DELETE CASCADE,
                title TEXT,
                theme_color TEXT,
                love_song TEXT,
                bio TEXT,
                current_mood TEXT,
                checkin_streak INTEGER NOT NULL DEFAULT 0,
                last_checkin_date TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS couple_memories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                couple_id INTEGER NOT NULL REFERENCES couples(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                created_by INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS couple_milestones (
                couple_id INTEGER NOT NULL REFERENCES couples(id) ON DELETE CASCADE,
                milestone_key TEXT NOT NULL,
                achieved_at TEXT NOT NULL,
                PRIMARY KEY (couple_id, milestone_key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS couple_checkins (
                couple_id INTEGER NOT NULL REFERENCES couples(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL,
                checkin_date TEXT NOT NULL,
                PRIMARY KEY (couple_id, user_id, checkin_date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_couple_memories_couple ON couple_memories(couple_id, id DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn storage(e: sqlx::Error) -> CoupleError {
    CoupleError::StorageError(e.to_string())
}

fn row_to_couple(row: &SqliteRow) -> Result<CoupleRecord, CoupleError> {
    let raw_status: String = row.get("status");
    let status = CoupleStatus::parse(&raw_status)
        .ok_or_else(|| CoupleError::StorageError(format!("unknown couple status '{}'", raw_status)))?;
    let created_at = parse_time(row.get("created_at"))
        .ok_or_else(|| CoupleError::StorageError("invalid created_at".into()))?;

    Ok(CoupleRecord {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        member_one_id: row.get::<i64, _>("member_one_id") as u64,
        member_two_id: row.get::<i64, _>("member_two_id") as u64,
        initiator_id: row.get::<i64, _>("initiator_id") as u64,
        pending_target_id: row.get::<i64, _>("pending_target_id") as u64,
        status,
        proposal_message: row.get("proposal_message"),
        anniversary: parse_date(row.get("anniversary")),
        love_points: row.get("love_points"),
        last_affection_one: parse_time(row.get("last_affection_one")),
        last_affection_two: parse_time(row.get("last_affection_two")),
        created_at,
        updated_at: parse_time(row.get("updated_at")).unwrap_or(created_at),
        ended_at: parse_time(row.get("ended_at")),
        ended_by: opt_id(row.get("ended_by")),
    })
}

fn row_to_memory(row: &SqliteRow) -> CoupleMemory {
    CoupleMemory {
        id: row.get("id"),
        couple_id: row.get("couple_id"),
        title: row.get("title"),
        description: row.get("description"),
        created_by: row.get::<i64, _>("created_by") as u64,
        created_at: parse_time(row.get("created_at")).unwrap_or_default(),
    }
}

fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl CoupleStore for SqliteCoupleStore {
    async fn get(&self, couple_id: i64) -> Result<Option<CoupleRecord>, CoupleError> {
        let row = sqlx::query("SELECT * FROM couples WHERE id = ?")
            .bind(couple_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.as_ref().map(row_to_couple).transpose()
    }

    async fn find_relationship(
        &self,
        guild_id: u64,
        user_id: u64,
        statuses: &[CoupleStatus],
    ) -> Result<Option<CoupleRecord>, CoupleError> {
        if statuses.is_empty() {
            return Ok(None);
        }
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT * FROM couples WHERE guild_id = ? AND (member_one_id = ? OR member_two_id = ?) \
             AND status IN ({}) ORDER BY id DESC LIMIT 1",
            placeholders
        );

        let mut query = sqlx::query(&sql)
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .bind(user_id as i64);
        for status in statuses {
            query = query.bind(status.as_str());
        }

        let row = query.fetch_optional(&self.pool).await.map_err(storage)?;
        row.as_ref().map(row_to_couple).transpose()
    }

    async fn get_pending_for_target(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CoupleRecord>, CoupleError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM couples
            WHERE guild_id = ? AND pending_target_id = ? AND status = 'pending'
            ORDER BY id DESC LIMIT 1
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.as_ref().map(row_to_couple).transpose()
    }

    async fn create_proposal(&self, proposal: &NewProposal) -> Result<CoupleRecord, CoupleError> {
        let (one, two) = sorted_pair(proposal.initiator_id, proposal.target_id);
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let taken: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) FROM couples
            WHERE guild_id = ? AND status IN ('pending', 'active')
              AND (member_one_id IN (?, ?) OR member_two_id IN (?, ?))
            "#,
        )
        .bind(proposal.guild_id as i64)
        .bind(one as i64)
        .bind(two as i64)
        .bind(one as i64)
        .bind(two as i64)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?
        .get(0);

        if taken > 0 {
            return Err(CoupleError::AlreadyCommitted);
        }

        let created = to_text(proposal.created_at);
        let result = sqlx::query(
            r#"
            INSERT INTO couples (
                guild_id, member_one_id, member_two_id, initiator_id, pending_target_id,
                status, proposal_message, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, 'pending', ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(proposal.guild_id as i64)
        .bind(one as i64)
        .bind(two as i64)
        .bind(proposal.initiator_id as i64)
        .bind(proposal.target_id as i64)
        .bind(&proposal.message)
        .bind(&created)
        .bind(&created)
        .fetch_one(&mut *tx)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(CoupleError::AlreadyCommitted)
            }
            Err(e) => return Err(storage(e)),
        };
        let record = row_to_couple(&row)?;
        tx.commit().await.map_err(storage)?;

        tracing::info!(
            "Couple proposal {} created in guild {} ({} -> {})",
            record.id,
            record.guild_id,
            proposal.initiator_id,
            proposal.target_id
        );
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
        let now_text = to_text(now);
        let row = sqlx::query(
            r#"
            UPDATE couples SET
                status = ?,
                anniversary = COALESCE(?, anniversary),
                ended_by = COALESCE(?, ended_by),
                ended_at = CASE WHEN ? IS NULL THEN ended_at ELSE ? END,
                updated_at = ?
            WHERE id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(to.as_str())
        .bind(anniversary.map(date_text))
        .bind(ended_by.map(|id| id as i64))
        .bind(ended_by.map(|id| id as i64))
        .bind(&now_text)
        .bind(&now_text)
        .bind(couple_id)
        .bind(from.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.as_ref().map(row_to_couple).transpose()
    }

    async fn update_anniversary(
        &self,
        couple_id: i64,
        anniversary: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<CoupleRecord>, CoupleError> {
        let row = sqlx::query(
            r#"
            UPDATE couples SET anniversary = ?, updated_at = ?
            WHERE id = ? AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(date_text(anniversary))
        .bind(to_text(now))
        .bind(couple_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.as_ref().map(row_to_couple).transpose()
    }

    async fn add_love_points(
        &self,
        couple_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<CoupleRecord>, CoupleError> {
        let row = sqlx::query(
            r#"
            UPDATE couples SET love_points = love_points + ?, updated_at = ?
            WHERE id = ? AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(amount)
        .bind(to_text(now))
        .bind(couple_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.as_ref().map(row_to_couple).transpose()
    }

    async fn set_last_affection(
        &self,
        couple_id: i64,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<(), CoupleError> {
        let at = to_text(at);
        sqlx::query(
            r#"
            UPDATE couples SET
                last_affection_one = CASE WHEN member_one_id = ? THEN ? ELSE last_affection_one END,
                last_affection_two = CASE WHEN member_two_id = ? THEN ? ELSE last_affection_two END
            WHERE id = ?
            "#,
        )
        .bind(user_id as i64)
        .bind(&at)
        .bind(user_id as i64)
        .bind(&at)
        .bind(couple_id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<CoupleRecord>, CoupleError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM couples
            WHERE guild_id = ? AND status = 'active'
            ORDER BY love_points DESC, created_at ASC
            LIMIT ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.iter().map(row_to_couple).collect()
    }

    async fn get_profile(&self, couple_id: i64) -> Result<Option<CoupleProfile>, CoupleError> {
        let row = sqlx::query("SELECT * FROM couple_profiles WHERE couple_id = ?")
            .bind(couple_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(|row| CoupleProfile {
            couple_id: row.get("couple_id"),
            title: row.get("title"),
            theme_color: row.get("theme_color"),
            love_song: row.get("love_song"),
            bio: row.get("bio"),
            current_mood: row.get("current_mood"),
            checkin_streak: row.get::<i64, _>("checkin_streak") as u32,
            last_checkin_date: parse_date(row.get("last_checkin_date")),
        }))
    }

    async fn save_profile(&self, profile: &CoupleProfile) -> Result<(), CoupleError> {
        sqlx::query(
            r#"
            INSERT INTO couple_profiles (
                couple_id, title, theme_color, love_song, bio, current_mood,
                checkin_streak, last_checkin_date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(couple_id) DO UPDATE SET
                title = excluded.title,
                theme_color = excluded.theme_color,
                love_song = excluded.love_song,
                bio = excluded.bio,
                current_mood = excluded.current_mood,
                checkin_streak = excluded.checkin_streak,
                last_checkin_date = excluded.last_checkin_date
            "#,
        )
        .bind(profile.couple_id)
        .bind(&profile.title)
        .bind(&profile.theme_color)
        .bind(&profile.love_song)
        .bind(&profile.bio)
        .bind(&profile.current_mood)
        .bind(profile.checkin_streak as i64)
        .bind(profile.last_checkin_date.map(date_text))
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn record_checkin(
        &self,
        couple_id: i64,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<bool, CoupleError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO couple_checkins (couple_id, user_id, checkin_date) VALUES (?, ?, ?)",
        )
        .bind(couple_id)
        .bind(user_id as i64)
        .bind(date_text(date))
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_memory(
        &self,
        couple_id: i64,
        title: &str,
        description: Option<&str>,
        created_by: u64,
        now: DateTime<Utc>,
    ) -> Result<CoupleMemory, CoupleError> {
        let row = sqlx::query(
            r#"
            INSERT INTO couple_memories (couple_id, title, description, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(couple_id)
        .bind(title)
        .bind(description)
        .bind(created_by as i64)
        .bind(to_text(now))
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row_to_memory(&row))
    }

    async fn list_memories(
        &self,
        couple_id: i64,
        limit: usize,
    ) -> Result<Vec<CoupleMemory>, CoupleError> {
        let rows = sqlx::query(
            "SELECT * FROM couple_memories WHERE couple_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(couple_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows.iter().map(row_to_memory).collect())
    }

    async fn delete_memory(&self, couple_id: i64, memory_id: i64) -> Result<bool, CoupleError> {
        let result = sqlx::query("DELETE FROM couple_memories WHERE couple_id = ? AND id = ?")
            .bind(couple_id)
            .bind(memory_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_memories(&self, couple_id: i64) -> Result<i64, CoupleError> {
        let row = sqlx::query("SELECT COUNT(*) FROM couple_memories WHERE couple_id = ?")
            .bind(couple_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.get::<i64, _>(0))
    }

    async fn latest_memory(&self, couple_id: i64) -> Result<Option<CoupleMemory>, CoupleError> {
        let row = sqlx::query(
            "SELECT * FROM couple_memories WHERE couple_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(couple_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row.as_ref().map(row_to_memory))
    }

    async fn list_milestones(&self, couple_id: i64) -> Result<Vec<CoupleMilestone>, CoupleError> {
        let rows = sqlx::query(
            "SELECT * FROM couple_milestones WHERE couple_id = ? ORDER BY achieved_at ASC",
        )
        .bind(couple_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .iter()
            .map(|row| CoupleMilestone {
                couple_id: row.get("couple_id"),
                milestone_key: row.get("milestone_key"),
                achieved_at: parse_time(row.get("achieved_at")).unwrap_or_default(),
            })
            .collect())
    }

    async fn record_milestone(
        &self,
        couple_id: i64,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, CoupleError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO couple_milestones (couple_id, milestone_key, achieved_at) VALUES (?, ?, ?)",
        )
        .bind(couple_id)
        .bind(key)
        .bind(to_text(now))
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::couples::CoupleService;
    use crate::infra::database::memory_pool;
    use chrono::Duration;

    async fn store() -> SqliteCoupleStore {
        let store = SqliteCoupleStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    fn proposal(initiator: u64, target: u64, at: DateTime<Utc>) -> NewProposal {
        NewProposal {
            guild_id: 1,
            initiator_id: initiator,
            target_id: target,
            message: Some("jadian yuk".into()),
            created_at: at,
        }
    }

    #[tokio::test]
    async fn open_records_block_new_proposals() {
        let store = store().await;
        let now = Utc::now();

        let record = store.create_proposal(&proposal(20, 10, now)).await.unwrap();
        assert_eq!((record.member_one_id, record.member_two_id), (10, 20));
        assert_eq!(record.pending_target_id, 10);
        assert_eq!(record.status, CoupleStatus::Pending);

        // Either member, on either side of the sorted pair.
        assert!(matches!(
            store.create_proposal(&proposal(30, 20, now)).await,
            Err(CoupleError::AlreadyCommitted)
        ));
        assert!(matches!(
            store.create_proposal(&proposal(10, 5, now)).await,
            Err(CoupleError::AlreadyCommitted)
        ));

        // Another guild is independent.
        let mut elsewhere = proposal(10, 20, now);
        elsewhere.guild_id = 2;
        store.create_proposal(&elsewhere).await.unwrap();

        store
            .transition(record.id, CoupleStatus::Pending, CoupleStatus::Rejected, None, None, now)
            .await
            .unwrap()
            .unwrap();
        store.create_proposal(&proposal(10, 30, now)).await.unwrap();
    }

    #[tokio::test]
    async fn transitions_only_apply_from_the_expected_status() {
        let store = store().await;
        let now = Utc::now();
        let record = store.create_proposal(&proposal(10, 20, now)).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();

        let active = store
            .transition(record.id, CoupleStatus::Pending, CoupleStatus::Active, Some(day), None, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.anniversary, Some(day));
        assert!(store
            .transition(record.id, CoupleStatus::Pending, CoupleStatus::Rejected, None, None, now)
            .await
            .unwrap()
            .is_none());

        let later = now + Duration::days(3);
        let ended = store
            .transition(record.id, CoupleStatus::Active, CoupleStatus::Ended, None, Some(20), later)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ended.ended_by, Some(20));
        assert_eq!(ended.ended_at.map(|t| t.timestamp()), Some(later.timestamp()));
        assert_eq!(ended.anniversary, Some(day));

        let found = store
            .find_relationship(1, 20, &[CoupleStatus::Ended])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, record.id);
        assert!(store
            .find_relationship(1, 20, &[CoupleStatus::Pending, CoupleStatus::Active])
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn points_affection_and_leaderboard() {
        let store = store().await;
        let now = Utc::now();
        let a = store.create_proposal(&proposal(1, 2, now)).await.unwrap();
        let b = store
            .create_proposal(&proposal(3, 4, now + Duration::seconds(1)))
            .await
            .unwrap();
        let c = store.create_proposal(&proposal(5, 6, now)).await.unwrap();
        for id in [a.id, b.id] {
            store
                .transition(id, CoupleStatus::Pending, CoupleStatus::Active, None, None, now)
                .await
                .unwrap();
        }

        // Pending couples gain nothing.
        assert!(store.add_love_points(c.id, 10, now).await.unwrap().is_none());
        store.add_love_points(a.id, 15, now).await.unwrap();
        store.add_love_points(b.id, 15, now).await.unwrap();
        let b = store.add_love_points(b.id, 5, now).await.unwrap().unwrap();
        assert_eq!(b.love_points, 20);

        let board = store.leaderboard(1, 10).await.unwrap();
        assert_eq!(board.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        store.set_last_affection(a.id, 2, now).await.unwrap();
        let a = store.get(a.id).await.unwrap().unwrap();
        assert!(a.last_affection_one.is_none());
        assert_eq!(a.last_affection_for(2).map(|t| t.timestamp()), Some(now.timestamp()));
    }

    #[tokio::test]
    async fn profile_checkins_memories_and_milestones() {
        let store = store().await;
        let now = Utc::now();
        let id = store.create_proposal(&proposal(1, 2, now)).await.unwrap().id;
        let today = now.date_naive();

        assert!(store.get_profile(id).await.unwrap().is_none());
        let mut profile = CoupleProfile::empty(id);
        profile.title = Some("Duo Kopi".into());
        profile.checkin_streak = 3;
        profile.last_checkin_date = Some(today);
        store.save_profile(&profile).await.unwrap();
        profile.current_mood = Some("bahagia".into());
        store.save_profile(&profile).await.unwrap();
        assert_eq!(store.get_profile(id).await.unwrap(), Some(profile));

        assert!(store.record_checkin(id, 1, today).await.unwrap());
        assert!(!store.record_checkin(id, 1, today).await.unwrap());
        assert!(store.record_checkin(id, 2, today).await.unwrap());

        store.add_memory(id, "Kencan pertama", None, 1, now).await.unwrap();
        let second = store
            .add_memory(id, "Liburan", Some("Ke Bromo"), 2, now)
            .await
            .unwrap();
        assert_eq!(store.count_memories(id).await.unwrap(), 2);
        assert_eq!(store.latest_memory(id).await.unwrap().unwrap().id, second.id);
        let listed = store.list_memories(id, 1).await.unwrap();
        assert_eq!(listed[0].description.as_deref(), Some("Ke Bromo"));
        assert!(store.delete_memory(id, second.id).await.unwrap());
        assert!(!store.delete_memory(id + 1, second.id).await.unwrap());

        assert!(store.record_milestone(id, "first_memory", now).await.unwrap());
        assert!(!store.record_milestone(id, "first_memory", now).await.unwrap());
        assert_eq!(store.list_milestones(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn service_flow_over_sqlite() {
        let service = CoupleService::new(store().await);
        let now = Utc::now();
        service.propose(1, 10, 20, false, None, now).await.unwrap();
        let active = service.respond(1, 20, true, now).await.unwrap();
        assert_eq!(active.status, CoupleStatus::Active);
        assert_eq!(service.active_for(1, 10).await.unwrap().id, active.id);
    }
}
