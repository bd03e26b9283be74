use crate::core::leveling::{LevelProfile, LevelReward, LevelStore, LevelingError};
use crate::infra::database::{parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteLevelStore {
    pool: Pool<Sqlite>,
}

impl SqliteLevelStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS levels (
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                xp INTEGER NOT NULL DEFAULT 0,
                level INTEGER NOT NULL DEFAULT 0,
                last_message_at TEXT,
                PRIMARY KEY (guild_id, user_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS level_rewards (
                guild_id INTEGER NOT NULL,
                level INTEGER NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (guild_id, level)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_levels_guild_xp ON levels(guild_id, xp DESC)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> LevelingError {
    LevelingError::StorageError(e.to_string())
}

fn row_to_profile(row: &SqliteRow) -> LevelProfile {
    LevelProfile {
        guild_id: row.get::<i64, _>("guild_id") as u64,
        user_id: row.get::<i64, _>("user_id") as u64,
        xp: row.get::<i64, _>("xp") as u64,
        level: row.get::<i64, _>("level") as u32,
        last_message_at: parse_time(row.get("last_message_at")),
    }
}

#[async_trait]
impl LevelStore for SqliteLevelStore {
    async fn get_profile(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<LevelProfile>, LevelingError> {
        let row = sqlx::query("SELECT * FROM levels WHERE guild_id = ? AND user_id = ?")
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn add_xp(&self, guild_id: u64, user_id: u64, amount: u64) -> Result<u64, LevelingError> {
        let row = sqlx::query(
            r#"
            INSERT INTO levels (guild_id, user_id, xp)
            VALUES (?, ?, ?)
            ON CONFLICT(guild_id, user_id) DO UPDATE SET
                xp = xp + excluded.xp
            RETURNING xp
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(amount as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row.get::<i64, _>("xp") as u64)
    }

    async fn set_level(&self, guild_id: u64, user_id: u64, level: u32) -> Result<(), LevelingError> {
        sqlx::query("UPDATE levels SET level = ? WHERE guild_id = ? AND user_id = ?")
            .bind(level as i64)
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn set_last_message_at(
        &self,
        guild_id: u64,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<(), LevelingError> {
        sqlx::query("UPDATE levels SET last_message_at = ? WHERE guild_id = ? AND user_id = ?")
            .bind(to_text(at))
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<LevelProfile>, LevelingError> {
        let rows = sqlx::query(
            "SELECT * FROM levels WHERE guild_id = ? ORDER BY xp DESC, user_id ASC LIMIT ?",
        )
        .bind(guild_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn profiles_with_min_level(
        &self,
        guild_id: u64,
        level: u32,
    ) -> Result<Vec<LevelProfile>, LevelingError> {
        let rows = sqlx::query("SELECT * FROM levels WHERE guild_id = ? AND level >= ?")
            .bind(guild_id as i64)
            .bind(level as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn set_reward(&self, reward: LevelReward) -> Result<(), LevelingError> {
        sqlx::query(
            r#"
            INSERT INTO level_rewards (guild_id, level, role_id)
            VALUES (?, ?, ?)
            ON CONFLICT(guild_id, level) DO UPDATE SET role_id = excluded.role_id
            "#,
        )
        .bind(reward.guild_id as i64)
        .bind(reward.level as i64)
        .bind(reward.role_id as i64)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn remove_reward(&self, guild_id: u64, level: u32) -> Result<bool, LevelingError> {
        let result = sqlx::query("DELETE FROM level_rewards WHERE guild_id = ? AND level = ?")
            .bind(guild_id as i64)
            .bind(level as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_rewards(&self, guild_id: u64) -> Result<Vec<LevelReward>, LevelingError> {
        let rows = sqlx::query("SELECT * FROM level_rewards WHERE guild_id = ? ORDER BY level ASC")
            .bind(guild_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows
            .iter()
            .map(|row| LevelReward {
                guild_id: row.get::<i64, _>("guild_id") as u64,
                level: row.get::<i64, _>("level") as u32,
                role_id: row.get::<i64, _>("role_id") as u64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::leveling::{LevelingService, level_from_xp};
    use crate::infra::database::memory_pool;

    async fn store() -> SqliteLevelStore {
        let store = SqliteLevelStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn xp_accumulates_and_levels_persist() {
        let service = LevelingService::new(store().await);
        let first = service.add_xp(1, 2, 50).await.unwrap();
        assert_eq!(first.profile.xp, 50);
        assert!(!first.leveled_up);

        let second = service.add_xp(1, 2, 500).await.unwrap();
        assert_eq!(second.profile.xp, 550);
        assert_eq!(second.profile.level, level_from_xp(550).level);
        assert!(second.leveled_up);
    }

    #[tokio::test]
    async fn cooldown_survives_in_the_table() {
        let service = LevelingService::new(store().await);
        let now = Utc::now();
        service.process_message(1, 2, now).await.unwrap();
        let again = service.process_message(1, 2, now).await;
        assert!(matches!(again, Err(LevelingError::OnCooldown(_))));
    }

    #[tokio::test]
    async fn leaderboard_and_rewards() {
        let store = store().await;
        store.add_xp(1, 10, 30).await.unwrap();
        store.add_xp(1, 11, 90).await.unwrap();
        store.add_xp(2, 12, 500).await.unwrap();

        let board = store.leaderboard(1, 10).await.unwrap();
        assert_eq!(board.iter().map(|p| p.user_id).collect::<Vec<_>>(), vec![11, 10]);

        store
            .set_reward(LevelReward { guild_id: 1, level: 10, role_id: 100 })
            .await
            .unwrap();
        store
            .set_reward(LevelReward { guild_id: 1, level: 5, role_id: 50 })
            .await
            .unwrap();
        store
            .set_reward(LevelReward { guild_id: 1, level: 5, role_id: 55 })
            .await
            .unwrap();
        let rewards = store.list_rewards(1).await.unwrap();
        assert_eq!(rewards.len(), 2);
        assert_eq!(rewards[0].role_id, 55);
        assert!(store.remove_reward(1, 5).await.unwrap());
        assert!(!store.remove_reward(1, 5).await.unwrap());
    }
}
