// SQLite implementation of the CoinStore trait

use crate::core::economy::{CoinStore, CooldownKind, EconomyAccount, EconomyError};
use crate::infra::database::{parse_time, to_text};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

pub struct SqliteCoinStore {
    pool: SqlitePool,
}

impl SqliteCoinStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run database migrations to create tables.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS economy (
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                balance INTEGER NOT NULL DEFAULT 0,
                last_daily TEXT,
                last_work TEXT,
                PRIMARY KEY (guild_id, user_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_economy_guild_balance
            ON economy(guild_id, balance DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ensure_account<'e, E>(executor: E, guild_id: u64, user_id: u64) -> Result<(), EconomyError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query("INSERT OR IGNORE INTO economy (guild_id, user_id, balance) VALUES (?, ?, 0)")
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .execute(executor)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

fn store_err(e: sqlx::Error) -> EconomyError {
    EconomyError::StoreError(e.to_string())
}

fn row_to_account(row: &SqliteRow) -> EconomyAccount {
    EconomyAccount {
        guild_id: row.get::<i64, _>("guild_id") as u64,
        user_id: row.get::<i64, _>("user_id") as u64,
        balance: row.get::<i64, _>("balance"),
        last_daily: parse_time(row.get("last_daily")),
        last_work: parse_time(row.get("last_work")),
    }
}

#[async_trait]
impl CoinStore for SqliteCoinStore {
    async fn get_account(&self, guild_id: u64, user_id: u64) -> Result<EconomyAccount, EconomyError> {
        Self::ensure_account(&self.pool, guild_id, user_id).await?;
        let row = sqlx::query("SELECT * FROM economy WHERE guild_id = ? AND user_id = ?")
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row_to_account(&row))
    }

    async fn adjust_balance(&self, guild_id: u64, user_id: u64, delta: i64) -> Result<i64, EconomyError> {
        let row = sqlx::query(
            r#"
            INSERT INTO economy (guild_id, user_id, balance)
            VALUES (?, ?, MAX(?, 0))
            ON CONFLICT(guild_id, user_id) DO UPDATE SET
                balance = MAX(balance + ?, 0)
            RETURNING balance
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(delta)
        .bind(delta)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.get::<i64, _>("balance"))
    }

    async fn try_debit(&self, guild_id: u64, user_id: u64, amount: i64) -> Result<Option<i64>, EconomyError> {
        Self::ensure_account(&self.pool, guild_id, user_id).await?;
        let row = sqlx::query(
            r#"
            UPDATE economy SET balance = balance - ?
            WHERE guild_id = ? AND user_id = ? AND balance >= ?
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.map(|r| r.get::<i64, _>("balance")))
    }

    async fn try_start_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: CooldownKind,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Option<DateTime<Utc>>, EconomyError> {
        let column = match kind {
            CooldownKind::Daily => "last_daily",
            CooldownKind::Work => "last_work",
        };

        let mut tx = self.pool.begin().await.map_err(store_err)?;
        Self::ensure_account(&mut *tx, guild_id, user_id).await?;

        let last: Option<String> = sqlx::query(&format!(
            "SELECT {} FROM economy WHERE guild_id = ? AND user_id = ?",
            column
        ))
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?
        .get(0);

        if let Some(last) = parse_time(last) {
            if now - last < cooldown {
                return Ok(Some(last));
            }
        }

        sqlx::query(&format!(
            "UPDATE economy SET {} = ? WHERE guild_id = ? AND user_id = ?",
            column
        ))
        .bind(to_text(now))
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(None)
    }

    async fn transfer(
        &self,
        guild_id: u64,
        from_user: u64,
        to_user: u64,
        amount: i64,
    ) -> Result<Option<(i64, i64)>, EconomyError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        Self::ensure_account(&mut *tx, guild_id, from_user).await?;
        Self::ensure_account(&mut *tx, guild_id, to_user).await?;

        let sender = sqlx::query(
            r#"
            UPDATE economy SET balance = balance - ?
            WHERE guild_id = ? AND user_id = ? AND balance >= ?
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(guild_id as i64)
        .bind(from_user as i64)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let Some(sender) = sender else {
            return Ok(None);
        };

        let receiver = sqlx::query(
            "UPDATE economy SET balance = balance + ? WHERE guild_id = ? AND user_id = ? RETURNING balance",
        )
        .bind(amount)
        .bind(guild_id as i64)
        .bind(to_user as i64)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(Some((
            sender.get::<i64, _>("balance"),
            receiver.get::<i64, _>("balance"),
        )))
    }

    async fn leaderboard(&self, guild_id: u64, limit: usize) -> Result<Vec<EconomyAccount>, EconomyError> {
        let rows = sqlx::query(
            "SELECT * FROM economy WHERE guild_id = ? ORDER BY balance DESC, user_id ASC LIMIT ?",
        )
        .bind(guild_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.iter().map(row_to_account).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::economy::EconomyService;
    use crate::infra::database::memory_pool;

    async fn store() -> SqliteCoinStore {
        let store = SqliteCoinStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn balance_clamps_and_debits_guard() {
        let store = store().await;
        assert_eq!(store.get_account(1, 2).await.unwrap().balance, 0);
        assert_eq!(store.adjust_balance(1, 2, 300).await.unwrap(), 300);
        assert_eq!(store.adjust_balance(1, 2, -500).await.unwrap(), 0);
        assert_eq!(store.adjust_balance(1, 3, -5).await.unwrap(), 0);

        store.adjust_balance(1, 2, 100).await.unwrap();
        assert_eq!(store.try_debit(1, 2, 150).await.unwrap(), None);
        assert_eq!(store.try_debit(1, 2, 60).await.unwrap(), Some(40));
    }

    #[tokio::test]
    async fn cooldown_stamps_once_per_window() {
        let store = store().await;
        let now = Utc::now();
        let hour = Duration::hours(1);
        assert_eq!(
            store.try_start_cooldown(1, 2, CooldownKind::Work, now, hour).await.unwrap(),
            None
        );
        let blocked = store
            .try_start_cooldown(1, 2, CooldownKind::Work, now + Duration::minutes(10), hour)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(blocked.timestamp(), now.timestamp());
        // Daily is tracked separately.
        assert_eq!(
            store.try_start_cooldown(1, 2, CooldownKind::Daily, now, hour).await.unwrap(),
            None
        );
        assert_eq!(
            store
                .try_start_cooldown(1, 2, CooldownKind::Work, now + hour, hour)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn transfer_is_all_or_nothing() {
        let store = store().await;
        store.adjust_balance(1, 2, 100).await.unwrap();
        assert_eq!(store.transfer(1, 2, 3, 150).await.unwrap(), None);
        assert_eq!(store.transfer(1, 2, 3, 40).await.unwrap(), Some((60, 40)));

        let board = store.leaderboard(1, 10).await.unwrap();
        assert_eq!(board[0].user_id, 2);
        assert_eq!(board[1].balance, 40);
    }

    #[tokio::test]
    async fn service_daily_claim_persists() {
        let service = EconomyService::new(store().await);
        let now = Utc::now();
        let claim = service.claim_daily(1, 2, now).await.unwrap();
        assert_eq!(service.balance(1, 2).await.unwrap(), claim.new_balance);
        assert!(service.claim_daily(1, 2, now).await.is_err());
    }
}
