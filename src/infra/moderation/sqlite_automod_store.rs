use crate::core::moderation::{AutomodRule, AutomodStore, ModerationError, RuleType};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAutomodStore {
    pool: Pool<Sqlite>,
}

impl SqliteAutomodStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_rules (
                guild_id INTEGER NOT NULL,
                rule_type TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT '{}',
                is_active BOOLEAN NOT NULL DEFAULT 1,
                PRIMARY KEY (guild_id, rule_type)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn storage(e: impl ToString) -> ModerationError {
    ModerationError::StorageError(e.to_string())
}

fn row_to_rule(row: &SqliteRow) -> Result<AutomodRule, ModerationError> {
    let rule_type: String = row.get("rule_type");
    let payload: String = row.get("payload");
    Ok(AutomodRule {
        guild_id: row.get::<i64, _>("guild_id") as u64,
        rule_type: RuleType::parse(&rule_type)?,
        payload: serde_json::from_str(&payload).unwrap_or_default(),
        is_active: row.get("is_active"),
    })
}

#[async_trait]
impl AutomodStore for SqliteAutomodStore {
    async fn upsert_rule(&self, rule: &AutomodRule) -> Result<(), ModerationError> {
        let payload = serde_json::to_string(&rule.payload).map_err(storage)?;
        sqlx::query(
            r#"
            INSERT INTO automod_rules (guild_id, rule_type, payload, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(guild_id, rule_type) DO UPDATE SET
                payload = excluded.payload,
                is_active = excluded.is_active
            "#,
        )
        .bind(rule.guild_id as i64)
        .bind(rule.rule_type.as_str())
        .bind(payload)
        .bind(rule.is_active)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn get_rule(
        &self,
        guild_id: u64,
        rule_type: RuleType,
    ) -> Result<Option<AutomodRule>, ModerationError> {
        let row = sqlx::query("SELECT * FROM automod_rules WHERE guild_id = ? AND rule_type = ?")
            .bind(guild_id as i64)
            .bind(rule_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.as_ref().map(row_to_rule).transpose()
    }

    async fn set_active(
        &self,
        guild_id: u64,
        rule_type: RuleType,
        active: bool,
    ) -> Result<bool, ModerationError> {
        let result =
            sqlx::query("UPDATE automod_rules SET is_active = ? WHERE guild_id = ? AND rule_type = ?")
                .bind(active)
                .bind(guild_id as i64)
                .bind(rule_type.as_str())
                .execute(&self.pool)
                .await
                .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_rules(&self, guild_id: u64) -> Result<Vec<AutomodRule>, ModerationError> {
        let rows = sqlx::query("SELECT * FROM automod_rules WHERE guild_id = ? ORDER BY rule_type")
            .bind(guild_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.iter().map(row_to_rule).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::memory_pool;
    use serde_json::json;

    #[tokio::test]
    async fn rules_upsert_and_toggle() {
        let store = SqliteAutomodStore::new(memory_pool().await);
        store.migrate().await.unwrap();

        let rule = AutomodRule {
            guild_id: 1,
            rule_type: RuleType::LinkFilter,
            payload: json!({"allow_domains": ["forus.id"]}),
            is_active: true,
        };
        store.upsert_rule(&rule).await.unwrap();
        store
            .upsert_rule(&AutomodRule {
                payload: json!({"allow_domains": ["example.org"]}),
                ..rule.clone()
            })
            .await
            .unwrap();

        let saved = store.get_rule(1, RuleType::LinkFilter).await.unwrap().unwrap();
        assert_eq!(saved.payload, json!({"allow_domains": ["example.org"]}));

        assert!(store.set_active(1, RuleType::LinkFilter, false).await.unwrap());
        assert!(!store.set_active(1, RuleType::Caps, false).await.unwrap());

        let rules = store.list_rules(1).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert!(!rules[0].is_active);
    }
}
