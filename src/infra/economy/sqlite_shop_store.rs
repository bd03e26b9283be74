// SQLite implementation of the ShopStore trait

use crate::core::economy::{EconomyError, NewShopItem, ShopItem, ShopStore};
use crate::infra::database::opt_id;
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

pub struct SqliteShopStore {
    pool: SqlitePool,
}

impl SqliteShopStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shop_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                item_name TEXT NOT NULL COLLATE NOCASE,
                price INTEGER NOT NULL,
                description TEXT,
                role_reward_id INTEGER,
                UNIQUE (guild_id, item_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn store_err(e: sqlx::Error) -> EconomyError {
    EconomyError::StoreError(e.to_string())
}

fn row_to_item(row: &SqliteRow) -> ShopItem {
    ShopItem {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        item_name: row.get("item_name"),
        price: row.get("price"),
        description: row.get("description"),
        role_reward_id: opt_id(row.get("role_reward_id")),
    }
}

#[async_trait]
impl ShopStore for SqliteShopStore {
    async fn list_items(&self, guild_id: u64) -> Result<Vec<ShopItem>, EconomyError> {
        let rows = sqlx::query("SELECT * FROM shop_items WHERE guild_id = ? ORDER BY price ASC, id ASC")
            .bind(guild_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(row_to_item).collect())
    }

    async fn add_item(&self, item: NewShopItem) -> Result<ShopItem, EconomyError> {
        let result = sqlx::query(
            r#"
            INSERT INTO shop_items (guild_id, item_name, price, description, role_reward_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(item.guild_id as i64)
        .bind(&item.item_name)
        .bind(item.price)
        .bind(&item.description)
        .bind(item.role_reward_id.map(|id| id as i64))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row_to_item(&row)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(EconomyError::DuplicateItem(item.item_name))
            }
            Err(e) => Err(store_err(e)),
        }
    }

    async fn get_item(&self, guild_id: u64, name: &str) -> Result<Option<ShopItem>, EconomyError> {
        let row = sqlx::query("SELECT * FROM shop_items WHERE guild_id = ? AND item_name = ?")
            .bind(guild_id as i64)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.as_ref().map(row_to_item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::memory_pool;

    fn item(name: &str, price: i64) -> NewShopItem {
        NewShopItem {
            guild_id: 1,
            item_name: name.into(),
            price,
            description: Some("Role khusus".into()),
            role_reward_id: Some(77),
        }
    }

    #[tokio::test]
    async fn items_are_unique_per_guild_ignoring_case() {
        let store = SqliteShopStore::new(memory_pool().await);
        store.migrate().await.unwrap();

        store.add_item(item("VIP", 500)).await.unwrap();
        store.add_item(item("Badge", 100)).await.unwrap();
        let dup = store.add_item(item("vip", 10)).await.unwrap_err();
        assert_eq!(dup, EconomyError::DuplicateItem("vip".into()));

        let listed = store.list_items(1).await.unwrap();
        assert_eq!(listed.iter().map(|i| i.price).collect::<Vec<_>>(), vec![100, 500]);

        let found = store.get_item(1, "vIp").await.unwrap().unwrap();
        assert_eq!(found.item_name, "VIP");
        assert_eq!(found.role_reward_id, Some(77));
        assert!(store.get_item(2, "VIP").await.unwrap().is_none());
    }
}
