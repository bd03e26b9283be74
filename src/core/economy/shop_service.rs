// Guild shop: items priced in coins, optionally granting a role on purchase.

use super::{CoinStore, EconomyError, EconomyService};
use async_trait::async_trait;

pub const MAX_ITEM_PRICE: i64 = 1_000_000;

/// An item listed in a guild's shop.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopItem {
    pub id: i64,
    pub guild_id: u64,
    pub item_name: String,
    pub price: i64,
    pub description: Option<String>,
    pub role_reward_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NewShopItem {
    pub guild_id: u64,
    pub item_name: String,
    pub price: i64,
    pub description: Option<String>,
    pub role_reward_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Purchase {
    pub item: ShopItem,
    pub new_balance: i64,
}

#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Items ordered by price, cheapest first.
    async fn list_items(&self, guild_id: u64) -> Result<Vec<ShopItem>, EconomyError>;

    /// Insert an item. Fails with `DuplicateItem` when the name is taken.
    async fn add_item(&self, item: NewShopItem) -> Result<ShopItem, EconomyError>;

    /// Case-insensitive lookup by name.
    async fn get_item(&self, guild_id: u64, name: &str)
        -> Result<Option<ShopItem>, EconomyError>;
}

pub struct ShopService<S: ShopStore> {
    store: S,
}

impl<S: ShopStore> ShopService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list_items(&self, guild_id: u64) -> Result<Vec<ShopItem>, EconomyError> {
        self.store.list_items(guild_id).await
    }

    pub async fn add_item(&self, mut item: NewShopItem) -> Result<ShopItem, EconomyError> {
        if !(0..=MAX_ITEM_PRICE).contains(&item.price) {
            return Err(EconomyError::InvalidAmount {
                min: 0,
                max: MAX_ITEM_PRICE,
            });
        }
        item.item_name = item.item_name.trim().to_string();
        if item.item_name.is_empty() {
            return Err(EconomyError::ItemNotFound(String::new()));
        }
        if self
            .store
            .get_item(item.guild_id, &item.item_name)
            .await?
            .is_some()
        {
            return Err(EconomyError::DuplicateItem(item.item_name));
        }
        self.store.add_item(item).await
    }

    pub async fn get_item(
        &self,
        guild_id: u64,
        name: &str,
    ) -> Result<Option<ShopItem>, EconomyError> {
        self.store.get_item(guild_id, name.trim()).await
    }

    /// Buy an item with the member's coins. Granting the role is left to the caller.
    pub async fn buy<C: CoinStore>(
        &self,
        economy: &EconomyService<C>,
        guild_id: u64,
        user_id: u64,
        name: &str,
    ) -> Result<Purchase, EconomyError> {
        let item = self
            .get_item(guild_id, name)
            .await?
            .ok_or_else(|| EconomyError::ItemNotFound(name.trim().to_string()))?;

        let new_balance = economy.spend(guild_id, user_id, item.price).await?;
        tracing::info!(
            guild_id,
            user_id,
            item = %item.item_name,
            price = item.price,
            "Shop purchase"
        );

        Ok(Purchase { item, new_balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::economy::economy_service::tests::InMemoryCoinStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryShopStore {
        items: Mutex<Vec<ShopItem>>,
    }

    #[async_trait]
    impl ShopStore for InMemoryShopStore {
        async fn list_items(&self, guild_id: u64) -> Result<Vec<ShopItem>, EconomyError> {
            let mut items: Vec<ShopItem> = self
                .items
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.guild_id == guild_id)
                .cloned()
                .collect();
            items.sort_by_key(|i| i.price);
            Ok(items)
        }

        async fn add_item(&self, item: NewShopItem) -> Result<ShopItem, EconomyError> {
            let mut items = self.items.lock().unwrap();
            let row = ShopItem {
                id: items.len() as i64 + 1,
                guild_id: item.guild_id,
                item_name: item.item_name,
                price: item.price,
                description: item.description,
                role_reward_id: item.role_reward_id,
            };
            items.push(row.clone());
            Ok(row)
        }

        async fn get_item(
            &self,
            guild_id: u64,
            name: &str,
        ) -> Result<Option<ShopItem>, EconomyError> {
            Ok(self
                .items
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.guild_id == guild_id && i.item_name.eq_ignore_ascii_case(name))
                .cloned())
        }
    }

    fn new_item(name: &str, price: i64) -> NewShopItem {
        NewShopItem {
            guild_id: 1,
            item_name: name.to_string(),
            price,
            description: None,
            role_reward_id: Some(99),
        }
    }

    #[tokio::test]
    async fn items_are_listed_by_price() {
        let shop = ShopService::new(InMemoryShopStore::default());
        shop.add_item(new_item("VIP", 500)).await.unwrap();
        shop.add_item(new_item("Badge", 100)).await.unwrap();
        let names: Vec<String> = shop
            .list_items(1)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.item_name)
            .collect();
        assert_eq!(names, vec!["Badge", "VIP"]);
    }

    #[tokio::test]
    async fn duplicate_names_and_bad_prices_are_rejected() {
        let shop = ShopService::new(InMemoryShopStore::default());
        shop.add_item(new_item("VIP", 500)).await.unwrap();
        assert!(matches!(
            shop.add_item(new_item("vip", 10)).await,
            Err(EconomyError::DuplicateItem(_))
        ));
        assert!(matches!(
            shop.add_item(new_item("Mahal", 1_000_001)).await,
            Err(EconomyError::InvalidAmount { .. })
        ));
    }

    #[tokio::test]
    async fn buying_debits_balance() {
        let shop = ShopService::new(InMemoryShopStore::default());
        let economy = EconomyService::new(InMemoryCoinStore::default());
        shop.add_item(new_item("VIP", 300)).await.unwrap();

        assert!(matches!(
            shop.buy(&economy, 1, 5, "vip").await,
            Err(EconomyError::InsufficientFunds { .. })
        ));

        economy.adjust(1, 5, 400).await.unwrap();
        let purchase = shop.buy(&economy, 1, 5, " VIP ").await.unwrap();
        assert_eq!(purchase.new_balance, 100);
        assert_eq!(purchase.item.role_reward_id, Some(99));

        assert!(matches!(
            shop.buy(&economy, 1, 5, "missing").await,
            Err(EconomyError::ItemNotFound(_))
        ));
    }
}
