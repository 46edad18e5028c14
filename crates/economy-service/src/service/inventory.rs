//! 库存服务
//!
//! 库存以多重集合建模：每次开箱新增一条条目，"持有"即至少存在一条。

use std::sync::Arc;

use tracing::{debug, instrument};

use super::catalog::CatalogService;
use crate::error::{EconomyError, Result};
use crate::models::{Badge, InventoryEntry, RewardView};
use crate::repository::{InventoryRepositoryTrait, UserRepositoryTrait};

#[derive(Clone)]
pub struct InventoryService {
    inventory: Arc<dyn InventoryRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    catalog: CatalogService,
}

impl InventoryService {
    pub fn new(
        inventory: Arc<dyn InventoryRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        catalog: CatalogService,
    ) -> Self {
        Self {
            inventory,
            users,
            catalog,
        }
    }

    /// 新增一条条目，从不去重
    #[instrument(skip(self))]
    pub async fn grant(&self, user_id: i64, reward_id: i64) -> Result<InventoryEntry> {
        let entry = self.inventory.grant(user_id, reward_id).await?;
        debug!(entry_id = entry.id, "库存条目已发放");
        Ok(entry)
    }

    pub async fn has_entry(&self, user_id: i64, reward_id: i64) -> Result<bool> {
        Ok(self.count_entries(user_id, reward_id).await? > 0)
    }

    pub async fn count_entries(&self, user_id: i64, reward_id: i64) -> Result<i64> {
        self.inventory.count_entries(user_id, reward_id).await
    }

    /// 用户库存，同一奖励只出现一次
    pub async fn list_entries(&self, user_id: i64) -> Result<Vec<RewardView>> {
        let reward_ids = self.inventory.list_reward_ids(user_id).await?;

        let mut views = Vec::with_capacity(reward_ids.len());
        for reward_id in reward_ids {
            let reward = self.catalog.get_case_reward(reward_id).await?;
            views.push(self.catalog.resolve_reward(reward).await?);
        }
        Ok(views)
    }

    /// 删除一条条目，没有可消耗的条目时返回 `NotOwned`
    #[instrument(skip(self))]
    pub async fn consume(&self, user_id: i64, reward_id: i64) -> Result<()> {
        self.inventory.consume_one(user_id, reward_id).await
    }

    /// 用户已拥有的徽章：购买过的徽章加上当前佩戴的徽章，按 id 去重排序
    pub async fn list_owned_badges(&self, user_id: i64) -> Result<Vec<Badge>> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))?;

        let mut badge_ids = Vec::new();
        for item_id in self.inventory.list_purchased_item_ids(user_id).await? {
            if let Some(badge_id) = self.catalog.get_shop_item(item_id).await?.badge_id {
                badge_ids.push(badge_id);
            }
        }
        badge_ids.extend(user.badge_id);
        badge_ids.sort_unstable();
        badge_ids.dedup();

        let mut badges = Vec::with_capacity(badge_ids.len());
        for badge_id in badge_ids {
            badges.push(self.catalog.get_badge(badge_id).await?);
        }
        Ok(badges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryEconomyStore;

    fn service(store: &Arc<MemoryEconomyStore>) -> InventoryService {
        let catalog = CatalogService::new(store.clone(), store.clone());
        InventoryService::new(store.clone(), store.clone(), catalog)
    }

    #[tokio::test]
    async fn test_grant_never_deduplicates() {
        let store = MemoryEconomyStore::new();
        let inventory = service(&store);
        let user_id = store.insert_user("dave", 0);

        let first = inventory.grant(user_id, 11).await.unwrap();
        let second = inventory.grant(user_id, 11).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(inventory.count_entries(user_id, 11).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_consume_until_not_owned() {
        let store = MemoryEconomyStore::new();
        let inventory = service(&store);
        let user_id = store.insert_user("erin", 0);
        inventory.grant(user_id, 5).await.unwrap();

        assert!(inventory.has_entry(user_id, 5).await.unwrap());
        inventory.consume(user_id, 5).await.unwrap();
        assert!(!inventory.has_entry(user_id, 5).await.unwrap());

        let err = inventory.consume(user_id, 5).await.unwrap_err();
        assert!(matches!(
            err,
            EconomyError::NotOwned {
                reward_id: 5,
                ..
            }
        ));
    }
}
