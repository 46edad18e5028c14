//! 内存存储
//!
//! 所有表放在同一把 parking_lot 互斥锁下，每个仓储方法在一次加锁内完成，
//! 因此跨表事务天然原子。锁不跨越 await 点。适用于测试和本地调试。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::traits::{
    CatalogRepositoryTrait, EconomyTransactionsTrait, InventoryRepositoryTrait,
    LedgerRepositoryTrait, NotificationRepositoryTrait, TokenRepositoryTrait,
    UserRepositoryTrait,
};
use super::EconomyRepositories;
use crate::error::{EconomyError, Result};
use crate::models::{
    AuctionSubmission, Badge, Case, CaseReward, InventoryEntry, ItemKind, NewCase, NewCaseReward,
    ShopItem, User, UserNotification,
};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    badge_images: BTreeMap<i64, String>,
    shop_items: BTreeMap<i64, ShopItem>,
    cases: BTreeMap<i64, Case>,
    rewards: BTreeMap<i64, CaseReward>,
    entries: BTreeMap<i64, InventoryEntry>,
    purchases: Vec<(i64, i64)>,
    submissions: Vec<AuctionSubmission>,
    notifications: Vec<UserNotification>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_mut(&mut self, user_id: i64) -> Result<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or(EconomyError::UserNotFound(user_id))
    }

    fn debit(&mut self, user_id: i64, amount: i64) -> Result<i64> {
        let user = self.user_mut(user_id)?;
        if user.rating < amount {
            return Err(EconomyError::InsufficientBalance {
                required: amount,
                available: user.rating,
            });
        }
        user.rating -= amount;
        Ok(user.rating)
    }

    fn find_entry(&self, user_id: i64, reward_id: i64) -> Option<i64> {
        self.entries
            .values()
            .find(|e| e.user_id == user_id && e.reward_id == reward_id)
            .map(|e| e.id)
    }

    fn grant(&mut self, user_id: i64, reward_id: i64) -> InventoryEntry {
        let entry = InventoryEntry {
            id: self.next_id(),
            user_id,
            reward_id,
            created_at: Utc::now(),
        };
        self.entries.insert(entry.id, entry.clone());
        entry
    }

    fn has_purchased(&self, user_id: i64, item_id: i64) -> bool {
        self.purchases.contains(&(user_id, item_id))
    }

    fn badge(&self, badge_id: i64) -> Option<Badge> {
        let image = self.badge_images.get(&badge_id)?;
        let item = self
            .shop_items
            .values()
            .find(|i| i.badge_id == Some(badge_id))?;
        Some(Badge {
            id: badge_id,
            image: image.clone(),
            title: item.title.clone(),
            cost: item.cost,
        })
    }
}

/// 内存版经济存储，实现全部仓储接口
#[derive(Debug, Default)]
pub struct MemoryEconomyStore {
    state: Mutex<MemoryState>,
}

impl MemoryEconomyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 以同一实例组装全部仓储
    pub fn repositories(self: &Arc<Self>) -> EconomyRepositories {
        EconomyRepositories {
            users: self.clone(),
            ledger: self.clone(),
            catalog: self.clone(),
            inventory: self.clone(),
            transactions: self.clone(),
            notifications: self.clone(),
            tokens: self.clone(),
        }
    }

    // ==================== 测试数据准备 ====================

    /// 创建用户，返回用户 ID
    pub fn insert_user(&self, login: &str, rating: i64) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.users.insert(
            id,
            User {
                id,
                login: login.to_string(),
                rating,
                badge_id: None,
            },
        );
        id
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.state.lock().refresh_token = Some(token.to_string());
    }

    // ==================== 状态快照 ====================

    pub fn user(&self, user_id: i64) -> Option<User> {
        self.state.lock().users.get(&user_id).cloned()
    }

    pub fn entries(&self, user_id: i64) -> Vec<InventoryEntry> {
        self.state
            .lock()
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn submissions(&self) -> Vec<AuctionSubmission> {
        self.state.lock().submissions.clone()
    }

    pub fn notifications(&self) -> Vec<UserNotification> {
        self.state.lock().notifications.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.lock().access_token.clone()
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryEconomyStore {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.state.lock().users.get(&user_id).cloned())
    }

    async fn set_current_badge(&self, user_id: i64, badge_id: i64) -> Result<()> {
        self.state.lock().user_mut(user_id)?.badge_id = Some(badge_id);
        Ok(())
    }
}

#[async_trait]
impl LedgerRepositoryTrait for MemoryEconomyStore {
    async fn get_balance(&self, user_id: i64) -> Result<Option<i64>> {
        Ok(self.state.lock().users.get(&user_id).map(|u| u.rating))
    }

    async fn adjust(&self, user_id: i64, delta: i64) -> Result<i64> {
        let mut state = self.state.lock();
        let user = state.user_mut(user_id)?;
        user.rating += delta;
        Ok(user.rating)
    }

    async fn debit(&self, user_id: i64, amount: i64) -> Result<i64> {
        self.state.lock().debit(user_id, amount)
    }
}

#[async_trait]
impl CatalogRepositoryTrait for MemoryEconomyStore {
    async fn get_badge(&self, badge_id: i64) -> Result<Option<Badge>> {
        Ok(self.state.lock().badge(badge_id))
    }

    async fn list_badges(&self) -> Result<Vec<Badge>> {
        let state = self.state.lock();
        Ok(state
            .badge_images
            .keys()
            .filter_map(|id| state.badge(*id))
            .collect())
    }

    async fn get_shop_item(&self, item_id: i64) -> Result<Option<ShopItem>> {
        Ok(self.state.lock().shop_items.get(&item_id).cloned())
    }

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>> {
        Ok(self.state.lock().shop_items.values().cloned().collect())
    }

    async fn get_case(&self, case_id: i64) -> Result<Option<Case>> {
        Ok(self.state.lock().cases.get(&case_id).cloned())
    }

    async fn list_cases(&self) -> Result<Vec<Case>> {
        Ok(self.state.lock().cases.values().cloned().collect())
    }

    async fn list_case_rewards(&self, case_id: i64) -> Result<Vec<CaseReward>> {
        Ok(self
            .state
            .lock()
            .rewards
            .values()
            .filter(|r| r.case_id == case_id)
            .cloned()
            .collect())
    }

    async fn get_case_reward(&self, reward_id: i64) -> Result<Option<CaseReward>> {
        Ok(self.state.lock().rewards.get(&reward_id).cloned())
    }

    async fn create_badge_item(&self, image: &str, title: &str, cost: i64) -> Result<ShopItem> {
        let mut state = self.state.lock();
        let badge_id = state.next_id();
        state.badge_images.insert(badge_id, image.to_string());

        let item = ShopItem {
            id: state.next_id(),
            kind: ItemKind::Badge,
            title: title.to_string(),
            cost,
            image: image.to_string(),
            badge_id: Some(badge_id),
        };
        state.shop_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn create_vip_item(&self, title: &str, cost: i64, image: &str) -> Result<ShopItem> {
        let mut state = self.state.lock();
        let item = ShopItem {
            id: state.next_id(),
            kind: ItemKind::Vip,
            title: title.to_string(),
            cost,
            image: image.to_string(),
            badge_id: None,
        };
        state.shop_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn create_case(&self, case: &NewCase) -> Result<Case> {
        let mut state = self.state.lock();
        let created = Case {
            id: state.next_id(),
            title: case.title.clone(),
            description: case.description.clone(),
            price: case.price,
            image: case.image.clone(),
        };
        state.cases.insert(created.id, created.clone());
        Ok(created)
    }

    async fn add_case_reward(&self, reward: &NewCaseReward) -> Result<CaseReward> {
        let mut state = self.state.lock();
        let created = CaseReward {
            id: state.next_id(),
            case_id: reward.case_id,
            kind: reward.kind,
            probability: reward.probability,
            badge_id: reward.badge_id,
            auk_value: reward.auk_value,
        };
        state.rewards.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl InventoryRepositoryTrait for MemoryEconomyStore {
    async fn grant(&self, user_id: i64, reward_id: i64) -> Result<InventoryEntry> {
        Ok(self.state.lock().grant(user_id, reward_id))
    }

    async fn count_entries(&self, user_id: i64, reward_id: i64) -> Result<i64> {
        let state = self.state.lock();
        let count = state
            .entries
            .values()
            .filter(|e| e.user_id == user_id && e.reward_id == reward_id)
            .count();
        Ok(count as i64)
    }

    async fn list_reward_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let state = self.state.lock();
        let mut ids: Vec<i64> = state
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.reward_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn consume_one(&self, user_id: i64, reward_id: i64) -> Result<()> {
        let mut state = self.state.lock();
        let entry_id = state
            .find_entry(user_id, reward_id)
            .ok_or(EconomyError::NotOwned { user_id, reward_id })?;
        state.entries.remove(&entry_id);
        Ok(())
    }

    async fn has_purchased(&self, user_id: i64, item_id: i64) -> Result<bool> {
        Ok(self.state.lock().has_purchased(user_id, item_id))
    }

    async fn list_purchased_item_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let state = self.state.lock();
        let mut ids: Vec<i64> = state
            .purchases
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, item_id)| *item_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl EconomyTransactionsTrait for MemoryEconomyStore {
    async fn purchase_badge(
        &self,
        user_id: i64,
        item_id: i64,
        badge_id: i64,
        cost: i64,
    ) -> Result<i64> {
        let mut state = self.state.lock();
        state.user_mut(user_id)?;
        if state.has_purchased(user_id, item_id) {
            return Err(EconomyError::AlreadyOwned { user_id, item_id });
        }

        let balance = state.debit(user_id, cost)?;
        state.purchases.push((user_id, item_id));
        state.user_mut(user_id)?.badge_id = Some(badge_id);
        Ok(balance)
    }

    async fn open_case(
        &self,
        user_id: i64,
        price: i64,
        reward_id: i64,
    ) -> Result<(InventoryEntry, i64)> {
        let mut state = self.state.lock();
        let balance = state.debit(user_id, price)?;
        let entry = state.grant(user_id, reward_id);
        Ok((entry, balance))
    }

    async fn redeem_auction(
        &self,
        user_id: i64,
        reward_id: i64,
        lot_name: &str,
        auk_value: i64,
    ) -> Result<AuctionSubmission> {
        let mut state = self.state.lock();
        let entry_id = state
            .find_entry(user_id, reward_id)
            .ok_or(EconomyError::NotOwned { user_id, reward_id })?;
        state.entries.remove(&entry_id);

        let submission = AuctionSubmission {
            id: state.next_id(),
            user_id,
            lot_name: lot_name.to_string(),
            auk_value,
            created_at: Utc::now(),
        };
        state.submissions.push(submission.clone());
        Ok(submission)
    }
}

#[async_trait]
impl NotificationRepositoryTrait for MemoryEconomyStore {
    async fn create(&self, notification: &UserNotification) -> Result<i64> {
        let mut state = self.state.lock();
        state.notifications.push(notification.clone());
        Ok(state.notifications.len() as i64)
    }
}

#[async_trait]
impl TokenRepositoryTrait for MemoryEconomyStore {
    async fn get_refresh_token(&self) -> Result<Option<String>> {
        Ok(self.state.lock().refresh_token.clone())
    }

    async fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.access_token = Some(access_token.to_string());
        state.refresh_token = Some(refresh_token.to_string());
        Ok(())
    }
}
