//! 经济引擎
//!
//! 编排账本、目录、抽奖、库存和特权网关，实现购买、开箱、使用物品等用例。
//!
//! ## 一致性
//!
//! - 同一用户的变更用例持有进程内用户锁，按到达顺序串行执行
//! - 余额检查与扣款、扣款与发放都在同一数据库事务中完成
//! - 外部网关调用发生在本地提交之前；网关失败或超时时本地状态不变

use std::sync::Arc;

use economy_shared::observability::metrics::{record_case_open, record_item_apply, record_purchase};
use tracing::{info, instrument, warn};

use super::catalog::{CatalogService, VIP_REWARD_IMAGE};
use super::dto::{ApplyOutcome, OpenCaseResult, PurchaseResult, ShopItemView, ShopOverview};
use super::inventory::InventoryService;
use super::ledger::LedgerService;
use super::selector::RewardSelector;
use super::user_lock::{UserLockGuard, UserLocks};
use crate::error::{EconomyError, Result};
use crate::gateway::PrivilegeGateway;
use crate::models::{Badge, CaseReward, ItemKind, RewardKind, RewardView, ShopItem, User};
use crate::notification::NotificationSender;
use crate::repository::{EconomyRepositories, EconomyTransactionsTrait, UserRepositoryTrait};

/// 与 auction_submissions.lot_name 列宽一致
const MAX_LOT_NAME_LEN: usize = 255;

fn outcome_label<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.error_code(),
    }
}

pub struct EconomyService {
    users: Arc<dyn UserRepositoryTrait>,
    transactions: Arc<dyn EconomyTransactionsTrait>,
    ledger: LedgerService,
    catalog: CatalogService,
    inventory: InventoryService,
    selector: RewardSelector,
    gateway: Arc<dyn PrivilegeGateway>,
    notifier: NotificationSender,
    locks: UserLocks,
}

impl EconomyService {
    pub fn new(
        repos: EconomyRepositories,
        gateway: Arc<dyn PrivilegeGateway>,
        selector: RewardSelector,
    ) -> Self {
        let catalog = CatalogService::new(repos.catalog.clone(), repos.inventory.clone());
        let inventory =
            InventoryService::new(repos.inventory.clone(), repos.users.clone(), catalog.clone());

        Self {
            users: repos.users,
            transactions: repos.transactions,
            ledger: LedgerService::new(repos.ledger),
            catalog,
            inventory,
            selector,
            gateway,
            notifier: NotificationSender::new(repos.notifications),
            locks: UserLocks::new(),
        }
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn inventory(&self) -> &InventoryService {
        &self.inventory
    }

    async fn load_user(&self, user_id: i64) -> Result<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))
    }

    /// 确认用户存在后再加锁，未知用户不进入锁表
    ///
    /// 余额等可变字段仍需在持锁后重新读取
    async fn lock_user(&self, user_id: i64) -> Result<UserLockGuard> {
        self.load_user(user_id).await?;
        Ok(self.locks.acquire(user_id).await)
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks.len()
    }

    // ==================== 查询操作 ====================

    pub async fn list_shop_items(&self, user_id: i64) -> Result<Vec<ShopItemView>> {
        self.catalog.list_shop_items(user_id).await
    }

    /// 纯读取，目录不变时多次调用结果相同
    pub async fn list_case_rewards(&self, case_id: i64) -> Result<Vec<RewardView>> {
        self.catalog.list_case_rewards(case_id).await
    }

    pub async fn shop_overview(&self, user_id: i64) -> Result<ShopOverview> {
        let balance = self.ledger.get_balance(user_id).await?;
        let items = self.catalog.list_shop_items(user_id).await?;
        let cases = self.catalog.list_cases().await?;

        Ok(ShopOverview {
            balance,
            items,
            cases,
        })
    }

    pub async fn list_inventory(&self, user_id: i64) -> Result<Vec<RewardView>> {
        self.load_user(user_id).await?;
        self.inventory.list_entries(user_id).await
    }

    pub async fn list_owned_badges(&self, user_id: i64) -> Result<Vec<Badge>> {
        self.inventory.list_owned_badges(user_id).await
    }

    // ==================== 购买 ====================

    /// 购买商店商品
    ///
    /// - vip：先调用网关授予，成功后扣款；扣款失败则撤销 VIP 作为补偿
    /// - badge：写购买记录、自动佩戴、扣款在同一事务中完成
    #[instrument(skip(self))]
    pub async fn purchase_item(&self, user_id: i64, item_id: i64) -> Result<PurchaseResult> {
        let _guard = self.lock_user(user_id).await?;

        let user = self.load_user(user_id).await?;
        let item = self.catalog.get_shop_item(item_id).await?;

        let result = self.do_purchase(&user, &item).await;
        record_purchase(item.kind.as_str(), outcome_label(&result));

        let result = result?;
        info!(
            user_id,
            item_id,
            kind = item.kind.as_str(),
            cost = item.cost,
            balance = result.balance,
            "商品购买成功"
        );
        Ok(result)
    }

    async fn do_purchase(&self, user: &User, item: &ShopItem) -> Result<PurchaseResult> {
        if user.rating < item.cost {
            return Err(EconomyError::InsufficientBalance {
                required: item.cost,
                available: user.rating,
            });
        }

        match item.kind {
            ItemKind::Vip => {
                self.gateway.grant_vip(&user.login).await?;

                let balance = match self.ledger.debit(user.id, item.cost).await {
                    Ok(balance) => balance,
                    Err(e) => {
                        warn!(user_id = user.id, error = %e, "VIP 已授予但扣款失败，执行撤销");
                        if let Err(revoke_err) = self.gateway.revoke_vip(&user.login).await {
                            warn!(user_id = user.id, error = %revoke_err, "VIP 补偿撤销失败");
                        }
                        return Err(e);
                    }
                };

                Ok(PurchaseResult {
                    item_id: item.id,
                    kind: item.kind,
                    balance,
                    equipped_badge_id: None,
                })
            }
            ItemKind::Badge => {
                let badge_id = item.badge_id.ok_or_else(|| {
                    EconomyError::Internal(format!("徽章商品缺少 badge_id: item_id={}", item.id))
                })?;

                let balance = self
                    .transactions
                    .purchase_badge(user.id, item.id, badge_id, item.cost)
                    .await?;

                Ok(PurchaseResult {
                    item_id: item.id,
                    kind: item.kind,
                    balance,
                    equipped_badge_id: Some(badge_id),
                })
            }
        }
    }

    // ==================== 开箱 ====================

    /// 开箱
    ///
    /// 抽奖和奖励解析在扣款之前完成；任何一步失败，余额和库存都不变。
    /// 扣款与发放在同一事务中提交，提交即成功。
    #[instrument(skip(self))]
    pub async fn open_case(&self, case_id: i64, user_id: i64) -> Result<OpenCaseResult> {
        let _guard = self.lock_user(user_id).await?;

        let result = self.do_open_case(case_id, user_id).await;
        record_case_open(outcome_label(&result));

        let result = result?;
        self.notifier.send_case_reward(user_id, &result.reward);

        info!(
            user_id,
            case_id,
            reward_id = result.reward.reward.id,
            entry_id = result.entry_id,
            balance = result.balance,
            "开箱成功"
        );
        Ok(result)
    }

    async fn do_open_case(&self, case_id: i64, user_id: i64) -> Result<OpenCaseResult> {
        let user = self.load_user(user_id).await?;
        let case = self.catalog.get_case(case_id).await?;
        let rewards = self.catalog.case_rewards(case_id).await?;

        if user.rating < case.price {
            return Err(EconomyError::InsufficientBalance {
                required: case.price,
                available: user.rating,
            });
        }

        let reward = self
            .selector
            .pick(&rewards)
            .cloned()
            .ok_or(EconomyError::NoRewardSelected { case_id })?;

        // 展示信息在提交前解析，提交之后不再有可失败的步骤
        let reward = self.catalog.resolve_reward(reward).await?;

        let (entry, balance) = self
            .transactions
            .open_case(user_id, case.price, reward.reward.id)
            .await?;

        Ok(OpenCaseResult {
            entry_id: entry.id,
            reward,
            balance,
        })
    }

    // ==================== 使用物品 ====================

    /// 使用库存物品
    ///
    /// - vip：网关授予成功后消耗一条条目
    /// - auk：提交拍品（`lot_name` 必填）并消耗一条条目，二者在同一事务中
    /// - badge：佩戴该徽章，条目保留
    #[instrument(skip(self))]
    pub async fn apply_item(
        &self,
        reward_id: i64,
        user_id: i64,
        lot_name: Option<&str>,
    ) -> Result<ApplyOutcome> {
        let _guard = self.lock_user(user_id).await?;

        let user = self.load_user(user_id).await?;
        let reward = self.catalog.get_case_reward(reward_id).await?;

        let result = self.do_apply(&user, &reward, lot_name).await;
        record_item_apply(reward.kind.as_str(), outcome_label(&result));

        let outcome = result?;
        info!(user_id, reward_id, kind = reward.kind.as_str(), "物品使用成功");
        Ok(outcome)
    }

    async fn do_apply(
        &self,
        user: &User,
        reward: &CaseReward,
        lot_name: Option<&str>,
    ) -> Result<ApplyOutcome> {
        let reward_id = reward.id;
        if !self.inventory.has_entry(user.id, reward_id).await? {
            return Err(EconomyError::NotOwned {
                user_id: user.id,
                reward_id,
            });
        }

        match reward.kind {
            RewardKind::Vip => {
                self.gateway.grant_vip(&user.login).await?;
                self.inventory.consume(user.id, reward_id).await?;
                self.notifier.send_vip_granted(user.id, VIP_REWARD_IMAGE);
                Ok(ApplyOutcome::VipGranted)
            }
            RewardKind::Auk => {
                let lot_name = lot_name
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| EconomyError::Validation("拍品名称不能为空".to_string()))?;
                if lot_name.chars().count() > MAX_LOT_NAME_LEN {
                    return Err(EconomyError::Validation(format!(
                        "拍品名称不能超过 {} 个字符",
                        MAX_LOT_NAME_LEN
                    )));
                }

                let submission = self
                    .transactions
                    .redeem_auction(user.id, reward_id, lot_name, reward.auk_value.unwrap_or_default())
                    .await?;
                Ok(ApplyOutcome::AuctionSubmitted { submission })
            }
            RewardKind::Badge => {
                let badge_id = reward.badge_id.ok_or_else(|| {
                    EconomyError::Internal(format!("徽章奖励缺少 badge_id: reward_id={}", reward_id))
                })?;
                self.users.set_current_badge(user.id, badge_id).await?;
                Ok(ApplyOutcome::BadgeEquipped { badge_id })
            }
        }
    }

    /// 佩戴徽章，覆盖当前徽章
    ///
    /// 只校验用户和徽章存在，不校验持有关系
    #[instrument(skip(self))]
    pub async fn apply_badge(&self, badge_id: i64, user_id: i64) -> Result<()> {
        let _guard = self.lock_user(user_id).await?;

        self.catalog.get_badge(badge_id).await?;
        self.users.set_current_badge(user_id, badge_id).await?;

        info!(user_id, badge_id, "徽章已佩戴");
        Ok(())
    }
}
