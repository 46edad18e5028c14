//! 仓储 Trait 定义
//!
//! 服务层依赖这些抽象而非具体实现。PostgreSQL 与内存两套实现行为一致，
//! 内存实现用于测试和本地调试。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AuctionSubmission, Badge, Case, CaseReward, InventoryEntry, NewCase, NewCaseReward, ShopItem,
    User, UserNotification,
};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;
    /// 覆盖用户当前佩戴的徽章
    async fn set_current_badge(&self, user_id: i64, badge_id: i64) -> Result<()>;
}

/// 余额账本接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    async fn get_balance(&self, user_id: i64) -> Result<Option<i64>>;

    /// 余额加上 delta（可为负），不检查结果是否为负，返回新余额
    async fn adjust(&self, user_id: i64, delta: i64) -> Result<i64>;

    /// 余额充足时扣减 amount，检查与扣减不可分割
    ///
    /// 余额不足返回 `InsufficientBalance`，用户不存在返回 `UserNotFound`
    async fn debit(&self, user_id: i64, amount: i64) -> Result<i64>;
}

/// 商品目录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    // 徽章
    async fn get_badge(&self, badge_id: i64) -> Result<Option<Badge>>;
    async fn list_badges(&self) -> Result<Vec<Badge>>;

    // 商店商品
    async fn get_shop_item(&self, item_id: i64) -> Result<Option<ShopItem>>;
    async fn list_shop_items(&self) -> Result<Vec<ShopItem>>;

    // 箱子
    async fn get_case(&self, case_id: i64) -> Result<Option<Case>>;
    async fn list_cases(&self) -> Result<Vec<Case>>;

    /// 按登记顺序（id 升序）返回
    async fn list_case_rewards(&self, case_id: i64) -> Result<Vec<CaseReward>>;
    async fn get_case_reward(&self, reward_id: i64) -> Result<Option<CaseReward>>;

    // 管理端写入
    /// 在同一事务内创建徽章及其商品
    async fn create_badge_item(&self, image: &str, title: &str, cost: i64) -> Result<ShopItem>;
    async fn create_vip_item(&self, title: &str, cost: i64, image: &str) -> Result<ShopItem>;
    async fn create_case(&self, case: &NewCase) -> Result<Case>;
    async fn add_case_reward(&self, reward: &NewCaseReward) -> Result<CaseReward>;
}

/// 库存仓储接口
///
/// 库存是多重集合：同一 (user, reward) 可以有多条条目
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepositoryTrait: Send + Sync {
    /// 总是新增一条条目，不去重
    async fn grant(&self, user_id: i64, reward_id: i64) -> Result<InventoryEntry>;
    async fn count_entries(&self, user_id: i64, reward_id: i64) -> Result<i64>;
    /// 用户持有的奖励 id，去重后按 id 升序
    async fn list_reward_ids(&self, user_id: i64) -> Result<Vec<i64>>;
    /// 删除一条匹配条目，没有则返回 `NotOwned`
    async fn consume_one(&self, user_id: i64, reward_id: i64) -> Result<()>;

    // 商店购买记录（与开箱库存分开）
    async fn has_purchased(&self, user_id: i64, item_id: i64) -> Result<bool>;
    async fn list_purchased_item_ids(&self, user_id: i64) -> Result<Vec<i64>>;
}

/// 跨表事务接口
///
/// 每个方法都在单个事务中对用户余额行加锁后完成"检查-修改"
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EconomyTransactionsTrait: Send + Sync {
    /// 购买徽章：检查余额与重复购买，写购买记录、佩戴徽章、扣款；返回新余额
    async fn purchase_badge(
        &self,
        user_id: i64,
        item_id: i64,
        badge_id: i64,
        cost: i64,
    ) -> Result<i64>;

    /// 开箱：检查余额、扣款并发放奖励；返回新条目和新余额
    async fn open_case(
        &self,
        user_id: i64,
        price: i64,
        reward_id: i64,
    ) -> Result<(InventoryEntry, i64)>;

    /// 兑换拍卖额度：写拍卖提交记录并消耗一条库存
    async fn redeem_auction(
        &self,
        user_id: i64,
        reward_id: i64,
        lot_name: &str,
        auk_value: i64,
    ) -> Result<AuctionSubmission>;
}

/// 站内通知仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    async fn create(&self, notification: &UserNotification) -> Result<i64>;
}

/// 网关凭证仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepositoryTrait: Send + Sync {
    async fn get_refresh_token(&self) -> Result<Option<String>>;
    async fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()>;
}
