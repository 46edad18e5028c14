//! 跨表事务
//!
//! 组合各仓储的 `*_in_tx` 方法。每个事务先锁定用户余额行，
//! 同一用户的购买/开箱/兑换因此在数据库层串行化。

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::inventory_repo::InventoryRepository;
use super::ledger_repo::LedgerRepository;
use super::traits::EconomyTransactionsTrait;
use super::user_repo::UserRepository;
use crate::error::{EconomyError, Result};
use crate::models::{AuctionSubmission, InventoryEntry};

pub struct EconomyTransactions {
    pool: PgPool,
}

impl EconomyTransactions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EconomyTransactionsTrait for EconomyTransactions {
    async fn purchase_badge(
        &self,
        user_id: i64,
        item_id: i64,
        badge_id: i64,
        cost: i64,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        // 先锁余额行，后续的重复购买检查也在锁内
        LedgerRepository::lock_balance_in_tx(&mut tx, user_id).await?;

        if InventoryRepository::has_purchased_in_tx(&mut tx, user_id, item_id).await? {
            return Err(EconomyError::AlreadyOwned { user_id, item_id });
        }

        let balance = LedgerRepository::debit_in_tx(&mut tx, user_id, cost).await?;
        InventoryRepository::record_purchase_in_tx(&mut tx, user_id, item_id).await?;
        UserRepository::set_current_badge_in_tx(&mut tx, user_id, badge_id).await?;

        tx.commit().await?;

        debug!(user_id, item_id, badge_id, balance, "徽章购买事务已提交");
        Ok(balance)
    }

    async fn open_case(
        &self,
        user_id: i64,
        price: i64,
        reward_id: i64,
    ) -> Result<(InventoryEntry, i64)> {
        let mut tx = self.pool.begin().await?;

        let balance = LedgerRepository::debit_in_tx(&mut tx, user_id, price).await?;
        let entry = InventoryRepository::grant_in_tx(&mut tx, user_id, reward_id).await?;

        tx.commit().await?;

        debug!(user_id, reward_id, entry_id = entry.id, balance, "开箱事务已提交");
        Ok((entry, balance))
    }

    async fn redeem_auction(
        &self,
        user_id: i64,
        reward_id: i64,
        lot_name: &str,
        auk_value: i64,
    ) -> Result<AuctionSubmission> {
        let mut tx = self.pool.begin().await?;

        LedgerRepository::lock_balance_in_tx(&mut tx, user_id).await?;
        InventoryRepository::consume_one_in_tx(&mut tx, user_id, reward_id).await?;
        let submission =
            InventoryRepository::create_submission_in_tx(&mut tx, user_id, lot_name, auk_value)
                .await?;

        tx.commit().await?;

        debug!(user_id, reward_id, submission_id = submission.id, "拍卖兑换事务已提交");
        Ok(submission)
    }
}
