//! 库存仓储
//!
//! inventory_entries 存放开箱所得（多重集合），user_items 存放商店购买记录

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::InventoryRepositoryTrait;
use crate::error::{EconomyError, Result};
use crate::models::{AuctionSubmission, InventoryEntry};

pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中新增库存条目
    pub async fn grant_in_tx(
        conn: &mut PgConnection,
        user_id: i64,
        reward_id: i64,
    ) -> Result<InventoryEntry> {
        let entry = sqlx::query_as::<_, InventoryEntry>(
            r#"
            INSERT INTO inventory_entries (user_id, reward_id, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, user_id, reward_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(reward_id)
        .fetch_one(conn)
        .await?;

        Ok(entry)
    }

    /// 在事务中删除一条匹配的库存条目
    ///
    /// 先锁定最早的一条再删除，同一条目不会被两个事务同时消耗
    pub async fn consume_one_in_tx(
        conn: &mut PgConnection,
        user_id: i64,
        reward_id: i64,
    ) -> Result<()> {
        let entry_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM inventory_entries
            WHERE user_id = $1 AND reward_id = $2
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(reward_id)
        .fetch_optional(&mut *conn)
        .await?;

        let entry_id = entry_id.ok_or(EconomyError::NotOwned { user_id, reward_id })?;

        sqlx::query("DELETE FROM inventory_entries WHERE id = $1")
            .bind(entry_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// 在事务中检查是否已购买
    pub async fn has_purchased_in_tx(
        conn: &mut PgConnection,
        user_id: i64,
        item_id: i64,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_items WHERE user_id = $1 AND item_id = $2)",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// 在事务中写入购买记录
    pub async fn record_purchase_in_tx(
        conn: &mut PgConnection,
        user_id: i64,
        item_id: i64,
    ) -> Result<()> {
        sqlx::query("INSERT INTO user_items (user_id, item_id, created_at) VALUES ($1, $2, NOW())")
            .bind(user_id)
            .bind(item_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// 在事务中写入拍卖提交记录
    pub async fn create_submission_in_tx(
        conn: &mut PgConnection,
        user_id: i64,
        lot_name: &str,
        auk_value: i64,
    ) -> Result<AuctionSubmission> {
        let submission = sqlx::query_as::<_, AuctionSubmission>(
            r#"
            INSERT INTO auction_submissions (user_id, lot_name, auk_value, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, lot_name, auk_value, created_at
            "#,
        )
        .bind(user_id)
        .bind(lot_name)
        .bind(auk_value)
        .fetch_one(conn)
        .await?;

        Ok(submission)
    }
}

#[async_trait]
impl InventoryRepositoryTrait for InventoryRepository {
    async fn grant(&self, user_id: i64, reward_id: i64) -> Result<InventoryEntry> {
        let mut conn = self.pool.acquire().await?;
        Self::grant_in_tx(&mut conn, user_id, reward_id).await
    }

    async fn count_entries(&self, user_id: i64, reward_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM inventory_entries WHERE user_id = $1 AND reward_id = $2",
        )
        .bind(user_id)
        .bind(reward_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_reward_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT DISTINCT reward_id
            FROM inventory_entries
            WHERE user_id = $1
            ORDER BY reward_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn consume_one(&self, user_id: i64, reward_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::consume_one_in_tx(&mut tx, user_id, reward_id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn has_purchased(&self, user_id: i64, item_id: i64) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Self::has_purchased_in_tx(&mut conn, user_id, item_id).await
    }

    async fn list_purchased_item_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT item_id FROM user_items WHERE user_id = $1 ORDER BY item_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
