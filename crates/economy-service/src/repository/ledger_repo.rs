//! 余额账本仓储
//!
//! 余额存放在 users.rating。扣款统一走"加锁读取 → 判断 → 更新"，
//! 保证检查与扣减之间不会插入其他写入。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::LedgerRepositoryTrait;
use crate::error::{EconomyError, Result};

pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中锁定余额行并返回当前余额
    ///
    /// 同一用户的并发事务在此排队，直到持锁事务提交或回滚
    pub async fn lock_balance_in_tx(conn: &mut PgConnection, user_id: i64) -> Result<i64> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT rating FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(conn)
                .await?;

        balance.ok_or(EconomyError::UserNotFound(user_id))
    }

    /// 在事务中扣款
    ///
    /// 余额不足时返回 `InsufficientBalance`，调用方回滚事务即可
    pub async fn debit_in_tx(conn: &mut PgConnection, user_id: i64, amount: i64) -> Result<i64> {
        let available = Self::lock_balance_in_tx(&mut *conn, user_id).await?;
        if available < amount {
            return Err(EconomyError::InsufficientBalance {
                required: amount,
                available,
            });
        }

        let balance: i64 =
            sqlx::query_scalar("UPDATE users SET rating = rating - $2 WHERE id = $1 RETURNING rating")
                .bind(user_id)
                .bind(amount)
                .fetch_one(conn)
                .await?;

        Ok(balance)
    }
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn get_balance(&self, user_id: i64) -> Result<Option<i64>> {
        let balance = sqlx::query_scalar("SELECT rating FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(balance)
    }

    async fn adjust(&self, user_id: i64, delta: i64) -> Result<i64> {
        let balance: Option<i64> =
            sqlx::query_scalar("UPDATE users SET rating = rating + $2 WHERE id = $1 RETURNING rating")
                .bind(user_id)
                .bind(delta)
                .fetch_optional(&self.pool)
                .await?;

        balance.ok_or(EconomyError::UserNotFound(user_id))
    }

    async fn debit(&self, user_id: i64, amount: i64) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let balance = Self::debit_in_tx(&mut tx, user_id, amount).await?;
        tx.commit().await?;
        Ok(balance)
    }
}
