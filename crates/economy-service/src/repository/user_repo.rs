//! 用户仓储
//!
//! 只读取和修改经济系统关心的用户字段（登录名、余额、当前徽章）

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::UserRepositoryTrait;
use crate::error::{EconomyError, Result};
use crate::models::User;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中覆盖当前徽章
    pub async fn set_current_badge_in_tx(
        conn: &mut PgConnection,
        user_id: i64,
        badge_id: i64,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE users SET badge_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(badge_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EconomyError::UserNotFound(user_id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, rating, badge_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_current_badge(&self, user_id: i64, badge_id: i64) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Self::set_current_badge_in_tx(&mut conn, user_id, badge_id).await
    }
}
