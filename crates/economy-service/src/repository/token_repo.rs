//! 网关凭证仓储
//!
//! gateway_tokens 只有一行（id = 1），每次刷新后整行覆盖

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::TokenRepositoryTrait;
use crate::error::Result;

pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepositoryTrait for TokenRepository {
    async fn get_refresh_token(&self) -> Result<Option<String>> {
        let token = sqlx::query_scalar("SELECT refresh_token FROM gateway_tokens WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(token)
    }

    async fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO gateway_tokens (id, access_token, refresh_token, updated_at)
            VALUES (1, $1, $2, NOW())
            ON CONFLICT (id) DO UPDATE
            SET access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(access_token)
        .bind(refresh_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
