//! 站内通知仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::NotificationRepositoryTrait;
use crate::error::Result;
use crate::models::UserNotification;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn create(&self, notification: &UserNotification) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO notifications (user_id, text, image_url, link_url, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(notification.user_id)
        .bind(&notification.text)
        .bind(&notification.image_url)
        .bind(&notification.link_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
