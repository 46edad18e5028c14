//! 商品目录仓储
//!
//! 徽章、商店商品、箱子与箱子奖励的数据访问

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::CatalogRepositoryTrait;
use crate::error::Result;
use crate::models::{Badge, Case, CaseReward, ItemKind, NewCase, NewCaseReward, ShopItem};

/// 徽章商品的展示图取自徽章本身
const SHOP_ITEM_COLUMNS: &str = r#"
    s.id, s.kind, s.title, s.cost,
    COALESCE(b.image, s.image) AS image,
    s.badge_id
"#;

pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    // ==================== 徽章 ====================

    async fn get_badge(&self, badge_id: i64) -> Result<Option<Badge>> {
        let badge = sqlx::query_as::<_, Badge>(
            r#"
            SELECT b.id, b.image, s.title, s.cost
            FROM badges b
            JOIN shop_items s ON s.badge_id = b.id
            WHERE b.id = $1
            "#,
        )
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge)
    }

    async fn list_badges(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT b.id, b.image, s.title, s.cost
            FROM badges b
            JOIN shop_items s ON s.badge_id = b.id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    // ==================== 商店商品 ====================

    async fn get_shop_item(&self, item_id: i64) -> Result<Option<ShopItem>> {
        let sql = format!(
            "SELECT {} FROM shop_items s LEFT JOIN badges b ON b.id = s.badge_id WHERE s.id = $1",
            SHOP_ITEM_COLUMNS
        );
        let item = sqlx::query_as::<_, ShopItem>(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>> {
        let sql = format!(
            "SELECT {} FROM shop_items s LEFT JOIN badges b ON b.id = s.badge_id ORDER BY s.id",
            SHOP_ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, ShopItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    // ==================== 箱子 ====================

    async fn get_case(&self, case_id: i64) -> Result<Option<Case>> {
        let case = sqlx::query_as::<_, Case>(
            "SELECT id, title, description, price, image FROM cases WHERE id = $1",
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(case)
    }

    async fn list_cases(&self) -> Result<Vec<Case>> {
        let cases = sqlx::query_as::<_, Case>(
            "SELECT id, title, description, price, image FROM cases ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cases)
    }

    async fn list_case_rewards(&self, case_id: i64) -> Result<Vec<CaseReward>> {
        let rewards = sqlx::query_as::<_, CaseReward>(
            r#"
            SELECT id, case_id, kind, probability, badge_id, auk_value
            FROM case_rewards
            WHERE case_id = $1
            ORDER BY id
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    async fn get_case_reward(&self, reward_id: i64) -> Result<Option<CaseReward>> {
        let reward = sqlx::query_as::<_, CaseReward>(
            r#"
            SELECT id, case_id, kind, probability, badge_id, auk_value
            FROM case_rewards
            WHERE id = $1
            "#,
        )
        .bind(reward_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    // ==================== 管理端写入 ====================

    async fn create_badge_item(&self, image: &str, title: &str, cost: i64) -> Result<ShopItem> {
        let mut tx = self.pool.begin().await?;

        let badge_id: i64 = sqlx::query_scalar("INSERT INTO badges (image) VALUES ($1) RETURNING id")
            .bind(image)
            .fetch_one(&mut *tx)
            .await?;

        let item_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO shop_items (kind, title, cost, image, badge_id)
            VALUES ($1, $2, $3, '', $4)
            RETURNING id
            "#,
        )
        .bind(ItemKind::Badge)
        .bind(title)
        .bind(cost)
        .bind(badge_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ShopItem {
            id: item_id,
            kind: ItemKind::Badge,
            title: title.to_string(),
            cost,
            image: image.to_string(),
            badge_id: Some(badge_id),
        })
    }

    async fn create_vip_item(&self, title: &str, cost: i64, image: &str) -> Result<ShopItem> {
        let item_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO shop_items (kind, title, cost, image, badge_id)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING id
            "#,
        )
        .bind(ItemKind::Vip)
        .bind(title)
        .bind(cost)
        .bind(image)
        .fetch_one(&self.pool)
        .await?;

        Ok(ShopItem {
            id: item_id,
            kind: ItemKind::Vip,
            title: title.to_string(),
            cost,
            image: image.to_string(),
            badge_id: None,
        })
    }

    async fn create_case(&self, case: &NewCase) -> Result<Case> {
        let created = sqlx::query_as::<_, Case>(
            r#"
            INSERT INTO cases (title, description, price, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, price, image
            "#,
        )
        .bind(&case.title)
        .bind(&case.description)
        .bind(case.price)
        .bind(&case.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn add_case_reward(&self, reward: &NewCaseReward) -> Result<CaseReward> {
        let created = sqlx::query_as::<_, CaseReward>(
            r#"
            INSERT INTO case_rewards (case_id, kind, probability, badge_id, auk_value)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, case_id, kind, probability, badge_id, auk_value
            "#,
        )
        .bind(reward.case_id)
        .bind(reward.kind)
        .bind(reward.probability)
        .bind(reward.badge_id)
        .bind(reward.auk_value)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
