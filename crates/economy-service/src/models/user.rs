//! 用户侧模型
//!
//! 用户本身由用户管理模块维护，这里只读取经济相关字段

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub login: String,
    /// 可消费余额（积分）
    pub rating: i64,
    /// 当前佩戴的徽章
    pub badge_id: Option<i64>,
}

/// 库存条目
///
/// 每次开箱都新增一条，同一奖励可以有多条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub reward_id: i64,
    pub created_at: DateTime<Utc>,
}

/// 拍卖提交记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSubmission {
    pub id: i64,
    pub user_id: i64,
    pub lot_name: String,
    pub auk_value: i64,
    pub created_at: DateTime<Utc>,
}

/// 用户站内通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotification {
    pub user_id: i64,
    pub text: String,
    pub image_url: String,
    pub link_url: String,
}
