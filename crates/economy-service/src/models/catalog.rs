//! 商品目录模型
//!
//! 徽章、商店商品、箱子及箱子奖励。目录数据由管理端创建，引擎只读。

use serde::{Deserialize, Serialize};

use super::enums::{ItemKind, RewardKind};

/// 徽章
///
/// 标题和价格来自对应的徽章商品，查询时联表得到
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub cost: i64,
}

/// 商店商品
///
/// kind=badge 时 `badge_id` 必有值，`image` 取自徽章；kind=vip 时 `image` 取自商品本身
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: i64,
    pub kind: ItemKind,
    pub title: String,
    pub cost: i64,
    pub image: String,
    pub badge_id: Option<i64>,
}

/// 箱子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub image: String,
}

/// 箱子奖励
///
/// 同一箱子内按 id 升序（即登记顺序）参与抽取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CaseReward {
    pub id: i64,
    pub case_id: i64,
    pub kind: RewardKind,
    pub probability: f64,
    pub badge_id: Option<i64>,
    pub auk_value: Option<i64>,
}

/// 带展示信息的奖励
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardView {
    #[serde(flatten)]
    pub reward: CaseReward,
    pub title: String,
    pub image: String,
}

/// 新建箱子
#[derive(Debug, Clone)]
pub struct NewCase {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub image: String,
}

/// 新建箱子奖励
#[derive(Debug, Clone)]
pub struct NewCaseReward {
    pub case_id: i64,
    pub kind: RewardKind,
    pub probability: f64,
    pub badge_id: Option<i64>,
    pub auk_value: Option<i64>,
}
