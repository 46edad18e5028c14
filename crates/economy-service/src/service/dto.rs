//! 服务层请求与响应 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{AuctionSubmission, Case, ItemKind, RewardKind, RewardView, ShopItem};

// ==================== 响应 ====================

/// 商店商品及当前用户的持有状态
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItemView {
    #[serde(flatten)]
    pub item: ShopItem,
    /// 仅徽章可能为 true；VIP 为可重复购买的效果
    pub owned: bool,
}

/// 商店总览
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOverview {
    pub balance: i64,
    pub items: Vec<ShopItemView>,
    pub cases: Vec<Case>,
}

/// 购买结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    pub item_id: i64,
    pub kind: ItemKind,
    pub balance: i64,
    /// 徽章购买后自动佩戴的徽章
    pub equipped_badge_id: Option<i64>,
}

/// 开箱结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCaseResult {
    pub entry_id: i64,
    pub reward: RewardView,
    pub balance: i64,
}

/// 使用库存物品的结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyOutcome {
    /// VIP 已授予，库存条目已消耗
    VipGranted,
    /// 拍卖额度已提交，库存条目已消耗
    AuctionSubmitted { submission: AuctionSubmission },
    /// 徽章已佩戴，库存条目保留
    BadgeEquipped {
        #[serde(rename = "badgeId")]
        badge_id: i64,
    },
}

// ==================== 管理端请求 ====================

/// 上架徽章
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBadgeItemRequest {
    #[validate(length(min = 1, message = "徽章图片不能为空"))]
    pub image: String,
    #[validate(length(min = 1, max = 100, message = "标题长度必须在1-100个字符之间"))]
    pub title: String,
    #[validate(range(min = 0, message = "价格不能为负"))]
    pub cost: i64,
}

/// 上架 VIP 商品
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVipItemRequest {
    #[validate(length(min = 1, max = 100, message = "标题长度必须在1-100个字符之间"))]
    pub title: String,
    #[validate(range(min = 0, message = "价格不能为负"))]
    pub cost: i64,
    #[serde(default)]
    pub image: String,
}

/// 创建箱子
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    #[validate(length(min = 1, max = 100, message = "标题长度必须在1-100个字符之间"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0, message = "价格不能为负"))]
    pub price: i64,
    #[serde(default)]
    pub image: String,
}

/// 为箱子添加奖励
///
/// 概率与载荷的组合校验在服务层完成
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCaseRewardRequest {
    pub kind: RewardKind,
    pub probability: f64,
    pub badge_id: Option<i64>,
    pub auk_value: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_badge_item_validation() {
        let request = CreateBadgeItemRequest {
            image: "/static/badges/star.png".to_string(),
            title: String::new(),
            cost: 10,
        };
        assert!(request.validate().is_err());

        let request = CreateBadgeItemRequest {
            title: "星星".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let request = CreateCaseRequest {
            title: "新手箱".to_string(),
            description: String::new(),
            price: -1,
            image: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_apply_outcome_serialization() {
        let json = serde_json::to_value(ApplyOutcome::BadgeEquipped { badge_id: 3 }).unwrap();
        assert_eq!(json["type"], "BADGE_EQUIPPED");
        assert_eq!(json["badgeId"], 3);

        let json = serde_json::to_value(ApplyOutcome::VipGranted).unwrap();
        assert_eq!(json["type"], "VIP_GRANTED");
    }
}
