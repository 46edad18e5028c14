//! 商品目录服务
//!
//! 查询商店商品、箱子与奖励，并将奖励载荷解析为可展示的标题和图片。
//! 管理端的上架操作也在这里完成校验。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use super::dto::{
    AddCaseRewardRequest, CreateBadgeItemRequest, CreateCaseRequest, CreateVipItemRequest,
    ShopItemView,
};
use crate::error::{EconomyError, Result};
use crate::models::{
    Badge, Case, CaseReward, ItemKind, NewCase, NewCaseReward, RewardKind, RewardView, ShopItem,
};
use crate::repository::{CatalogRepositoryTrait, InventoryRepositoryTrait};

pub const AUK_REWARD_IMAGE: &str = "/static/img/auk.png";
pub const VIP_REWARD_IMAGE: &str = "/static/img/vip.png";
pub const VIP_REWARD_TITLE: &str = "聊天 VIP 身份";

/// 同一箱子奖励概率总和允许的浮点误差
const PROBABILITY_EPSILON: f64 = 1e-9;

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepositoryTrait>,
    inventory: Arc<dyn InventoryRepositoryTrait>,
}

impl CatalogService {
    pub fn new(
        catalog: Arc<dyn CatalogRepositoryTrait>,
        inventory: Arc<dyn InventoryRepositoryTrait>,
    ) -> Self {
        Self { catalog, inventory }
    }

    // ==================== 查询操作 ====================

    pub async fn get_shop_item(&self, item_id: i64) -> Result<ShopItem> {
        self.catalog
            .get_shop_item(item_id)
            .await?
            .ok_or(EconomyError::ShopItemNotFound(item_id))
    }

    /// 商店商品列表，徽章按购买记录标记 owned，VIP 永远不是 owned
    pub async fn list_shop_items(&self, user_id: i64) -> Result<Vec<ShopItemView>> {
        let items = self.catalog.list_shop_items().await?;
        let purchased: HashSet<i64> = self
            .inventory
            .list_purchased_item_ids(user_id)
            .await?
            .into_iter()
            .collect();

        Ok(items
            .into_iter()
            .map(|item| {
                let owned = item.kind == ItemKind::Badge && purchased.contains(&item.id);
                ShopItemView { item, owned }
            })
            .collect())
    }

    pub async fn get_badge(&self, badge_id: i64) -> Result<Badge> {
        self.catalog
            .get_badge(badge_id)
            .await?
            .ok_or(EconomyError::BadgeNotFound(badge_id))
    }

    pub async fn list_badges(&self) -> Result<Vec<Badge>> {
        self.catalog.list_badges().await
    }

    pub async fn get_case(&self, case_id: i64) -> Result<Case> {
        self.catalog
            .get_case(case_id)
            .await?
            .ok_or(EconomyError::CaseNotFound(case_id))
    }

    pub async fn list_cases(&self) -> Result<Vec<Case>> {
        self.catalog.list_cases().await
    }

    /// 箱子的原始奖励列表（登记顺序）
    pub async fn case_rewards(&self, case_id: i64) -> Result<Vec<CaseReward>> {
        self.catalog.list_case_rewards(case_id).await
    }

    pub async fn get_case_reward(&self, reward_id: i64) -> Result<CaseReward> {
        self.catalog
            .get_case_reward(reward_id)
            .await?
            .ok_or(EconomyError::RewardNotFound(reward_id))
    }

    /// 箱子奖励列表，附带展示信息
    pub async fn list_case_rewards(&self, case_id: i64) -> Result<Vec<RewardView>> {
        self.get_case(case_id).await?;

        let rewards = self.catalog.list_case_rewards(case_id).await?;
        let mut views = Vec::with_capacity(rewards.len());
        for reward in rewards {
            views.push(self.resolve_reward(reward).await?);
        }
        Ok(views)
    }

    /// 根据载荷解析奖励标题和图片
    pub async fn resolve_reward(&self, reward: CaseReward) -> Result<RewardView> {
        let (title, image) = match reward.kind {
            RewardKind::Badge => {
                let badge_id = reward.badge_id.ok_or_else(|| {
                    EconomyError::Internal(format!("徽章奖励缺少 badge_id: reward_id={}", reward.id))
                })?;
                let badge = self.get_badge(badge_id).await?;
                (format!("徽章「{}」", badge.title), badge.image)
            }
            RewardKind::Auk => (
                format!("{} 卢布拍卖额度", reward.auk_value.unwrap_or_default()),
                AUK_REWARD_IMAGE.to_string(),
            ),
            RewardKind::Vip => (VIP_REWARD_TITLE.to_string(), VIP_REWARD_IMAGE.to_string()),
        };

        Ok(RewardView {
            reward,
            title,
            image,
        })
    }

    // ==================== 管理操作 ====================

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_badge_item(&self, request: CreateBadgeItemRequest) -> Result<ShopItem> {
        request
            .validate()
            .map_err(|e| EconomyError::Validation(e.to_string()))?;

        let item = self
            .catalog
            .create_badge_item(&request.image, &request.title, request.cost)
            .await?;

        info!(item_id = item.id, badge_id = ?item.badge_id, "徽章商品已上架");
        Ok(item)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_vip_item(&self, request: CreateVipItemRequest) -> Result<ShopItem> {
        request
            .validate()
            .map_err(|e| EconomyError::Validation(e.to_string()))?;

        let item = self
            .catalog
            .create_vip_item(&request.title, request.cost, &request.image)
            .await?;

        info!(item_id = item.id, "VIP 商品已上架");
        Ok(item)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_case(&self, request: CreateCaseRequest) -> Result<Case> {
        request
            .validate()
            .map_err(|e| EconomyError::Validation(e.to_string()))?;

        let case = self
            .catalog
            .create_case(&NewCase {
                title: request.title,
                description: request.description,
                price: request.price,
                image: request.image,
            })
            .await?;

        info!(case_id = case.id, "箱子已创建");
        Ok(case)
    }

    /// 为箱子追加奖励
    ///
    /// 拒绝使箱子概率总和超过 1 的奖励
    #[instrument(skip(self, request), fields(kind = ?request.kind))]
    pub async fn add_case_reward(
        &self,
        case_id: i64,
        request: AddCaseRewardRequest,
    ) -> Result<CaseReward> {
        self.get_case(case_id).await?;

        let probability = request.probability;
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(EconomyError::Validation(format!(
                "概率必须在 (0, 1] 区间: {}",
                probability
            )));
        }

        let (badge_id, auk_value) = match request.kind {
            RewardKind::Badge => {
                let badge_id = request
                    .badge_id
                    .ok_or_else(|| EconomyError::Validation("徽章奖励必须指定 badgeId".to_string()))?;
                self.get_badge(badge_id).await?;
                (Some(badge_id), None)
            }
            RewardKind::Auk => match request.auk_value {
                Some(value) if value > 0 => (None, Some(value)),
                _ => {
                    return Err(EconomyError::Validation(
                        "拍卖额度奖励的 aukValue 必须为正数".to_string(),
                    ));
                }
            },
            RewardKind::Vip => (None, None),
        };

        let existing: f64 = self
            .catalog
            .list_case_rewards(case_id)
            .await?
            .iter()
            .map(|r| r.probability)
            .sum();
        if existing + probability > 1.0 + PROBABILITY_EPSILON {
            return Err(EconomyError::Validation(format!(
                "箱子奖励概率总和不能超过 1: 当前 {}, 新增 {}",
                existing, probability
            )));
        }

        let reward = self
            .catalog
            .add_case_reward(&NewCaseReward {
                case_id,
                kind: request.kind,
                probability,
                badge_id,
                auk_value,
            })
            .await?;

        info!(case_id, reward_id = reward.id, probability, "箱子奖励已添加");
        Ok(reward)
    }
}
