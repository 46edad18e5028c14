//! 经济系统枚举类型
//!
//! 同时支持数据库（sqlx）和 JSON（serde）序列化，存储与传输均为小写字符串

use serde::{Deserialize, Serialize};

/// 商店商品类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ItemKind {
    /// 徽章 - 购买后永久持有并自动佩戴
    Badge,
    /// VIP - 可重复购买的一次性效果，从不计为"已拥有"
    Vip,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Badge => "badge",
            Self::Vip => "vip",
        }
    }
}

/// 箱子奖励类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum RewardKind {
    /// 徽章 - 使用时不消耗
    Badge,
    /// 拍卖额度 - 提交拍品后消耗
    Auk,
    /// 聊天 VIP - 授予成功后消耗
    Vip,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Badge => "badge",
            Self::Auk => "auk",
            Self::Vip => "vip",
        }
    }

    /// 使用后是否消耗库存条目
    pub fn is_consumable(&self) -> bool {
        matches!(self, Self::Auk | Self::Vip)
    }
}
