//! 经济系统领域模型
//!
//! 用户余额、商品目录、箱子奖励与库存条目

pub mod catalog;
pub mod enums;
pub mod user;

pub use catalog::{Badge, Case, CaseReward, NewCase, NewCaseReward, RewardView, ShopItem};
pub use enums::{ItemKind, RewardKind};
pub use user::{AuctionSubmission, InventoryEntry, User, UserNotification};
