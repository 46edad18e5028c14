//! 业务服务层
//!
//! - `LedgerService`：余额查询与扣款
//! - `CatalogService`：商品、箱子与奖励查询，管理端上架
//! - `RewardSelector`：累积概率抽奖
//! - `InventoryService`：库存发放、查询与消耗
//! - `EconomyService`：购买、开箱、使用物品等用例编排

pub mod catalog;
pub mod dto;
mod economy_service;
pub mod inventory;
pub mod ledger;
pub mod selector;
mod user_lock;

pub use catalog::CatalogService;
pub use economy_service::EconomyService;
pub use inventory::InventoryService;
pub use ledger::LedgerService;
pub use selector::{DrawSource, FixedDraw, RewardSelector, ThreadRngSource, select};
pub use user_lock::{UserLockGuard, UserLocks};
