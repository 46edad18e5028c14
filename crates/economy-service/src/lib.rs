//! 虚拟经济与奖励分配服务
//!
//! 用户以积分购买商品、开启概率箱子、使用库存物品。
//!
//! ## 核心功能
//!
//! - **账本**：用户积分余额，扣款不会产生负余额
//! - **目录**：徽章、商店商品、箱子及其奖励表
//! - **抽奖**：按累计概率从箱子奖励表中选出奖励
//! - **库存**：开箱所得奖励的持有记录
//! - **特权网关**：通过 Twitch Helix API 授予或撤销频道 VIP
//! - **经济引擎**：购买、开箱、使用物品、佩戴徽章等用例编排
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层（PostgreSQL 与内存实现）
//! - `service`: 业务服务层
//! - `gateway`: 外部特权网关
//! - `notification`: 站内通知
//! - `handlers` / `routes`: HTTP 接口

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod notification;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{EconomyError, Result};
pub use gateway::{GatewayError, PrivilegeGateway, TwitchGateway};
pub use models::*;
pub use notification::NotificationSender;
pub use repository::{EconomyRepositories, MemoryEconomyStore};
pub use response::ApiResponse;
pub use service::{
    CatalogService, EconomyService, InventoryService, LedgerService, RewardSelector, dto,
};
pub use state::AppState;
