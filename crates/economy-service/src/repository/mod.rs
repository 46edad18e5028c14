//! 数据访问层
//!
//! - 仓储只负责持久化，不包含业务逻辑
//! - 跨表一致性由 `EconomyTransactions` 在单个事务内保证
//! - 所有服务依赖 trait，PostgreSQL 与内存实现可互换

mod catalog_repo;
mod inventory_repo;
mod ledger_repo;
mod memory;
mod notification_repo;
mod token_repo;
mod traits;
mod transactions;
mod user_repo;

use std::sync::Arc;

use sqlx::PgPool;

pub use catalog_repo::CatalogRepository;
pub use inventory_repo::InventoryRepository;
pub use ledger_repo::LedgerRepository;
pub use memory::MemoryEconomyStore;
pub use notification_repo::NotificationRepository;
pub use token_repo::TokenRepository;
pub use traits::*;
pub use transactions::EconomyTransactions;
pub use user_repo::UserRepository;

/// 服务层所需的全部仓储
#[derive(Clone)]
pub struct EconomyRepositories {
    pub users: Arc<dyn UserRepositoryTrait>,
    pub ledger: Arc<dyn LedgerRepositoryTrait>,
    pub catalog: Arc<dyn CatalogRepositoryTrait>,
    pub inventory: Arc<dyn InventoryRepositoryTrait>,
    pub transactions: Arc<dyn EconomyTransactionsTrait>,
    pub notifications: Arc<dyn NotificationRepositoryTrait>,
    pub tokens: Arc<dyn TokenRepositoryTrait>,
}

impl EconomyRepositories {
    /// 基于 PostgreSQL 连接池组装
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            ledger: Arc::new(LedgerRepository::new(pool.clone())),
            catalog: Arc::new(CatalogRepository::new(pool.clone())),
            inventory: Arc::new(InventoryRepository::new(pool.clone())),
            transactions: Arc::new(EconomyTransactions::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            tokens: Arc::new(TokenRepository::new(pool)),
        }
    }
}
