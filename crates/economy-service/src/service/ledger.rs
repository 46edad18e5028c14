//! 余额账本服务

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{EconomyError, Result};
use crate::repository::LedgerRepositoryTrait;

#[derive(Clone)]
pub struct LedgerService {
    repo: Arc<dyn LedgerRepositoryTrait>,
}

impl LedgerService {
    pub fn new(repo: Arc<dyn LedgerRepositoryTrait>) -> Self {
        Self { repo }
    }

    pub async fn get_balance(&self, user_id: i64) -> Result<i64> {
        self.repo
            .get_balance(user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))
    }

    /// 余额加 delta（可为负）
    ///
    /// 不检查结果是否为负，供积分发放等外部入口使用；消费一律走 `debit`
    #[instrument(skip(self))]
    pub async fn adjust(&self, user_id: i64, delta: i64) -> Result<i64> {
        let balance = self.repo.adjust(user_id, delta).await?;
        info!(user_id, delta, balance, "余额已调整");
        Ok(balance)
    }

    /// 余额充足时扣款
    pub async fn debit(&self, user_id: i64, amount: i64) -> Result<i64> {
        if amount < 0 {
            return Err(EconomyError::Validation(format!("扣款金额不能为负: {}", amount)));
        }
        self.repo.debit(user_id, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockLedgerRepositoryTrait;

    #[tokio::test]
    async fn test_get_balance_unknown_user() {
        let mut repo = MockLedgerRepositoryTrait::new();
        repo.expect_get_balance().returning(|_| Ok(None));

        let ledger = LedgerService::new(Arc::new(repo));
        let err = ledger.get_balance(42).await.unwrap_err();
        assert!(matches!(err, EconomyError::UserNotFound(42)));
    }

    #[tokio::test]
    async fn test_negative_debit_rejected_without_store_call() {
        let mut repo = MockLedgerRepositoryTrait::new();
        repo.expect_debit().never();

        let ledger = LedgerService::new(Arc::new(repo));
        let err = ledger.debit(1, -5).await.unwrap_err();
        assert!(matches!(err, EconomyError::Validation(_)));
    }

    #[tokio::test]
    async fn test_adjust_passes_delta_through() {
        let mut repo = MockLedgerRepositoryTrait::new();
        repo.expect_adjust()
            .withf(|user_id, delta| *user_id == 7 && *delta == 25)
            .times(1)
            .returning(|_, _| Ok(125));

        let ledger = LedgerService::new(Arc::new(repo));
        assert_eq!(ledger.adjust(7, 25).await.unwrap(), 125);
    }
}
