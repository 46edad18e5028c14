//! 用户级互斥
//!
//! 同一用户的变更用例在进程内串行执行，不同用户互不阻塞。
//! 跨进程的一致性仍由数据库事务中的行锁保证。
//!
//! 锁只在有人持有或等待时留在表中，最后一个 guard 释放后即移除。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<i64, Arc<Mutex<()>>>;

#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<LockTable>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取用户锁，guard 释放前同一用户的其他调用会等待
    pub async fn acquire(&self, user_id: i64) -> UserLockGuard {
        // 先克隆出 Arc 再 await，避免持有 DashMap 分片锁跨越 await
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        UserLockGuard {
            user_id,
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// 当前登记的用户锁数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// 用户锁守卫，drop 时释放锁并清理无人等待的表项
pub struct UserLockGuard {
    user_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // guard 自身持有一份 Arc，先释放再计数
        drop(self.guard.take());
        // 只剩表中这一份引用时说明没有等待者；remove_if 持有分片写锁，与 acquire 的 entry 互斥
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let locks = UserLocks::new();
        let guard = locks.acquire(1).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire(1).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let locks = UserLocks::new();
        let _first = locks.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entries_removed_after_release() {
        let locks = UserLocks::new();
        for user_id in 0..1000 {
            let _guard = locks.acquire(user_id).await;
        }
        assert!(locks.is_empty());

        let first = locks.acquire(7).await;
        let second = locks.acquire(8).await;
        assert_eq!(locks.len(), 2);
        drop(first);
        assert_eq!(locks.len(), 1);
        drop(second);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_kept_while_waiter_pending() {
        let locks = UserLocks::new();
        let guard = locks.acquire(1).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire(1).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // 等待者仍持有表项的引用，释放后表项保留给它
        drop(guard);
        assert_eq!(locks.len(), 1);

        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }
}
