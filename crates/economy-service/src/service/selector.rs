//! 奖励抽取
//!
//! 累积概率抽取：按登记顺序累加概率，第一个满足 `r <= cum` 的奖励胜出。
//! 概率总和小于 1 时，落在总和之后的抽样值表示"未抽中"。

use std::sync::Arc;

use rand::Rng;

use crate::models::CaseReward;

/// 在给定抽样值下选出奖励
///
/// 纯函数，相同输入总是得到相同结果。`draw` 应位于 [0, 1)。
pub fn select(rewards: &[CaseReward], draw: f64) -> Option<&CaseReward> {
    let mut cumulative = 0.0;
    for reward in rewards {
        cumulative += reward.probability;
        if draw <= cumulative {
            return Some(reward);
        }
    }
    None
}

/// 随机数来源
pub trait DrawSource: Send + Sync {
    /// 返回 [0, 1) 内的均匀分布值
    fn draw(&self) -> f64;
}

/// 线程本地随机数生成器
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl DrawSource for ThreadRngSource {
    fn draw(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// 固定抽样值，用于测试
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl DrawSource for FixedDraw {
    fn draw(&self) -> f64 {
        self.0
    }
}

/// 奖励抽取器
#[derive(Clone)]
pub struct RewardSelector {
    source: Arc<dyn DrawSource>,
}

impl RewardSelector {
    pub fn new(source: Arc<dyn DrawSource>) -> Self {
        Self { source }
    }

    /// 使用线程随机数
    pub fn random() -> Self {
        Self::new(Arc::new(ThreadRngSource))
    }

    /// 抽取一次；`None` 表示未抽中
    pub fn pick<'a>(&self, rewards: &'a [CaseReward]) -> Option<&'a CaseReward> {
        select(rewards, self.source.draw())
    }
}

impl Default for RewardSelector {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RewardKind;

    fn reward(id: i64, probability: f64) -> CaseReward {
        CaseReward {
            id,
            case_id: 1,
            kind: RewardKind::Auk,
            probability,
            badge_id: None,
            auk_value: Some(100),
        }
    }

    fn rewards() -> Vec<CaseReward> {
        vec![reward(1, 0.1), reward(2, 0.2), reward(3, 0.3)]
    }

    #[test]
    fn test_select_first() {
        let rewards = rewards();
        assert_eq!(select(&rewards, 0.05).map(|r| r.id), Some(1));
    }

    #[test]
    fn test_select_second() {
        let rewards = rewards();
        assert_eq!(select(&rewards, 0.25).map(|r| r.id), Some(2));
    }

    #[test]
    fn test_select_past_total_is_none() {
        let rewards = rewards();
        assert!(select(&rewards, 0.95).is_none());
    }

    #[test]
    fn test_boundary_belongs_to_earlier_reward() {
        let rewards = vec![reward(1, 0.5), reward(2, 0.5)];
        assert_eq!(select(&rewards, 0.5).map(|r| r.id), Some(1));
        assert_eq!(select(&rewards, 0.0).map(|r| r.id), Some(1));
    }

    #[test]
    fn test_empty_rewards() {
        assert!(select(&[], 0.0).is_none());
    }

    #[test]
    fn test_selector_uses_injected_draw() {
        let rewards = rewards();
        let selector = RewardSelector::new(Arc::new(FixedDraw(0.55)));
        assert_eq!(selector.pick(&rewards).map(|r| r.id), Some(3));
    }

    #[test]
    fn test_thread_rng_in_range() {
        let source = ThreadRngSource;
        for _ in 0..1000 {
            let value = source.draw();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
