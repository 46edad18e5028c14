//! 通知发送器
//!
//! 业务服务调用后立即返回，写入在后台任务中完成；
//! 发送失败只记录日志，不影响主流程。

use std::sync::Arc;

use tracing::{error, info};

use crate::error::Result;
use crate::models::{RewardView, UserNotification};
use crate::repository::NotificationRepositoryTrait;

/// 库存页面链接，通知点击后跳转
pub const INVENTORY_LINK: &str = "/inventory";

#[derive(Clone)]
pub struct NotificationSender {
    repo: Arc<dyn NotificationRepositoryTrait>,
}

impl NotificationSender {
    pub fn new(repo: Arc<dyn NotificationRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// 开箱中奖通知
    pub fn send_case_reward(&self, user_id: i64, reward: &RewardView) {
        self.send_async(UserNotification {
            user_id,
            text: format!("恭喜你从箱子中获得：{}", reward.title),
            image_url: reward.image.clone(),
            link_url: INVENTORY_LINK.to_string(),
        });
    }

    /// VIP 生效通知
    pub fn send_vip_granted(&self, user_id: i64, image_url: &str) {
        self.send_async(UserNotification {
            user_id,
            text: "你的聊天 VIP 身份已生效".to_string(),
            image_url: image_url.to_string(),
            link_url: INVENTORY_LINK.to_string(),
        });
    }

    /// 同步发送，等待写入结果
    pub async fn send_sync(&self, notification: UserNotification) -> Result<i64> {
        self.repo.create(&notification).await
    }

    /// 异步发送（fire-and-forget）
    fn send_async(&self, notification: UserNotification) {
        let repo = self.repo.clone();
        let user_id = notification.user_id;

        tokio::spawn(async move {
            match repo.create(&notification).await {
                Ok(notification_id) => {
                    info!(user_id, notification_id, "通知发送成功");
                }
                Err(e) => {
                    error!(user_id, error = %e, "通知发送失败");
                }
            }
        });
    }
}
