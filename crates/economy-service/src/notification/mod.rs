//! 用户通知
//!
//! 开箱中奖、VIP 生效等事件的站内通知

mod sender;

pub use sender::{INVENTORY_LINK, NotificationSender};
