//! HTTP 处理器

pub mod admin;
pub mod case;
pub mod extract;
pub mod inventory;
pub mod shop;

pub use extract::{CurrentUser, USER_ID_HEADER};
