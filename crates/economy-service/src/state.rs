//! 应用状态
//!
//! axum 路由共享的状态，通过 Arc 在 handler 间共享

use std::sync::Arc;

use crate::service::EconomyService;

#[derive(Clone)]
pub struct AppState {
    pub economy: Arc<EconomyService>,
}

impl AppState {
    pub fn new(economy: Arc<EconomyService>) -> Self {
        Self { economy }
    }
}
