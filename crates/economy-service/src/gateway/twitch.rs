//! Twitch VIP 网关
//!
//! 每次特权调用都先用存储的 refresh token 换取新的 access token（不在进程内缓存），
//! 再按 login 查询用户 ID，最后调用 channels/vips 接口。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use economy_shared::config::TwitchConfig;
use economy_shared::observability::metrics::record_gateway_call;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{GatewayError, PrivilegeGateway};
use crate::repository::TokenRepositoryTrait;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    data: Vec<TwitchUser>,
}

#[derive(Debug, Deserialize)]
struct TwitchUser {
    id: String,
}

/// 基于 Twitch Helix API 的特权网关
pub struct TwitchGateway {
    client: reqwest::Client,
    config: TwitchConfig,
    tokens: Arc<dyn TokenRepositoryTrait>,
}

impl TwitchGateway {
    /// 创建网关，`config.timeout_ms` 作用于每一次 HTTP 往返
    pub fn new(
        config: TwitchConfig,
        tokens: Arc<dyn TokenRepositoryTrait>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// 用 refresh token 换取新的 access token，并持久化轮换后的凭证
    #[instrument(skip(self))]
    async fn refresh_access_token(&self) -> Result<String, GatewayError> {
        let refresh_token = self
            .tokens
            .get_refresh_token()
            .await
            .map_err(|e| GatewayError::Token(e.to_string()))?
            .ok_or_else(|| GatewayError::Token("未配置 refresh token".to_string()))?;

        let response = self
            .client
            .post(format!("{}/token", self.config.auth_base_url))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            warn!(status = status.as_u16(), "refresh token 已失效");
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            return Err(upstream(response).await);
        }

        let token: TokenResponse = response.json().await?;

        self.tokens
            .save_tokens(&token.access_token, &token.refresh_token)
            .await
            .map_err(|e| GatewayError::Token(e.to_string()))?;

        Ok(token.access_token)
    }

    /// 按 login 查询 Twitch 用户 ID
    async fn user_id_by_login(&self, access_token: &str, login: &str) -> Result<String, GatewayError> {
        let response = self
            .client
            .get(format!("{}/users", self.config.api_base_url))
            .query(&[("login", login)])
            .bearer_auth(access_token)
            .header("Client-Id", &self.config.client_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(GatewayError::Unauthorized),
            _ => return Err(upstream(response).await),
        }

        let users: UsersResponse = response.json().await?;
        users
            .data
            .into_iter()
            .next()
            .map(|u| u.id)
            .ok_or_else(|| GatewayError::UserNotFound(login.to_string()))
    }

    async fn change_vip(&self, method: Method, login: &str) -> Result<(), GatewayError> {
        let access_token = self.refresh_access_token().await?;
        let user_id = self.user_id_by_login(&access_token, login).await?;

        let response = self
            .client
            .request(method, format!("{}/channels/vips", self.config.api_base_url))
            .query(&[
                ("broadcaster_id", self.config.broadcaster_id.as_str()),
                ("user_id", user_id.as_str()),
            ])
            .bearer_auth(&access_token)
            .header("Client-Id", &self.config.client_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            // 已是 VIP / 本就不是 VIP，按幂等成功处理
            StatusCode::UNPROCESSABLE_ENTITY => {
                info!(login = %login, "VIP 状态已是目标状态");
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
            StatusCode::NOT_FOUND => Err(GatewayError::UserNotFound(login.to_string())),
            _ => Err(upstream(response).await),
        }
    }

    async fn timed(&self, op: &'static str, method: Method, login: &str) -> Result<(), GatewayError> {
        let start = Instant::now();
        let result = self.change_vip(method, login).await;
        let outcome = match &result {
            Ok(()) => "success",
            Err(e) => e.label(),
        };
        record_gateway_call(op, outcome, start.elapsed().as_secs_f64());
        result
    }
}

async fn upstream(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Upstream { status, body }
}

#[async_trait]
impl PrivilegeGateway for TwitchGateway {
    #[instrument(skip(self))]
    async fn grant_vip(&self, login: &str) -> Result<(), GatewayError> {
        self.timed("grant_vip", Method::POST, login).await?;
        info!(login = %login, "VIP 授予成功");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_vip(&self, login: &str) -> Result<(), GatewayError> {
        self.timed("revoke_vip", Method::DELETE, login).await?;
        info!(login = %login, "VIP 撤销成功");
        Ok(())
    }
}
