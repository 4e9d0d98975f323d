//! Telegram Bot Client - 调用 Telegram Bot HTTP API
//!
//! 实现 ChatTransportPort trait
//!
//! Bot API:
//! POST {api_url}/bot{token}/getUpdates   长轮询
//! POST {api_url}/bot{token}/sendMessage  文本回复
//! POST {api_url}/bot{token}/sendVideo    multipart 上传视频
//!
//! 请求 URL 含 token，不写入日志

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

use super::types::{ApiResponse, GetUpdatesRequest, SendMessageRequest, SentMessage, Update};
use crate::application::ports::{ChatTransportPort, TransportError};
use crate::domain::{ChatTarget, ChatUpdate};

/// Telegram 客户端配置
#[derive(Clone)]
pub struct TelegramBotClientConfig {
    /// Bot API 基础 URL
    pub api_url: String,
    /// Bot token
    pub token: String,
    /// 长轮询超时（秒）
    pub poll_timeout_secs: u64,
    /// 上传视频超时（秒）
    pub upload_timeout_secs: u64,
}

impl TelegramBotClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            token: token.into(),
            poll_timeout_secs: 30,
            upload_timeout_secs: 300,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl std::fmt::Debug for TelegramBotClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBotClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .finish()
    }
}

/// Telegram Bot 客户端
pub struct TelegramBotClient {
    client: Client,
    config: TelegramBotClientConfig,
}

impl TelegramBotClient {
    /// 创建新的客户端
    pub fn new(config: TelegramBotClientConfig) -> Result<Self, TransportError> {
        // 超时按请求设置：长轮询与上传的时长差别很大
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取方法 URL
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.token,
            method
        )
    }

    /// 发送请求并解包 `ApiResponse`
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request.send().await.map_err(map_request_error)?;
        let status = response.status();

        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            TransportError::InvalidResponse(format!("{} (HTTP {}): {}", method, status, e))
        })?;

        unwrap_response(method, body)
    }
}

#[async_trait]
impl ChatTransportPort for TelegramBotClient {
    async fn poll_updates(&self, offset: Option<i64>) -> Result<Vec<ChatUpdate>, TransportError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: self.config.poll_timeout_secs,
            allowed_updates: vec!["message"],
        };

        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&body)
            .timeout(Duration::from_secs(self.config.poll_timeout_secs + 10));

        let updates: Vec<Update> = self.call("getUpdates", request).await?;

        if !updates.is_empty() {
            tracing::debug!(count = updates.len(), offset = ?offset, "Received updates");
        }

        Ok(updates.into_iter().map(Update::into_chat_update).collect())
    }

    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<(), TransportError> {
        let body = SendMessageRequest {
            chat_id: target.chat_id,
            text,
        };

        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .timeout(Duration::from_secs(30));

        let _: SentMessage = self.call("sendMessage", request).await?;
        tracing::debug!(chat_id = target.chat_id, "Text message sent");
        Ok(())
    }

    async fn send_video(&self, target: &ChatTarget, path: &Path) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TransportError::IoError(format!("{}: {}", path.display(), e)))?;
        let size = bytes.len();

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        let form = Form::new()
            .text("chat_id", target.chat_id.to_string())
            .text("supports_streaming", "true")
            .part("video", part);

        let request = self
            .client
            .post(self.method_url("sendVideo"))
            .multipart(form)
            .timeout(Duration::from_secs(self.config.upload_timeout_secs));

        let _: SentMessage = self.call("sendVideo", request).await?;

        tracing::info!(
            chat = %target,
            size_bytes = size,
            "Video sent to user"
        );
        Ok(())
    }
}

fn map_request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        // reqwest 错误信息包含 URL（含 token），去掉
        TransportError::NetworkError(e.without_url().to_string())
    }
}

/// 解包 Bot API 响应；401/404 表示 token 无效
fn unwrap_response<T>(method: &str, body: ApiResponse<T>) -> Result<T, TransportError> {
    if body.ok {
        return body.result.ok_or_else(|| {
            TransportError::InvalidResponse(format!("{}: ok response without result", method))
        });
    }

    let code = body.error_code.unwrap_or_default();
    let description = body
        .description
        .unwrap_or_else(|| "unknown error".to_string());

    Err(match code {
        401 | 404 => TransportError::Unauthorized(description),
        _ => TransportError::ApiError { code, description },
    })
}
