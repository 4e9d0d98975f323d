//! Chat Transport Port - 聊天传输抽象
//!
//! 拉取入站更新、发送文本与视频回复

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::{ChatTarget, ChatUpdate};

/// 传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error {code}: {description}")]
    ApiError { code: i32, description: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl TransportError {
    /// 不可恢复的错误（凭据无效），轮询循环应终止
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Unauthorized(_))
    }
}

/// Chat Transport Port
#[async_trait]
pub trait ChatTransportPort: Send + Sync {
    /// 长轮询入站更新
    ///
    /// `offset` 为下一条未确认更新的序号；传入后，序号更小的更新视为已处理
    async fn poll_updates(&self, offset: Option<i64>) -> Result<Vec<ChatUpdate>, TransportError>;

    /// 发送文本消息
    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<(), TransportError>;

    /// 以视频附件形式上传文件
    async fn send_video(&self, target: &ChatTarget, path: &Path) -> Result<(), TransportError>;
}
