//! Video Encoder Port - 视频封装抽象
//!
//! 将帧优先的原始像素编码为可播放的容器文件

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::FrameBuffer;

/// 编码错误
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Encoder binary not found: {0}")]
    NotFound(String),

    #[error("Encoder failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 编码结果
#[derive(Debug, Clone)]
pub struct EncodeResult {
    /// 输出文件路径
    pub path: PathBuf,
    /// 文件大小（字节）
    pub size_bytes: u64,
    /// 时长（毫秒）
    pub duration_ms: u64,
}

/// Video Encoder Port
#[async_trait]
pub trait VideoEncoderPort: Send + Sync {
    /// 编码全部帧到 `output`，已存在的文件会被覆盖
    async fn encode(&self, frames: &FrameBuffer, output: &Path)
        -> Result<EncodeResult, EncodeError>;

    /// 输出帧率
    fn fps(&self) -> u32;
}
