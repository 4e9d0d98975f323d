//! Output Storage Port - 输出文件存储
//!
//! 每个请求一个独立路径，并发请求之间互不覆盖

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::RequestId;

/// 输出存储错误
#[derive(Debug, Error)]
pub enum OutputStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Output Storage Port
#[async_trait]
pub trait OutputStoragePort: Send + Sync {
    /// 请求对应的输出路径
    fn output_path(&self, request_id: RequestId) -> PathBuf;

    /// 准备输出路径（确保目录存在），返回路径
    async fn prepare(&self, request_id: RequestId) -> Result<PathBuf, OutputStorageError>;

    /// 释放输出文件；文件不存在时视为成功
    async fn release(&self, path: &Path) -> Result<(), OutputStorageError>;
}
