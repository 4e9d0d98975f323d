//! Generation Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("张量形状无效: {0}")]
    InvalidShape(String),

    #[error("张量数据长度不匹配: 期望 {expected} 个样本, 实际 {actual} 个")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("不支持的通道数: {0}")]
    UnsupportedChannels(usize),

    #[error("不支持的数据类型: {0}")]
    UnsupportedDtype(String),
}
