//! 应用层错误定义
//!
//! 面向用户的错误只渲染类别文本，`detail` 只写入日志

use thiserror::Error;

use crate::application::ports::{
    EncodeError, JobError, ModelError, OutputStorageError, TransportError,
};
use crate::domain::MediaError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum BotError {
    /// 缺少必需配置（凭据等）
    #[error("missing required configuration: {key}")]
    Configuration { key: String },

    /// 模型无法认证或加载
    #[error("model {model} is unavailable: {detail}")]
    ModelUnavailable { model: String, detail: String },

    /// 模型推理失败
    #[error("video generation failed")]
    InferenceFailed { detail: String },

    /// 张量转换或封装失败
    #[error("video encoding failed")]
    EncodeFailed { detail: String },

    /// 结果投递失败
    #[error("could not deliver the video")]
    DeliveryFailed { detail: String },
}

impl BotError {
    /// 创建配置错误
    pub fn configuration(key: impl Into<String>) -> Self {
        Self::Configuration { key: key.into() }
    }

    /// 创建模型不可用错误
    pub fn model_unavailable(model: impl Into<String>, detail: impl ToString) -> Self {
        Self::ModelUnavailable {
            model: model.into(),
            detail: detail.to_string(),
        }
    }

    /// 创建推理失败错误
    pub fn inference(detail: impl ToString) -> Self {
        Self::InferenceFailed {
            detail: detail.to_string(),
        }
    }

    /// 创建编码失败错误
    pub fn encode(detail: impl ToString) -> Self {
        Self::EncodeFailed {
            detail: detail.to_string(),
        }
    }

    /// 创建投递失败错误
    pub fn delivery(detail: impl ToString) -> Self {
        Self::DeliveryFailed {
            detail: detail.to_string(),
        }
    }

    /// 错误类别（日志字段）
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::Configuration { .. } => "configuration",
            BotError::ModelUnavailable { .. } => "model_unavailable",
            BotError::InferenceFailed { .. } => "inference_failed",
            BotError::EncodeFailed { .. } => "encode_failed",
            BotError::DeliveryFailed { .. } => "delivery_failed",
        }
    }

    /// 内部细节，不对用户展示
    pub fn detail(&self) -> Option<&str> {
        match self {
            BotError::Configuration { .. } => None,
            BotError::ModelUnavailable { detail, .. }
            | BotError::InferenceFailed { detail }
            | BotError::EncodeFailed { detail }
            | BotError::DeliveryFailed { detail } => Some(detail),
        }
    }

    /// 发送给用户的错误回复
    pub fn user_message(&self, prefix: &str) -> String {
        format!("{}: {}", prefix, self)
    }
}

impl From<ModelError> for BotError {
    fn from(err: ModelError) -> Self {
        Self::inference(err)
    }
}

impl From<MediaError> for BotError {
    fn from(err: MediaError) -> Self {
        Self::encode(err)
    }
}

impl From<EncodeError> for BotError {
    fn from(err: EncodeError) -> Self {
        Self::encode(err)
    }
}

impl From<OutputStorageError> for BotError {
    fn from(err: OutputStorageError) -> Self {
        Self::encode(err)
    }
}

impl From<TransportError> for BotError {
    fn from(err: TransportError) -> Self {
        Self::delivery(err)
    }
}

impl From<JobError> for BotError {
    fn from(err: JobError) -> Self {
        Self::inference(err)
    }
}
