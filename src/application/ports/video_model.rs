//! Video Model Port - 文生视频模型抽象
//!
//! 定义模型加载与推理的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{Prompt, VideoTensor};

/// 模型错误
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Video Model Port
///
/// 进程生命周期内只加载一次的模型句柄，加载后不可变，可在任务间共享
#[async_trait]
pub trait VideoModelPort: Send + Sync {
    /// 模型标识（如 `VideoCrafter/VideoCrafter2`）
    fn model_id(&self) -> &str;

    /// 单提示词推理
    ///
    /// 返回通道优先 `(T, C, H, W)` 的视频张量。耗时可达数分钟。
    async fn infer(&self, prompt: &Prompt) -> Result<VideoTensor, ModelError>;

    /// 检查推理服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

/// Model Loader Port
///
/// 启动时使用模型仓库凭据认证并加载指定模型
#[async_trait]
pub trait ModelLoaderPort: Send + Sync {
    async fn load(
        &self,
        hf_token: &str,
        model_id: &str,
    ) -> Result<Arc<dyn VideoModelPort>, ModelError>;
}
