//! Fake Video Model - 无需 GPU 的本地模型
//!
//! 按提示词生成确定性的渐变测试图案，用于联调和测试

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ModelError, ModelLoaderPort, VideoModelPort};
use crate::domain::{Prompt, TensorShape, VideoTensor};

/// Fake Video Model 配置
#[derive(Debug, Clone)]
pub struct FakeVideoModelConfig {
    /// 模型标识
    pub model_id: String,
    /// 帧数
    pub frames: usize,
    /// 帧高
    pub height: usize,
    /// 帧宽
    pub width: usize,
    /// 模拟推理延迟（毫秒）
    pub delay_ms: u64,
}

impl Default for FakeVideoModelConfig {
    fn default() -> Self {
        Self {
            model_id: "fake/gradient".to_string(),
            frames: 48,
            height: 256,
            width: 256,
            delay_ms: 200,
        }
    }
}

impl FakeVideoModelConfig {
    /// 测试用的最小尺寸
    pub fn tiny() -> Self {
        Self {
            frames: 2,
            height: 2,
            width: 2,
            delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Fake Video Model
pub struct FakeVideoModel {
    config: FakeVideoModelConfig,
    /// 设置后每次推理都返回该错误信息
    failure: Option<String>,
}

impl FakeVideoModel {
    pub fn new(config: FakeVideoModelConfig) -> Self {
        tracing::info!(
            model = %config.model_id,
            frames = config.frames,
            height = config.height,
            width = config.width,
            "FakeVideoModel initialized"
        );
        Self {
            config,
            failure: None,
        }
    }

    /// 总是失败的模型
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            config: FakeVideoModelConfig::tiny(),
            failure: Some(message.into()),
        }
    }

    /// 提示词决定的种子，使不同提示词得到不同画面
    fn seed(prompt: &Prompt) -> u8 {
        prompt
            .as_str()
            .bytes()
            .fold(0u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b))
    }
}

#[async_trait]
impl VideoModelPort for FakeVideoModel {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    async fn infer(&self, prompt: &Prompt) -> Result<VideoTensor, ModelError> {
        tracing::debug!(
            prompt_len = prompt.as_str().len(),
            "FakeVideoModel: generating gradient"
        );

        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        if let Some(message) = &self.failure {
            return Err(ModelError::ServiceError(message.clone()));
        }

        let FakeVideoModelConfig {
            frames,
            height,
            width,
            ..
        } = self.config;
        let shape = TensorShape::new(frames, 3, height, width);
        let seed = Self::seed(prompt);

        // 通道优先写入
        let mut data = Vec::with_capacity(shape.sample_count().unwrap_or_default());
        for t in 0..frames {
            for c in 0..3 {
                for y in 0..height {
                    for x in 0..width {
                        let v = (x + y + t * 4 + c * 85) as u8;
                        data.push(v.wrapping_add(seed));
                    }
                }
            }
        }

        VideoTensor::from_u8(shape, data).map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }
}

/// Fake 模型加载器，忽略凭据
pub struct FakeModelLoader {
    config: FakeVideoModelConfig,
}

impl FakeModelLoader {
    pub fn new(config: FakeVideoModelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoaderPort for FakeModelLoader {
    async fn load(
        &self,
        _hf_token: &str,
        model_id: &str,
    ) -> Result<Arc<dyn VideoModelPort>, ModelError> {
        let config = self.config.clone().with_model_id(model_id);
        Ok(Arc::new(FakeVideoModel::new(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_infer_shape_matches_config() {
        let model = FakeVideoModel::new(FakeVideoModelConfig::tiny());
        let tensor = model.infer(&Prompt::new("x").unwrap()).await.unwrap();
        assert_eq!(tensor.shape(), TensorShape::new(2, 3, 2, 2));
    }

    #[tokio::test]
    async fn test_different_prompts_differ() {
        let model = FakeVideoModel::new(FakeVideoModelConfig::tiny());
        let a = model.infer(&Prompt::new("cat").unwrap()).await.unwrap();
        let b = model.infer(&Prompt::new("dog").unwrap()).await.unwrap();
        assert_ne!(
            a.into_frames().unwrap().as_bytes(),
            b.into_frames().unwrap().as_bytes()
        );
    }

    #[tokio::test]
    async fn test_failing_model() {
        let model = FakeVideoModel::failing("boom");
        let err = model.infer(&Prompt::new("x").unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_loader_uses_requested_model_id() {
        let loader = FakeModelLoader::new(FakeVideoModelConfig::tiny());
        let model = loader.load("ignored", "org/model").await.unwrap();
        assert_eq!(model.model_id(), "org/model");
    }
}
