//! HF Video Model - 调用远程推理服务的文生视频模型
//!
//! 实现 ModelLoaderPort 与 VideoModelPort
//!
//! 启动时:
//! GET {hub_url}/api/whoami-v2          (Bearer HF_TOKEN，认证)
//! GET {hub_url}/api/models/{model_id}  (解析模型)
//!
//! 推理:
//! POST {inference_url}/api/video/infer
//! Request: {"model": "...", "prompt": "..."}  (JSON)
//! Response: 原始张量字节，形状与类型在 headers 中

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ModelError, ModelLoaderPort, VideoModelPort};
use crate::domain::{Prompt, SampleType, TensorShape, VideoTensor};

const SHAPE_HEADER: &str = "x-video-shape";
const DTYPE_HEADER: &str = "x-video-dtype";

/// 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct VideoInferRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// whoami-v2 响应（只取用户名）
#[derive(Debug, Deserialize)]
struct WhoAmI {
    name: String,
}

/// 模型信息响应
#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
    #[serde(default)]
    sha: Option<String>,
}

/// HF 模型配置
#[derive(Debug, Clone)]
pub struct HfVideoModelConfig {
    /// 模型仓库地址
    pub hub_url: String,
    /// 推理服务基础 URL
    pub inference_url: String,
    /// 推理超时（秒），0 表示不限制
    pub timeout_secs: u64,
}

impl Default for HfVideoModelConfig {
    fn default() -> Self {
        Self {
            hub_url: "https://huggingface.co".to_string(),
            inference_url: "http://localhost:8000".to_string(),
            timeout_secs: 0,
        }
    }
}

impl HfVideoModelConfig {
    pub fn new(inference_url: impl Into<String>) -> Self {
        Self {
            inference_url: inference_url.into(),
            ..Default::default()
        }
    }

    pub fn with_hub_url(mut self, hub_url: impl Into<String>) -> Self {
        self.hub_url = hub_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 模型加载器
pub struct HfModelLoader {
    client: Client,
    config: HfVideoModelConfig,
}

impl HfModelLoader {
    pub fn new(config: HfVideoModelConfig) -> Result<Self, ModelError> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| ModelError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn whoami_url(&self) -> String {
        format!("{}/api/whoami-v2", self.config.hub_url.trim_end_matches('/'))
    }

    fn model_info_url(&self, model_id: &str) -> String {
        format!(
            "{}/api/models/{}",
            self.config.hub_url.trim_end_matches('/'),
            model_id
        )
    }
}

#[async_trait]
impl ModelLoaderPort for HfModelLoader {
    async fn load(
        &self,
        hf_token: &str,
        model_id: &str,
    ) -> Result<Arc<dyn VideoModelPort>, ModelError> {
        // 1. 认证
        let response = self
            .client
            .get(self.whoami_url())
            .bearer_auth(hf_token)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(map_request_error)?;
        let response = check_status(response, model_id).await?;
        let who: WhoAmI = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("whoami: {}", e)))?;
        tracing::info!(user = %who.name, "Authenticated to model hub");

        // 2. 解析模型
        let response = self
            .client
            .get(self.model_info_url(model_id))
            .bearer_auth(hf_token)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(map_request_error)?;
        let response = check_status(response, model_id).await?;
        let info: ModelInfo = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("model info: {}", e)))?;
        tracing::info!(model = %info.id, revision = ?info.sha, "Model resolved");

        let model = HfVideoModel {
            client: self.client.clone(),
            inference_url: self.config.inference_url.trim_end_matches('/').to_string(),
            model_id: info.id,
            token: hf_token.to_string(),
        };

        // 3. 推理服务可能仍在预热，只记录警告
        if !model.health_check().await {
            tracing::warn!(
                url = %model.inference_url,
                "Inference service health check failed, continuing"
            );
        }

        Ok(Arc::new(model))
    }
}

/// 已加载的模型句柄
pub struct HfVideoModel {
    client: Client,
    inference_url: String,
    model_id: String,
    token: String,
}

impl HfVideoModel {
    fn infer_url(&self) -> String {
        format!("{}/api/video/infer", self.inference_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.inference_url)
    }
}

#[async_trait]
impl VideoModelPort for HfVideoModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn infer(&self, prompt: &Prompt) -> Result<VideoTensor, ModelError> {
        let body = VideoInferRequest {
            model: &self.model_id,
            prompt: prompt.as_str(),
        };

        tracing::debug!(
            url = %self.infer_url(),
            model = %self.model_id,
            prompt_len = prompt.as_str().len(),
            "Sending video infer request"
        );

        let response = self
            .client
            .post(self.infer_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;

        let response = check_status(response, &self.model_id).await?;
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to read tensor: {}", e)))?;

        let tensor = tensor_from_response(&headers, &bytes)?;

        tracing::info!(
            model = %self.model_id,
            shape = %tensor.shape(),
            size = bytes.len(),
            "Video inference completed"
        );

        Ok(tensor)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn map_request_error(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout
    } else if e.is_connect() {
        ModelError::NetworkError(format!("Cannot connect to model service: {}", e))
    } else {
        ModelError::NetworkError(e.to_string())
    }
}

async fn check_status(response: Response, model_id: &str) -> Result<Response, ModelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => ModelError::Unauthorized(format!("HTTP {}: {}", status, error_text)),
        404 => ModelError::NotFound(model_id.to_string()),
        _ => ModelError::ServiceError(format!("HTTP {}: {}", status, error_text)),
    })
}

/// 从响应头和响应体构造张量；缺少类型头时按 uint8 处理
fn tensor_from_response(headers: &HeaderMap, body: &[u8]) -> Result<VideoTensor, ModelError> {
    let shape: TensorShape = headers
        .get(SHAPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ModelError::InvalidResponse(format!("missing {} header", SHAPE_HEADER)))?
        .parse()
        .map_err(|e| ModelError::InvalidResponse(format!("{}", e)))?;

    let dtype = match headers.get(DTYPE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(value) => value
            .parse::<SampleType>()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?,
        None => SampleType::U8,
    };

    VideoTensor::from_le_bytes(shape, dtype, body)
        .map_err(|e| ModelError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_config_builder() {
        let config = HfVideoModelConfig::new("http://gpu:9000")
            .with_hub_url("http://hub.local")
            .with_timeout(600);
        assert_eq!(config.inference_url, "http://gpu:9000");
        assert_eq!(config.hub_url, "http://hub.local");
        assert_eq!(config.timeout_secs, 600);
    }

    #[test]
    fn test_default_config_has_no_timeout() {
        assert_eq!(HfVideoModelConfig::default().timeout_secs, 0);
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let loader =
            HfModelLoader::new(HfVideoModelConfig::default().with_hub_url("http://hub.local/"))
                .unwrap();
        assert_eq!(loader.whoami_url(), "http://hub.local/api/whoami-v2");
        assert_eq!(
            loader.model_info_url("VideoCrafter/VideoCrafter2"),
            "http://hub.local/api/models/VideoCrafter/VideoCrafter2"
        );
    }

    #[test]
    fn test_tensor_from_response_uint8_default() {
        let mut headers = HeaderMap::new();
        headers.insert(SHAPE_HEADER, HeaderValue::from_static("2,1,1,2"));

        let tensor = tensor_from_response(&headers, &[1, 2, 3, 4]).unwrap();
        assert_eq!(tensor.shape(), TensorShape::new(2, 1, 1, 2));
    }

    #[test]
    fn test_tensor_from_response_float32() {
        let mut headers = HeaderMap::new();
        headers.insert(SHAPE_HEADER, HeaderValue::from_static("1,1,1,2"));
        headers.insert(DTYPE_HEADER, HeaderValue::from_static("float32"));
        let mut body = Vec::new();
        body.extend_from_slice(&0.0f32.to_le_bytes());
        body.extend_from_slice(&1.0f32.to_le_bytes());

        let frames = tensor_from_response(&headers, &body)
            .unwrap()
            .into_frames()
            .unwrap();
        assert_eq!(frames.as_bytes(), &[0, 255]);
    }

    #[test]
    fn test_tensor_from_response_requires_shape() {
        let headers = HeaderMap::new();
        let result = tensor_from_response(&headers, &[0; 4]);
        assert!(matches!(result, Err(ModelError::InvalidResponse(_))));
    }

    #[test]
    fn test_tensor_from_response_rejects_overflowing_shape() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SHAPE_HEADER,
            HeaderValue::from_static("4294967296,3,4294967296,1"),
        );
        let result = tensor_from_response(&headers, &[0; 12]);
        assert!(matches!(result, Err(ModelError::InvalidResponse(_))));
    }

    #[test]
    fn test_tensor_from_response_rejects_short_body() {
        let mut headers = HeaderMap::new();
        headers.insert(SHAPE_HEADER, HeaderValue::from_static("1,3,2,2"));
        let result = tensor_from_response(&headers, &[0; 5]);
        assert!(matches!(result, Err(ModelError::InvalidResponse(_))));
    }
}
