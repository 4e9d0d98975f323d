//! Generation Service - 推理适配
//!
//! 调用模型句柄，把通道优先张量重排为帧优先布局，再编码到请求独占的输出路径

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::application::error::BotError;
use crate::application::ports::{OutputStoragePort, VideoEncoderPort, VideoModelPort};
use crate::domain::{Prompt, RequestId};

/// 视频生成服务
pub struct GenerationService {
    model: Arc<dyn VideoModelPort>,
    encoder: Arc<dyn VideoEncoderPort>,
    storage: Arc<dyn OutputStoragePort>,
}

impl GenerationService {
    pub fn new(
        model: Arc<dyn VideoModelPort>,
        encoder: Arc<dyn VideoEncoderPort>,
        storage: Arc<dyn OutputStoragePort>,
    ) -> Self {
        Self {
            model,
            encoder,
            storage,
        }
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// 生成视频，返回输出文件路径
    ///
    /// 推理错误归为 `InferenceFailed`，重排与编码错误归为 `EncodeFailed`
    pub async fn generate(
        &self,
        request_id: RequestId,
        prompt: &Prompt,
    ) -> Result<PathBuf, BotError> {
        let started = Instant::now();

        tracing::info!(
            request_id = %request_id,
            model = %self.model.model_id(),
            prompt_chars = prompt.char_len(),
            "Starting video inference"
        );

        let tensor = self.model.infer(prompt).await.map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Video inference failed");
            BotError::inference(e)
        })?;

        let shape = tensor.shape();
        tracing::debug!(
            request_id = %request_id,
            shape = %shape,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Inference returned tensor"
        );

        let frames = tensor.into_frames().map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Tensor reorder failed");
            BotError::encode(e)
        })?;

        let path = self.storage.prepare(request_id).await.map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Failed to prepare output path");
            BotError::encode(e)
        })?;

        let result = match self.encoder.encode(&frames, &path).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    path = %path.display(),
                    error = %e,
                    "Video encoding failed"
                );
                if let Err(release_err) = self.storage.release(&path).await {
                    tracing::warn!(
                        request_id = %request_id,
                        error = %release_err,
                        "Failed to remove partial output"
                    );
                }
                return Err(BotError::encode(e));
            }
        };

        tracing::info!(
            request_id = %request_id,
            path = %result.path.display(),
            frames = frames.frames(),
            fps = self.encoder.fps(),
            duration_ms = result.duration_ms,
            size_bytes = result.size_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Video generated"
        );

        Ok(result.path)
    }
}
