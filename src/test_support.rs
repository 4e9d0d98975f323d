//! 测试替身：记录型传输、内存编码器、计数模型加载器

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{
    ChatTransportPort, EncodeError, EncodeResult, ModelError, ModelLoaderPort, TransportError,
    VideoEncoderPort, VideoModelPort,
};
use crate::domain::{ChatTarget, ChatUpdate, FrameBuffer};
use crate::infrastructure::adapters::{FakeVideoModel, FakeVideoModelConfig};

/// 已发送的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text { chat_id: i64, text: String },
    Video { chat_id: i64, content: Vec<u8> },
}

/// 记录所有出站消息，并按脚本返回轮询结果
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Outbound>>,
    script: Mutex<VecDeque<Result<Vec<ChatUpdate>, TransportError>>>,
    offsets: Mutex<Vec<Option<i64>>>,
    fail_text: bool,
    fail_video: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次返回的轮询结果；脚本耗尽后返回致命错误
    pub fn with_script(self, script: Vec<Result<Vec<ChatUpdate>, TransportError>>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    pub fn fail_text_sends(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub fn fail_video_sends(mut self) -> Self {
        self.fail_video = true;
        self
    }

    pub fn outbound(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self, chat_id: i64) -> Vec<String> {
        self.outbound()
            .into_iter()
            .filter_map(|m| match m {
                Outbound::Text { chat_id: id, text } if id == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn videos(&self, chat_id: i64) -> Vec<Vec<u8>> {
        self.outbound()
            .into_iter()
            .filter_map(|m| match m {
                Outbound::Video {
                    chat_id: id,
                    content,
                } if id == chat_id => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn video_count(&self, chat_id: i64) -> usize {
        self.videos(chat_id).len()
    }

    /// 以 `{prefix}: ` 开头的文本数
    pub fn error_count(&self, chat_id: i64, prefix: &str) -> usize {
        let marker = format!("{}: ", prefix);
        self.texts(chat_id)
            .iter()
            .filter(|t| t.starts_with(&marker))
            .count()
    }

    /// 每次轮询传入的 offset
    pub fn offsets(&self) -> Vec<Option<i64>> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransportPort for RecordingTransport {
    async fn poll_updates(&self, offset: Option<i64>) -> Result<Vec<ChatUpdate>, TransportError> {
        self.offsets.lock().unwrap().push(offset);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unauthorized("script exhausted".to_string())))
    }

    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<(), TransportError> {
        if self.fail_text {
            return Err(TransportError::NetworkError("text send disabled".to_string()));
        }
        self.sent.lock().unwrap().push(Outbound::Text {
            chat_id: target.chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_video(&self, target: &ChatTarget, path: &Path) -> Result<(), TransportError> {
        if self.fail_video {
            return Err(TransportError::NetworkError("video send disabled".to_string()));
        }
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| TransportError::IoError(e.to_string()))?;
        self.sent.lock().unwrap().push(Outbound::Video {
            chat_id: target.chat_id,
            content,
        });
        Ok(())
    }
}

/// 把原始帧直接写入输出文件的编码器
pub struct FakeEncoder {
    fail: bool,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// 写入部分数据后失败
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl VideoEncoderPort for FakeEncoder {
    async fn encode(
        &self,
        frames: &FrameBuffer,
        output: &Path,
    ) -> Result<EncodeResult, EncodeError> {
        if self.fail {
            tokio::fs::write(output, b"partial")
                .await
                .map_err(|e| EncodeError::IoError(e.to_string()))?;
            return Err(EncodeError::ExecutionFailed {
                exit_code: Some(1),
                stderr: "encoder crashed".to_string(),
            });
        }

        tokio::fs::write(output, frames.as_bytes())
            .await
            .map_err(|e| EncodeError::IoError(e.to_string()))?;

        Ok(EncodeResult {
            path: output.to_path_buf(),
            size_bytes: frames.as_bytes().len() as u64,
            duration_ms: frames.duration_ms(self.fps()),
        })
    }

    fn fps(&self) -> u32 {
        30
    }
}

/// 记录调用次数的模型加载器
pub struct CountingModelLoader {
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
    fail: bool,
}

impl CountingModelLoader {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelLoaderPort for CountingModelLoader {
    async fn load(
        &self,
        hf_token: &str,
        model_id: &str,
    ) -> Result<Arc<dyn VideoModelPort>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(hf_token.to_string());

        if self.fail {
            return Err(ModelError::Unauthorized("invalid token".to_string()));
        }

        Ok(Arc::new(FakeVideoModel::new(
            FakeVideoModelConfig::tiny().with_model_id(model_id),
        )))
    }
}
