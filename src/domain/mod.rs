//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Generation Context: 提示词、模型输出张量与帧布局
//! - Chat Context: 聊天事件与回复目标

pub mod chat;
pub mod generation;

pub use chat::{ChatEvent, ChatTarget, ChatUpdate};
pub use generation::{FrameBuffer, MediaError, Prompt, RequestId, SampleType, TensorShape, VideoTensor};
