//! Generation Context - 视频生成限界上下文
//!
//! 职责:
//! - 提示词与请求标识
//! - 模型输出张量（通道优先）到帧优先布局的转换

mod errors;
mod media;
mod value_objects;

pub use errors::MediaError;
pub use media::{FrameBuffer, SampleType, TensorShape, VideoTensor};
pub use value_objects::{Prompt, RequestId};
