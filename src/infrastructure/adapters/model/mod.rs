//! Model Adapter - 文生视频模型实现

mod fake_video_model;
mod hf_video_model;

pub use fake_video_model::{FakeModelLoader, FakeVideoModel, FakeVideoModelConfig};
pub use hf_video_model::*;
