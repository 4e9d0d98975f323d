//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod chat_transport;
mod job_registry;
mod output_storage;
mod video_encoder;
mod video_model;

pub use chat_transport::{ChatTransportPort, TransportError};
pub use job_registry::{GenerationJob, JobError, JobRegistryPort, JobState};
pub use output_storage::{OutputStorageError, OutputStoragePort};
pub use video_encoder::{EncodeError, EncodeResult, VideoEncoderPort};
pub use video_model::{ModelError, ModelLoaderPort, VideoModelPort};
