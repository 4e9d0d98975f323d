//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（VideoModel、VideoEncoder、ChatTransport、OutputStorage、JobRegistry）
//! - commands: 聊天命令及处理器
//! - services: 视频生成服务
//! - bootstrap: 启动时凭据校验与模型加载
//! - error: 应用层错误定义

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod ports;
pub mod services;

// Re-exports
pub use bootstrap::{bootstrap, Bootstrapped};

pub use commands::{
    handlers::{StartHandler, SubmitPromptHandler},
    StartCommand, SubmitPromptCommand, SubmitPromptResponse,
};

pub use error::BotError;

pub use ports::{
    // Chat transport
    ChatTransportPort,
    TransportError,
    // Job registry
    GenerationJob,
    JobError,
    JobRegistryPort,
    JobState,
    // Output storage
    OutputStorageError,
    OutputStoragePort,
    // Video encoder
    EncodeError,
    EncodeResult,
    VideoEncoderPort,
    // Video model
    ModelError,
    ModelLoaderPort,
    VideoModelPort,
};

pub use services::GenerationService;
