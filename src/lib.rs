//! Vidbot - Telegram 文生视频机器人
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Generation Context: 提示词、视频张量、帧缓冲
//! - Chat Context: 聊天目标与入站事件
//!
//! 应用层 (application/):
//! - Ports: 端口定义（VideoModel, VideoEncoder, ChatTransport, OutputStorage, JobRegistry）
//! - Commands: `/start` 与提示词处理器
//! - Services: 生成流水线（推理 → 编码 → 落盘）
//! - Bootstrap: 凭据校验与模型加载
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HF 模型客户端, ffmpeg 编码器, Telegram Bot API, 文件存储
//! - Memory: JobRegistry 内存实现
//! - Polling: 长轮询分发
//! - Worker: GenerationWorker 后台任务处理

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{load_config, AppConfig};
