//! 应用服务
//!
//! 跨端口编排的用例：提示词 → 张量 → 视频文件

mod generation_service;

pub use generation_service::GenerationService;
