//! Worker Layer - Background Task Processing
//!
//! 实现 GenerationWorker，在轮询循环之外执行视频生成与投递

mod generation_worker;

pub use generation_worker::{GenerationWorker, GenerationWorkerConfig, WorkerContext};
