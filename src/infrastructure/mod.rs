//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod memory;
pub mod polling;
pub mod worker;

pub use memory::InMemoryJobRegistry;
pub use polling::{BotDispatcher, DispatcherConfig};
pub use worker::{GenerationWorker, GenerationWorkerConfig, WorkerContext};
