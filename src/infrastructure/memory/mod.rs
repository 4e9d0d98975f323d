//! In-Memory Implementations
//!
//! 进程内状态：生成任务登记与排队

mod job_registry;

pub use job_registry::InMemoryJobRegistry;
