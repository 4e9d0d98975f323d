//! Job Registry Port - 生成任务管理
//!
//! 定义任务登记与排队的抽象接口，具体实现在 infrastructure/memory 层

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{ChatTarget, Prompt, RequestId};

/// Job Registry 错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(RequestId),

    #[error("Job queue closed")]
    QueueClosed,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// 排队中
    Queued,
    /// 正在生成
    Generating,
    /// 正在上传
    Delivering,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Generating => "generating",
            JobState::Delivering => "delivering",
        }
    }
}

/// 生成任务
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub request_id: RequestId,
    pub target: ChatTarget,
    pub prompt: Prompt,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
}

impl GenerationJob {
    pub fn new(target: ChatTarget, prompt: Prompt) -> Self {
        Self {
            request_id: RequestId::new(),
            target,
            prompt,
            state: JobState::Queued,
            created_at: Utc::now(),
        }
    }
}

/// Job Registry Port
///
/// 任务只在处理期间登记，结束后移除
#[async_trait]
pub trait JobRegistryPort: Send + Sync {
    /// 登记并入队；队列满时等待
    async fn submit(&self, job: GenerationJob) -> Result<RequestId, JobError>;

    /// 获取任务
    fn get(&self, request_id: RequestId) -> Option<GenerationJob>;

    /// 设置任务状态
    fn set_state(&self, request_id: RequestId, state: JobState) -> Result<(), JobError>;

    /// 结束任务并移除登记
    fn finish(&self, request_id: RequestId) -> Option<GenerationJob>;

    /// 尚未结束的任务数
    fn in_flight(&self) -> usize;
}
