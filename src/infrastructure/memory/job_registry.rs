//! In-Memory Job Registry Implementation

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{GenerationJob, JobError, JobRegistryPort, JobState};
use crate::domain::RequestId;

/// 内存任务登记表
pub struct InMemoryJobRegistry {
    /// request_id -> GenerationJob
    jobs: DashMap<RequestId, GenerationJob>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<RequestId>,
}

impl InMemoryJobRegistry {
    pub fn new(queue_sender: mpsc::Sender<RequestId>) -> Self {
        Self {
            jobs: DashMap::new(),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl JobRegistryPort for InMemoryJobRegistry {
    async fn submit(&self, job: GenerationJob) -> Result<RequestId, JobError> {
        let request_id = job.request_id;

        // 队列满时在此等待，形成背压；拿到槽位后才登记，等待期间被取消不会残留任务
        let permit = match self.queue_sender.reserve().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!(request_id = %request_id, "Job queue closed, dropping job");
                return Err(JobError::QueueClosed);
            }
        };

        self.jobs.insert(request_id, job);
        permit.send(request_id);

        Ok(request_id)
    }

    fn get(&self, request_id: RequestId) -> Option<GenerationJob> {
        self.jobs.get(&request_id).map(|j| j.clone())
    }

    fn set_state(&self, request_id: RequestId, state: JobState) -> Result<(), JobError> {
        let mut job = self
            .jobs
            .get_mut(&request_id)
            .ok_or(JobError::NotFound(request_id))?;

        let old_state = job.state;
        job.state = state;

        tracing::debug!(
            request_id = %request_id,
            old_state = old_state.as_str(),
            new_state = state.as_str(),
            "Job state changed"
        );
        Ok(())
    }

    fn finish(&self, request_id: RequestId) -> Option<GenerationJob> {
        self.jobs.remove(&request_id).map(|(_, job)| job)
    }

    fn in_flight(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatTarget, Prompt};

    fn job() -> GenerationJob {
        GenerationJob::new(ChatTarget::new(1), Prompt::new("a tree").unwrap())
    }

    #[tokio::test]
    async fn test_submit_registers_and_enqueues() {
        let (tx, mut rx) = mpsc::channel(2);
        let registry = InMemoryJobRegistry::new(tx);

        let id = registry.submit(job()).await.unwrap();

        assert_eq!(rx.recv().await, Some(id));
        assert_eq!(registry.get(id).unwrap().state, JobState::Queued);
        assert_eq!(registry.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_state_transitions_and_finish() {
        let (tx, _rx) = mpsc::channel(2);
        let registry = InMemoryJobRegistry::new(tx);
        let id = registry.submit(job()).await.unwrap();

        registry.set_state(id, JobState::Generating).unwrap();
        assert_eq!(registry.get(id).unwrap().state, JobState::Generating);

        let finished = registry.finish(id).unwrap();
        assert_eq!(finished.request_id, id);
        assert_eq!(registry.in_flight(), 0);
        assert!(matches!(
            registry.set_state(id, JobState::Delivering),
            Err(JobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_submit_on_full_queue_leaves_nothing_behind() {
        let (tx, _rx) = mpsc::channel(1);
        let registry = InMemoryJobRegistry::new(tx);
        registry.submit(job()).await.unwrap();

        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            registry.submit(job()),
        )
        .await;

        assert!(blocked.is_err());
        assert_eq!(registry.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_closed_queue_unregisters_job() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let registry = InMemoryJobRegistry::new(tx);

        let result = registry.submit(job()).await;
        assert!(matches!(result, Err(JobError::QueueClosed)));
        assert_eq!(registry.in_flight(), 0);
    }
}
