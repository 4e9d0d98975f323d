//! Generation Worker - Background Video Generation

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::error::BotError;
use crate::application::ports::{
    ChatTransportPort, GenerationJob, JobRegistryPort, JobState, OutputStoragePort,
};
use crate::application::services::GenerationService;
use crate::domain::RequestId;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GenerationWorkerConfig {
    /// 最大并发生成数
    pub max_concurrent: usize,
    /// 错误回复前缀
    pub error_prefix: String,
    /// 投递后是否保留输出文件
    pub keep_outputs: bool,
}

impl Default for GenerationWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            error_prefix: "An error occurred while generating the video".to_string(),
            keep_outputs: false,
        }
    }
}

/// 单个任务处理所需的依赖
#[derive(Clone)]
pub struct WorkerContext {
    pub jobs: Arc<dyn JobRegistryPort>,
    pub generation: Arc<GenerationService>,
    pub transport: Arc<dyn ChatTransportPort>,
    pub storage: Arc<dyn OutputStoragePort>,
}

/// 生成 Worker
///
/// 从队列消费任务：生成视频 → 上传；任一步失败则回复一条错误消息
pub struct GenerationWorker {
    config: GenerationWorkerConfig,
    queue_receiver: mpsc::Receiver<RequestId>,
    context: WorkerContext,
}

impl GenerationWorker {
    pub fn new(
        config: GenerationWorkerConfig,
        queue_receiver: mpsc::Receiver<RequestId>,
        context: WorkerContext,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            context,
        }
    }

    /// 运行直到 `shutdown` 完成或队列关闭
    ///
    /// 停止后不再启动新任务：队列中尚未开始的任务各回复一条错误消息，
    /// 然后等待进行中的任务结束
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            model = %self.context.generation.model_id(),
            "GenerationWorker started"
        );

        // 使用 semaphore 控制并发；先拿到 permit 再出队，出队的任务立即开始
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let config = Arc::new(self.config.clone());
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("GenerationWorker received shutdown signal");
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::error!("Semaphore closed");
                        break;
                    }
                },
            };

            let request_id = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("GenerationWorker received shutdown signal");
                    break;
                }
                received = self.queue_receiver.recv() => match received {
                    Some(id) => id,
                    None => break,
                },
            };

            let context = self.context.clone();
            let config = config.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process_job(request_id, &context, &config).await;
            });
        }

        // 之后的 submit 返回 QueueClosed，由提交方回复错误
        self.queue_receiver.close();
        let mut abandoned = 0usize;
        while let Ok(request_id) = self.queue_receiver.try_recv() {
            Self::abandon_job(request_id, &self.context, &self.config).await;
            abandoned += 1;
        }
        if abandoned > 0 {
            tracing::warn!(abandoned = abandoned, "Dropped queued jobs on shutdown");
        }

        let in_flight = self.context.jobs.in_flight();
        if in_flight > 0 {
            tracing::info!(in_flight = in_flight, "Waiting for in-flight jobs");
        }
        // 所有 permit 归还即表示进行中的任务都已结束
        let _ = semaphore
            .acquire_many(self.config.max_concurrent as u32)
            .await;

        tracing::info!("GenerationWorker stopped");
    }

    /// 关闭时丢弃尚未开始的任务，回复一条错误消息
    async fn abandon_job(
        request_id: RequestId,
        context: &WorkerContext,
        config: &GenerationWorkerConfig,
    ) {
        let Some(job) = context.jobs.finish(request_id) else {
            return;
        };
        let err = BotError::inference("worker shut down before the job started");
        if let Err(e) = context
            .transport
            .send_text(&job.target, &err.user_message(&config.error_prefix))
            .await
        {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to send error reply");
        }
    }

    /// 处理单个任务
    ///
    /// 对每个任务恰好发送一条视频或一条错误消息
    pub async fn process_job(
        request_id: RequestId,
        context: &WorkerContext,
        config: &GenerationWorkerConfig,
    ) {
        let job = match context.jobs.get(request_id) {
            Some(job) => job,
            None => {
                tracing::warn!(request_id = %request_id, "Job not found, skipping");
                return;
            }
        };

        tracing::info!(
            request_id = %request_id,
            chat = %job.target,
            queued_ms = (Utc::now() - job.created_at).num_milliseconds(),
            "Job started"
        );

        if let Err(e) = context.jobs.set_state(request_id, JobState::Generating) {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to update job state");
        }

        match Self::generate_and_deliver(&job, context, config).await {
            Ok(()) => {
                tracing::info!(
                    request_id = %request_id,
                    chat = %job.target,
                    "Job completed"
                );
            }
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    chat = %job.target,
                    kind = err.kind(),
                    detail = err.detail().unwrap_or_default(),
                    "Job failed"
                );
                let reply = err.user_message(&config.error_prefix);
                if let Err(e) = context.transport.send_text(&job.target, &reply).await {
                    tracing::error!(request_id = %request_id, error = %e, "Failed to send error reply");
                }
            }
        }

        context.jobs.finish(request_id);
    }

    async fn generate_and_deliver(
        job: &GenerationJob,
        context: &WorkerContext,
        config: &GenerationWorkerConfig,
    ) -> Result<(), BotError> {
        let path = context
            .generation
            .generate(job.request_id, &job.prompt)
            .await?;

        if let Err(e) = context.jobs.set_state(job.request_id, JobState::Delivering) {
            tracing::warn!(request_id = %job.request_id, error = %e, "Failed to update job state");
        }

        let delivered = context
            .transport
            .send_video(&job.target, &path)
            .await
            .map_err(|e| {
                tracing::error!(
                    request_id = %job.request_id,
                    path = %path.display(),
                    error = %e,
                    "Error sending video"
                );
                BotError::delivery(e)
            });

        if !config.keep_outputs {
            if let Err(e) = context.storage.release(&path).await {
                tracing::warn!(request_id = %job.request_id, error = %e, "Failed to remove output file");
            }
        }

        delivered
    }
}
