//! Chat Command Handlers

use std::sync::Arc;

use crate::application::commands::chat_commands::*;
use crate::application::error::BotError;
use crate::application::ports::{ChatTransportPort, GenerationJob, JobRegistryPort};
use crate::domain::ChatTarget;

/// Start Handler - 回复欢迎语
pub struct StartHandler {
    transport: Arc<dyn ChatTransportPort>,
    welcome_text: String,
}

impl StartHandler {
    pub fn new(transport: Arc<dyn ChatTransportPort>, welcome_text: impl Into<String>) -> Self {
        Self {
            transport,
            welcome_text: welcome_text.into(),
        }
    }

    pub async fn handle(&self, cmd: StartCommand) -> Result<(), BotError> {
        tracing::info!(chat = %cmd.target, "Received /start command");
        self.transport
            .send_text(&cmd.target, &self.welcome_text)
            .await
            .map_err(BotError::delivery)
    }
}

/// SubmitPrompt Handler - 确认收到并把生成任务交给后台 Worker
///
/// 回复确认后立即返回，轮询循环不会被推理阻塞
pub struct SubmitPromptHandler {
    transport: Arc<dyn ChatTransportPort>,
    jobs: Arc<dyn JobRegistryPort>,
    processing_text: String,
    error_prefix: String,
}

impl SubmitPromptHandler {
    pub fn new(
        transport: Arc<dyn ChatTransportPort>,
        jobs: Arc<dyn JobRegistryPort>,
        processing_text: impl Into<String>,
        error_prefix: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            jobs,
            processing_text: processing_text.into(),
            error_prefix: error_prefix.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitPromptCommand,
    ) -> Result<SubmitPromptResponse, BotError> {
        tracing::info!(
            chat = %cmd.target,
            prompt_chars = cmd.prompt.char_len(),
            "Received prompt"
        );

        // 确认消息失败不影响后续处理
        if let Err(e) = self
            .transport
            .send_text(&cmd.target, &self.processing_text)
            .await
        {
            tracing::warn!(chat_id = cmd.target.chat_id, error = %e, "Failed to send acknowledgement");
        }

        let job = GenerationJob::new(cmd.target.clone(), cmd.prompt);
        match self.jobs.submit(job).await {
            Ok(request_id) => {
                tracing::debug!(
                    request_id = %request_id,
                    chat_id = cmd.target.chat_id,
                    queued = self.jobs.in_flight(),
                    "Generation job queued"
                );
                Ok(SubmitPromptResponse { request_id })
            }
            Err(e) => {
                let err = BotError::from(e);
                tracing::error!(chat_id = cmd.target.chat_id, error = %err, "Failed to queue generation job");
                if let Err(send_err) = self
                    .transport
                    .send_text(&cmd.target, &err.user_message(&self.error_prefix))
                    .await
                {
                    tracing::warn!(chat_id = cmd.target.chat_id, error = %send_err, "Failed to send error reply");
                }
                Err(err)
            }
        }
    }

    /// 关闭期间未能入队的提示词：回复一条错误消息
    pub async fn reject_on_shutdown(&self, target: &ChatTarget) {
        let err = BotError::inference("bot is shutting down");
        tracing::info!(chat = %target, "Prompt dropped on shutdown");
        if let Err(e) = self
            .transport
            .send_text(target, &err.user_message(&self.error_prefix))
            .await
        {
            tracing::warn!(chat_id = target.chat_id, error = %e, "Failed to send error reply");
        }
    }
}
