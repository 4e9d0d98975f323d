//! Bot Dispatcher - 长轮询循环
//!
//! 拉取更新 → 分类 → 交给对应 handler。生成任务由 Worker 异步处理，
//! 这里只做确认与入队，单条消息不会阻塞其他用户。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::handlers::{StartHandler, SubmitPromptHandler};
use crate::application::commands::{StartCommand, SubmitPromptCommand};
use crate::application::ports::{ChatTransportPort, TransportError};
use crate::domain::{ChatEvent, ChatUpdate};

/// Dispatcher 配置
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// 轮询出错后的等待时间
    pub retry_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// 更新分发器
pub struct BotDispatcher {
    config: DispatcherConfig,
    transport: Arc<dyn ChatTransportPort>,
    start_handler: StartHandler,
    submit_handler: SubmitPromptHandler,
}

impl BotDispatcher {
    pub fn new(
        config: DispatcherConfig,
        transport: Arc<dyn ChatTransportPort>,
        start_handler: StartHandler,
        submit_handler: SubmitPromptHandler,
    ) -> Self {
        Self {
            config,
            transport,
            start_handler,
            submit_handler,
        }
    }

    /// 一直运行，直到遇到致命的传输错误
    pub async fn run(self) -> Result<(), TransportError> {
        self.run_with_shutdown(std::future::pending::<()>()).await
    }

    /// 运行直到 `shutdown` 完成（返回 Ok）或遇到致命错误（返回 Err）
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), TransportError>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;

        tracing::info!("Bot dispatcher started, polling for updates");

        'poll: loop {
            let result = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.transport.poll_updates(offset) => result,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        // 先推进 offset：处理失败的更新也不会被重复投递
                        offset = Some(offset.map_or(update.update_id + 1, |o| {
                            o.max(update.update_id + 1)
                        }));

                        // 队列满时入队会等待，关闭信号不能被它挡住
                        let target = match &update.event {
                            ChatEvent::Text { target, .. } => Some(target.clone()),
                            _ => None,
                        };
                        let interrupted = tokio::select! {
                            biased;
                            _ = &mut shutdown => true,
                            _ = self.dispatch(update) => false,
                        };
                        if interrupted {
                            if let Some(target) = target {
                                self.submit_handler.reject_on_shutdown(&target).await;
                            }
                            break 'poll;
                        }
                    }
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "Fatal polling error, stopping dispatcher");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_ms = self.config.retry_delay.as_millis() as u64,
                        "Polling failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => break 'poll,
                        _ = tokio::time::sleep(self.config.retry_delay) => {}
                    }
                }
            }
        }

        tracing::info!("Bot dispatcher stopped");
        Ok(())
    }

    /// 处理单条更新；handler 的错误已回复给用户，这里只记录
    async fn dispatch(&self, update: ChatUpdate) {
        match update.event {
            ChatEvent::Start { target } => {
                if let Err(e) = self.start_handler.handle(StartCommand { target }).await {
                    tracing::warn!(update_id = update.update_id, error = %e, "Failed to handle /start");
                }
            }
            ChatEvent::Text { target, prompt } => {
                if let Err(e) = self
                    .submit_handler
                    .handle(SubmitPromptCommand { target, prompt })
                    .await
                {
                    tracing::warn!(update_id = update.update_id, error = %e, "Failed to submit prompt");
                }
            }
            ChatEvent::Ignored => {
                tracing::debug!(update_id = update.update_id, "Ignoring update");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::JobRegistryPort;
    use crate::domain::{ChatTarget, RequestId};
    use crate::infrastructure::memory::InMemoryJobRegistry;
    use crate::test_support::RecordingTransport;
    use tokio::sync::mpsc;

    fn update(update_id: i64, chat_id: i64, text: &str) -> ChatUpdate {
        ChatUpdate {
            update_id,
            event: ChatEvent::classify(ChatTarget::new(chat_id), text),
        }
    }

    struct Harness {
        transport: Arc<RecordingTransport>,
        jobs: Arc<InMemoryJobRegistry>,
        receiver: mpsc::Receiver<RequestId>,
        dispatcher: BotDispatcher,
    }

    fn harness(transport: RecordingTransport) -> Harness {
        let transport = Arc::new(transport);
        let (sender, receiver) = mpsc::channel(8);
        let jobs = InMemoryJobRegistry::new(sender).arc();

        let dispatcher = BotDispatcher::new(
            DispatcherConfig {
                retry_delay: Duration::from_millis(1),
            },
            transport.clone(),
            StartHandler::new(transport.clone(), "Welcome!"),
            SubmitPromptHandler::new(transport.clone(), jobs.clone(), "Working on it...", "Error"),
        );

        Harness {
            transport,
            jobs,
            receiver,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn test_start_replies_without_queueing() {
        let mut h = harness(RecordingTransport::new().with_script(vec![Ok(vec![update(
            1, 5, "/start",
        )])]));

        let result = h.dispatcher.run().await;

        assert!(matches!(result, Err(TransportError::Unauthorized(_))));
        assert_eq!(h.transport.texts(5), vec!["Welcome!".to_string()]);
        assert_eq!(h.jobs.in_flight(), 0);
        assert!(h.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_text_is_acknowledged_and_queued() {
        let mut h = harness(RecordingTransport::new().with_script(vec![Ok(vec![update(
            1,
            5,
            "a cat surfing a wave",
        )])]));

        let _ = h.dispatcher.run().await;

        assert_eq!(h.transport.texts(5), vec!["Working on it...".to_string()]);
        let request_id = h.receiver.try_recv().unwrap();
        let job = h.jobs.get(request_id).unwrap();
        assert_eq!(job.prompt.as_str(), "a cat surfing a wave");
        assert_eq!(job.target.chat_id, 5);
    }

    #[tokio::test]
    async fn test_unknown_commands_are_ignored() {
        let mut h = harness(
            RecordingTransport::new().with_script(vec![Ok(vec![update(1, 5, "/help")])]),
        );

        let _ = h.dispatcher.run().await;

        assert!(h.transport.outbound().is_empty());
        assert!(h.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_offset_advances_past_handled_updates() {
        let h = harness(RecordingTransport::new().with_script(vec![
            Ok(vec![update(10, 1, "/start"), update(11, 2, "/start")]),
            Ok(vec![]),
            Ok(vec![update(12, 1, "/start")]),
        ]));

        let _ = h.dispatcher.run().await;

        assert_eq!(
            h.transport.offsets(),
            vec![None, Some(12), Some(12), Some(13)]
        );
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let mut h = harness(RecordingTransport::new().with_script(vec![
            Err(TransportError::Timeout),
            Err(TransportError::ApiError {
                code: 502,
                description: "Bad Gateway".to_string(),
            }),
            Ok(vec![update(1, 5, "a red balloon")]),
        ]));

        let result = h.dispatcher.run().await;

        // 脚本耗尽后的 Unauthorized 才让循环退出
        assert!(matches!(result, Err(TransportError::Unauthorized(_))));
        assert_eq!(h.transport.offsets().len(), 4);
        assert!(h.receiver.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_dispatch_blocked_on_full_queue() {
        let transport = Arc::new(RecordingTransport::new().with_script(vec![Ok(vec![
            update(1, 5, "first prompt"),
            update(2, 6, "second prompt"),
        ])]));
        let (sender, _receiver) = mpsc::channel(1);
        let jobs = InMemoryJobRegistry::new(sender).arc();

        let dispatcher = BotDispatcher::new(
            DispatcherConfig {
                retry_delay: Duration::from_millis(1),
            },
            transport.clone(),
            StartHandler::new(transport.clone(), "Welcome!"),
            SubmitPromptHandler::new(transport.clone(), jobs.clone(), "Working on it...", "Error"),
        );

        // 第二条提示词在满队列上等待，关闭信号仍然生效
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.run_with_shutdown(tokio::time::sleep(Duration::from_millis(50))),
        )
        .await
        .expect("dispatcher stopped on shutdown");

        assert!(result.is_ok());
        assert_eq!(jobs.in_flight(), 1);
        assert_eq!(transport.texts(5), vec!["Working on it...".to_string()]);
        assert_eq!(
            transport.texts(6),
            vec![
                "Working on it...".to_string(),
                "Error: video generation failed".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let h = harness(RecordingTransport::new());

        let result = h.dispatcher.run_with_shutdown(async {}).await;

        assert!(result.is_ok());
        assert!(h.transport.offsets().is_empty());
    }
}
