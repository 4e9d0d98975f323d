//! Vidbot - Telegram 文生视频机器人
//!
//! 启动顺序:
//! 1. 配置与日志
//! 2. 凭据校验 + 模型加载（失败即退出）
//! 3. 后台 GenerationWorker
//! 4. 长轮询分发，直到 Ctrl-C 或致命错误

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use vidbot::application::{
    bootstrap, GenerationService, ModelLoaderPort, StartHandler, SubmitPromptHandler,
};
use vidbot::config::{load_config, print_config, AppConfig, ModelBackend};
use vidbot::infrastructure::adapters::{
    FakeModelLoader, FakeVideoModelConfig, FfmpegEncoder, FfmpegEncoderConfig, FileOutputStorage,
    HfModelLoader, HfVideoModelConfig, TelegramBotClient, TelegramBotClientConfig,
};
use vidbot::infrastructure::memory::InMemoryJobRegistry;
use vidbot::infrastructure::polling::{BotDispatcher, DispatcherConfig};
use vidbot::infrastructure::worker::{GenerationWorker, GenerationWorkerConfig, WorkerContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 仅用于本地开发
    dotenvy::dotenv().ok();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Vidbot - Telegram 文生视频机器人");
    print_config(&config);

    // 凭据与模型
    let loader = model_loader(&config)?;
    let boot = bootstrap(|key| std::env::var(key).ok(), &*loader, &config.model.id).await?;

    // Telegram 客户端
    let telegram_config = TelegramBotClientConfig {
        api_url: config.telegram.api_url.clone(),
        token: boot.credentials.telegram_token().to_string(),
        poll_timeout_secs: config.telegram.poll_timeout_secs,
        upload_timeout_secs: config.telegram.upload_timeout_secs,
    };
    let transport = Arc::new(TelegramBotClient::new(telegram_config)?);

    // 编码器与输出目录
    let encoder = Arc::new(FfmpegEncoder::new(FfmpegEncoderConfig {
        ffmpeg_path: config.video.ffmpeg_path.clone(),
        fps: config.video.fps,
        codec: config.video.codec.clone(),
        pixel_format: config.video.pixel_format.clone(),
    }));
    let storage = Arc::new(FileOutputStorage::new(&config.storage.output_dir).await?);

    let generation = Arc::new(GenerationService::new(
        boot.model.clone(),
        encoder,
        storage.clone(),
    ));

    // 任务队列
    let (job_tx, job_rx) = mpsc::channel(config.worker.queue_capacity);
    let jobs = Arc::new(InMemoryJobRegistry::new(job_tx));

    // 启动 Worker
    let worker_config = GenerationWorkerConfig {
        max_concurrent: config.worker.max_concurrent,
        error_prefix: config.messages.error_prefix.clone(),
        keep_outputs: config.storage.keep_outputs,
    };
    let worker = GenerationWorker::new(
        worker_config,
        job_rx,
        WorkerContext {
            jobs: jobs.clone(),
            generation,
            transport: transport.clone(),
            storage,
        },
    );
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let worker_handle = tokio::spawn(worker.run_until(async move {
        let _ = stop_rx.await;
    }));

    // 轮询分发
    let dispatcher = BotDispatcher::new(
        DispatcherConfig {
            retry_delay: Duration::from_secs(config.telegram.retry_delay_secs),
        },
        transport.clone(),
        StartHandler::new(transport.clone(), config.messages.welcome.clone()),
        SubmitPromptHandler::new(
            transport,
            jobs,
            config.messages.processing.clone(),
            config.messages.error_prefix.clone(),
        ),
    );

    tracing::info!(model = %boot.model.model_id(), "Bot is running");

    let result = dispatcher
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await;

    // 等待进行中的任务
    let _ = stop_tx.send(());
    let drain = Duration::from_secs(config.worker.drain_timeout_secs);
    match tokio::time::timeout(drain, worker_handle).await {
        Ok(_) => tracing::info!("Worker drained"),
        Err(_) => tracing::warn!(
            timeout_secs = config.worker.drain_timeout_secs,
            "Worker did not finish in time, abandoning in-flight jobs"
        ),
    }

    result?;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// 初始化日志；`RUST_LOG` 优先于配置
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},vidbot={},reqwest=warn",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置选择模型后端
fn model_loader(config: &AppConfig) -> anyhow::Result<Box<dyn ModelLoaderPort>> {
    Ok(match config.model.backend {
        ModelBackend::Http => {
            let hf_config = HfVideoModelConfig::new(config.model.inference_url.clone())
                .with_hub_url(config.model.hub_url.clone())
                .with_timeout(config.model.timeout_secs);
            Box::new(HfModelLoader::new(hf_config)?)
        }
        ModelBackend::Fake => {
            tracing::warn!("Using fake model backend, videos are synthetic test patterns");
            Box::new(FakeModelLoader::new(FakeVideoModelConfig::default()))
        }
    })
}
