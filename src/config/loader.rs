//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VIDBOT_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// 凭据（`HF_TOKEN`、`TELEGRAM_TOKEN`）不经过这里，见 [`super::Credentials`]
///
/// # 环境变量示例
/// - `VIDBOT_MODEL__ID=VideoCrafter/VideoCrafter2`
/// - `VIDBOT_MODEL__INFERENCE_URL=http://gpu-box:8000`
/// - `VIDBOT_VIDEO__FPS=24`
/// - `VIDBOT_WORKER__MAX_CONCURRENT=2`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("model.id", "VideoCrafter/VideoCrafter2")?
        .set_default("model.backend", "http")?
        .set_default("model.hub_url", "https://huggingface.co")?
        .set_default("model.inference_url", "http://localhost:8000")?
        .set_default("model.timeout_secs", 0)?
        .set_default("video.fps", 30)?
        .set_default("video.ffmpeg_path", "ffmpeg")?
        .set_default("video.codec", "libx264")?
        .set_default("video.pixel_format", "yuv420p")?
        .set_default("storage.output_dir", "data/videos")?
        .set_default("storage.keep_outputs", false)?
        .set_default("telegram.api_url", "https://api.telegram.org")?
        .set_default("telegram.poll_timeout_secs", 30)?
        .set_default("telegram.retry_delay_secs", 5)?
        .set_default("telegram.upload_timeout_secs", 300)?
        .set_default("worker.max_concurrent", 1)?
        .set_default("worker.queue_capacity", 32)?
        .set_default("worker.drain_timeout_secs", 60)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VIDBOT_MODEL__INFERENCE_URL=http://gpu-box:8000
    builder = builder.add_source(
        Environment::with_prefix("VIDBOT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.model.id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model id cannot be empty".to_string(),
        ));
    }

    if config.model.inference_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Inference URL cannot be empty".to_string(),
        ));
    }

    if config.video.fps == 0 {
        return Err(ConfigError::ValidationError(
            "Video fps cannot be 0".to_string(),
        ));
    }

    if config.worker.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Worker max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.worker.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Worker queue_capacity cannot be 0".to_string(),
        ));
    }

    if config.telegram.api_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Telegram API URL cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志，不含凭据）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Model: {} ({:?})", config.model.id, config.model.backend);
    tracing::info!("Model Hub: {}", config.model.hub_url);
    tracing::info!("Inference URL: {}", config.model.inference_url);
    if config.model.timeout_secs > 0 {
        tracing::info!("Inference Timeout: {}s", config.model.timeout_secs);
    } else {
        tracing::info!("Inference Timeout: none");
    }
    tracing::info!(
        "Video: {} fps, codec {}, pixel format {}",
        config.video.fps,
        config.video.codec,
        config.video.pixel_format
    );
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Keep Outputs: {}", config.storage.keep_outputs);
    tracing::info!("Telegram Poll Timeout: {}s", config.telegram.poll_timeout_secs);
    tracing::info!(
        "Worker: max_concurrent={}, queue_capacity={}",
        config.worker.max_concurrent,
        config.worker.queue_capacity
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
