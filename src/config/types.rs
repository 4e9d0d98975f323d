//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 模型配置
    #[serde(default)]
    pub model: ModelConfig,

    /// 视频编码配置
    #[serde(default)]
    pub video: VideoConfig,

    /// 输出存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram 配置
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Worker 配置
    #[serde(default)]
    pub worker: WorkerConfig,

    /// 回复文案
    #[serde(default)]
    pub messages: MessagesConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 模型后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// 远程推理服务
    #[default]
    Http,
    /// 本地合成的测试图案，不需要 GPU
    Fake,
}

/// 模型配置
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// 模型仓库 ID
    #[serde(default = "default_model_id")]
    pub id: String,

    /// 后端类型
    #[serde(default)]
    pub backend: ModelBackend,

    /// 模型仓库地址
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// 推理服务基础 URL
    #[serde(default = "default_inference_url")]
    pub inference_url: String,

    /// 推理超时（秒），0 表示不限制
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_model_id() -> String {
    "VideoCrafter/VideoCrafter2".to_string()
}

fn default_hub_url() -> String {
    "https://huggingface.co".to_string()
}

fn default_inference_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: default_model_id(),
            backend: ModelBackend::default(),
            hub_url: default_hub_url(),
            inference_url: default_inference_url(),
            timeout_secs: 0,
        }
    }
}

/// 视频编码配置
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    /// 输出帧率
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// ffmpeg 可执行文件
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// 视频编码器
    #[serde(default = "default_codec")]
    pub codec: String,

    /// 输出像素格式
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,
}

fn default_fps() -> u32 {
    30
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_codec() -> String {
    "libx264".to_string()
}

fn default_pixel_format() -> String {
    "yuv420p".to_string()
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            ffmpeg_path: default_ffmpeg_path(),
            codec: default_codec(),
            pixel_format: default_pixel_format(),
        }
    }
}

/// 输出存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 视频输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 投递后是否保留文件
    #[serde(default)]
    pub keep_outputs: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/videos")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            keep_outputs: false,
        }
    }
}

/// Telegram 配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API 基础 URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// 长轮询超时（秒）
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// 轮询出错后的等待时间（秒）
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// 上传视频超时（秒）
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    5
}

fn default_upload_timeout() -> u64 {
    300
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout(),
            retry_delay_secs: default_retry_delay(),
            upload_timeout_secs: default_upload_timeout(),
        }
    }
}

/// Worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 最大并发生成数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 任务队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 关闭时等待进行中任务的时间（秒）
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    1 // 单 GPU
}

fn default_queue_capacity() -> usize {
    32
}

fn default_drain_timeout() -> u64 {
    60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
            drain_timeout_secs: default_drain_timeout(),
        }
    }
}

/// 回复文案
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    /// `/start` 欢迎语
    #[serde(default = "default_welcome")]
    pub welcome: String,

    /// 收到提示词后的确认
    #[serde(default = "default_processing")]
    pub processing: String,

    /// 错误回复前缀
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,
}

fn default_welcome() -> String {
    "Welcome to the video generation bot! Send me a text description and I'll create a video for you 🎥.".to_string()
}

fn default_processing() -> String {
    "Generating your video, please wait...".to_string()
}

fn default_error_prefix() -> String {
    "An error occurred while generating the video".to_string()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            processing: default_processing(),
            error_prefix: default_error_prefix(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
