//! FFmpeg Encoder - 通过 ffmpeg 子进程封装 MP4
//!
//! 原始帧经 stdin 以 rawvideo 写入，ffmpeg 负责编码与封装

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::application::ports::{EncodeError, EncodeResult, VideoEncoderPort};
use crate::domain::FrameBuffer;

/// FFmpeg 编码器配置
#[derive(Debug, Clone)]
pub struct FfmpegEncoderConfig {
    /// ffmpeg 可执行文件
    pub ffmpeg_path: PathBuf,
    /// 输出帧率
    pub fps: u32,
    /// 视频编码器
    pub codec: String,
    /// 输出像素格式
    pub pixel_format: String,
}

impl Default for FfmpegEncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            fps: 30,
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

/// FFmpeg 编码器
pub struct FfmpegEncoder {
    config: FfmpegEncoderConfig,
}

impl FfmpegEncoder {
    pub fn new(config: FfmpegEncoderConfig) -> Self {
        Self { config }
    }

    /// 构造 ffmpeg 参数
    fn build_args(&self, frames: &FrameBuffer, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            frames.pixel_format().to_string(),
            "-s".to_string(),
            format!("{}x{}", frames.width(), frames.height()),
            "-r".to_string(),
            self.config.fps.to_string(),
            "-i".to_string(),
            "-".to_string(),
            "-an".to_string(),
            // yuv420p 要求宽高为偶数
            "-vf".to_string(),
            "pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string(),
            "-c:v".to_string(),
            self.config.codec.clone(),
            "-pix_fmt".to_string(),
            self.config.pixel_format.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl VideoEncoderPort for FfmpegEncoder {
    async fn encode(
        &self,
        frames: &FrameBuffer,
        output: &Path,
    ) -> Result<EncodeResult, EncodeError> {
        if frames.frames() == 0 {
            return Err(EncodeError::InvalidInput("no frames to encode".to_string()));
        }

        let args = self.build_args(frames, output);
        tracing::debug!(
            ffmpeg = %self.config.ffmpeg_path.display(),
            args = ?args,
            "Spawning ffmpeg"
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EncodeError::NotFound(format!("{}: {}", self.config.ffmpeg_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EncodeError::IoError("ffmpeg stdin unavailable".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EncodeError::IoError("ffmpeg stderr unavailable".to_string()))?;

        // 写 stdin 的同时读 stderr，两个管道都不会写满阻塞
        let write_frames = async move {
            let result = stdin.write_all(frames.as_bytes()).await;
            drop(stdin);
            result
        };
        let read_stderr = async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        };
        let (write_result, stderr_bytes) = tokio::join!(write_frames, read_stderr);

        let status = child
            .wait()
            .await
            .map_err(|e| EncodeError::IoError(e.to_string()))?;

        // ffmpeg 提前退出时写入会失败，以退出状态和 stderr 为准
        if !status.success() {
            return Err(EncodeError::ExecutionFailed {
                exit_code: status.code(),
                stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
            });
        }
        write_result.map_err(|e| EncodeError::IoError(e.to_string()))?;

        let size_bytes = tokio::fs::metadata(output)
            .await
            .map_err(|e| EncodeError::IoError(e.to_string()))?
            .len();

        Ok(EncodeResult {
            path: output.to_path_buf(),
            size_bytes,
            duration_ms: frames.duration_ms(self.config.fps),
        })
    }

    fn fps(&self) -> u32 {
        self.config.fps
    }
}
