//! Encoder Adapter - 视频封装实现

mod ffmpeg_encoder;

pub use ffmpeg_encoder::{FfmpegEncoder, FfmpegEncoderConfig};
