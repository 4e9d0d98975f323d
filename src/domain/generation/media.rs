//! Generation Context - 媒体缓冲区
//!
//! 模型返回通道优先 `(T, C, H, W)` 的张量；编码器需要帧优先
//! `(T, H, W, C)` 的打包像素。`VideoTensor::into_frames` 负责这一次性转换。

use ndarray::Array4;

use super::MediaError;

/// 张量样本类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    /// 0..=255
    U8,
    /// 0.0..=1.0，量化为 u8
    F32,
}

impl SampleType {
    /// 每个样本的字节数
    pub fn size(&self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::F32 => 4,
        }
    }
}

impl std::str::FromStr for SampleType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uint8" | "u8" => Ok(SampleType::U8),
            "float32" | "f32" => Ok(SampleType::F32),
            other => Err(MediaError::UnsupportedDtype(other.to_string())),
        }
    }
}

/// 通道优先的张量形状 `(frames, channels, height, width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorShape {
    pub frames: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl TensorShape {
    pub fn new(frames: usize, channels: usize, height: usize, width: usize) -> Self {
        Self {
            frames,
            channels,
            height,
            width,
        }
    }

    /// 样本总数；形状来自远端响应头，乘积溢出视为非法形状
    pub fn sample_count(&self) -> Result<usize, MediaError> {
        self.frames
            .checked_mul(self.channels)
            .and_then(|n| n.checked_mul(self.height))
            .and_then(|n| n.checked_mul(self.width))
            .ok_or_else(|| MediaError::InvalidShape(format!("{} overflows usize", self)))
    }

    /// 校验形状并返回样本总数
    fn validate(&self) -> Result<usize, MediaError> {
        let count = self.sample_count()?;
        if count == 0 {
            return Err(MediaError::InvalidShape(format!(
                "zero-sized dimension in {}",
                self
            )));
        }
        if self.channels != 1 && self.channels != 3 {
            return Err(MediaError::UnsupportedChannels(self.channels));
        }
        Ok(count)
    }
}

impl std::fmt::Display for TensorShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.frames, self.channels, self.height, self.width
        )
    }
}

impl std::str::FromStr for TensorShape {
    type Err = MediaError;

    /// 解析 `T,C,H,W` 形式（如 `16,3,320,512`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dims = s
            .split(',')
            .map(|d| d.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MediaError::InvalidShape(format!("{}: {}", s, e)))?;

        match dims.as_slice() {
            [t, c, h, w] => Ok(TensorShape::new(*t, *c, *h, *w)),
            _ => Err(MediaError::InvalidShape(format!(
                "expected 4 dimensions, got {}",
                dims.len()
            ))),
        }
    }
}

/// 模型输出的视频张量（通道优先）
///
/// 每个请求只消费一次
#[derive(Debug, Clone)]
pub struct VideoTensor {
    shape: TensorShape,
    data: Vec<u8>,
}

impl VideoTensor {
    /// 从 u8 样本构造
    pub fn from_u8(shape: TensorShape, data: Vec<u8>) -> Result<Self, MediaError> {
        let expected = shape.validate()?;
        if data.len() != expected {
            return Err(MediaError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// 从 [0, 1] 区间的 f32 样本构造，量化并截断到 u8
    pub fn from_f32(shape: TensorShape, data: &[f32]) -> Result<Self, MediaError> {
        let quantized = data
            .iter()
            .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect();
        Self::from_u8(shape, quantized)
    }

    /// 从小端原始字节构造
    pub fn from_le_bytes(
        shape: TensorShape,
        dtype: SampleType,
        bytes: &[u8],
    ) -> Result<Self, MediaError> {
        match dtype {
            SampleType::U8 => Self::from_u8(shape, bytes.to_vec()),
            SampleType::F32 => {
                let expected = shape
                    .validate()?
                    .checked_mul(dtype.size())
                    .ok_or_else(|| MediaError::InvalidShape(format!("{} overflows usize", shape)))?;
                if bytes.len() != expected {
                    return Err(MediaError::LengthMismatch {
                        expected,
                        actual: bytes.len(),
                    });
                }
                let samples: Vec<f32> = bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                Self::from_f32(shape, &samples)
            }
        }
    }

    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// 转换为帧优先布局 `(T, H, W, C)`
    pub fn into_frames(self) -> Result<FrameBuffer, MediaError> {
        let TensorShape {
            frames,
            channels,
            height,
            width,
        } = self.shape;

        let tensor = Array4::from_shape_vec((frames, channels, height, width), self.data)
            .map_err(|e| MediaError::InvalidShape(e.to_string()))?;

        // (T, C, H, W) -> (T, H, W, C)，按逻辑顺序迭代即得到打包像素
        let data: Vec<u8> = tensor.permuted_axes([0, 2, 3, 1]).iter().copied().collect();

        Ok(FrameBuffer {
            frames,
            height,
            width,
            channels,
            data,
        })
    }
}

/// 帧优先的打包像素缓冲区 `(frames, height, width, channels)`
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frames: usize,
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// 单帧字节数
    pub fn frame_size(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// 第 `index` 帧的像素
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        let size = self.frame_size();
        let start = index.checked_mul(size)?;
        let end = start.checked_add(size)?;
        self.data.get(start..end)
    }

    /// 全部像素（逐帧连续）
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// ffmpeg rawvideo 像素格式
    pub fn pixel_format(&self) -> &'static str {
        match self.channels {
            1 => "gray",
            _ => "rgb24",
        }
    }

    /// 帧数换算的时长（毫秒）
    pub fn duration_ms(&self, fps: u32) -> u64 {
        if fps == 0 {
            return 0;
        }
        self.frames as u64 * 1000 / fps as u64
    }
}
