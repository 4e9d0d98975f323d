//! File Storage - 文件系统输出存储实现
//!
//! 实现 OutputStoragePort trait，每个请求写入 `{base_dir}/{request_id}.mp4`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{OutputStorageError, OutputStoragePort};
use crate::domain::RequestId;

/// 文件系统输出存储
pub struct FileOutputStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileOutputStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, OutputStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| OutputStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }
}

#[async_trait]
impl OutputStoragePort for FileOutputStorage {
    fn output_path(&self, request_id: RequestId) -> PathBuf {
        self.base_dir.join(format!("{}.mp4", request_id))
    }

    async fn prepare(&self, request_id: RequestId) -> Result<PathBuf, OutputStorageError> {
        // 目录可能在运行期间被外部清理
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| OutputStorageError::IoError(e.to_string()))?;

        Ok(self.output_path(request_id))
    }

    async fn release(&self, path: &Path) -> Result<(), OutputStorageError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed output file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OutputStorageError::IoError(e.to_string())),
        }
    }
}
