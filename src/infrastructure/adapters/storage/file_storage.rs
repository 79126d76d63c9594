//! File Storage - 文件系统运行产物存储
//!
//! 实现 RunStoragePort trait
//!
//! 目录结构：
//! ```text
//! outputs/
//!   run_20240102_030405/
//!     part_01.mp3 ... part_NN.mp3 | audio.mp3
//!     combined.mp3
//!     text_info.json
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{
    RunHandle, RunMetadata, RunStoragePort, StorageError, METADATA_FILE_NAME,
};

/// 同一秒内最多创建的运行目录数
const MAX_RUNS_PER_SECOND: usize = 100;

/// 文件系统运行产物存储
pub struct FileRunStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileRunStorage {
    /// 根目录在第一次创建运行时才建立
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn io_error(e: std::io::Error) -> StorageError {
    StorageError::IoError(e.to_string())
}

#[async_trait]
impl RunStoragePort for FileRunStorage {
    async fn create_run(&self, started_at: DateTime<Local>) -> Result<RunHandle, StorageError> {
        fs::create_dir_all(&self.base_dir).await.map_err(io_error)?;

        let timestamp = started_at.format("%Y%m%d_%H%M%S").to_string();

        for attempt in 1..=MAX_RUNS_PER_SECOND {
            let id = if attempt == 1 {
                format!("run_{}", timestamp)
            } else {
                format!("run_{}_{}", timestamp, attempt)
            };
            let dir = self.base_dir.join(&id);

            // create_dir 而非 create_dir_all：已存在即视为冲突
            match fs::create_dir(&dir).await {
                Ok(()) => {
                    tracing::debug!(dir = %dir.display(), "Created run directory");
                    return Ok(RunHandle { id, timestamp, dir });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(io_error(e)),
            }
        }

        Err(StorageError::IoError(format!(
            "too many runs at {} in {}",
            timestamp,
            self.base_dir.display()
        )))
    }

    async fn save_audio(
        &self,
        run: &RunHandle,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let audio_path = run.dir.join(file_name);

        fs::write(&audio_path, data).await.map_err(io_error)?;

        tracing::debug!(
            "Saved audio: run={}, file={}, size={} bytes",
            run.id,
            file_name,
            data.len()
        );

        Ok(audio_path)
    }

    async fn write_metadata(
        &self,
        run: &RunHandle,
        metadata: &RunMetadata,
    ) -> Result<PathBuf, StorageError> {
        let json = serde_json::to_vec_pretty(metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let path = run.dir.join(METADATA_FILE_NAME);
        let tmp_path = run.dir.join(format!(".{}.tmp", METADATA_FILE_NAME));

        // 先写临时文件再 rename，元数据文件不会处于半写状态
        let result: std::io::Result<()> = async {
            fs::write(&tmp_path, &json).await?;
            fs::rename(&tmp_path, &path).await
        }
        .await;

        if let Err(e) = result {
            // 清理失败不影响结果
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error(e));
        }

        Ok(path)
    }
}
