//! Run Storage Port - 出站端口
//!
//! 定义一次运行产物（运行目录、音频文件、元数据）的存储接口

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// 元数据文件名
pub const METADATA_FILE_NAME: &str = "text_info.json";

/// 合并音频文件名
pub const COMBINED_FILE_NAME: &str = "combined.mp3";

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 一次运行的目录句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    /// 目录名，例如 `run_20240102_030405`
    pub id: String,
    /// 时间戳（`YYYYMMDD_HHMMSS`）
    pub timestamp: String,
    pub dir: PathBuf,
}

/// 运行元数据（`text_info.json`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub timestamp: String,
    /// 原始文本的字符数
    pub text_length: usize,
    /// 已写入的音频文件名，按写入顺序
    pub audio_files: Vec<String>,
    pub text_content: String,
}

impl RunMetadata {
    pub fn new(timestamp: impl Into<String>, text: &str) -> Self {
        Self {
            timestamp: timestamp.into(),
            text_length: text.chars().count(),
            audio_files: Vec::new(),
            text_content: text.to_string(),
        }
    }
}

/// 第 `index` 个 chunk（从 1 开始）的音频文件名
///
/// 只有一个 chunk 时为 `audio.mp3`，否则为 `part_NN.mp3`
pub fn chunk_file_name(index: usize, total: usize) -> String {
    if total <= 1 {
        "audio.mp3".to_string()
    } else {
        format!("part_{:02}.mp3", index)
    }
}

/// Run Storage Port - 出站端口
#[async_trait]
pub trait RunStoragePort: Send + Sync {
    /// 创建新的运行目录，同一秒内多次调用也不会冲突
    async fn create_run(&self, started_at: DateTime<Local>) -> Result<RunHandle, StorageError>;

    /// 保存音频数据，返回文件路径
    async fn save_audio(
        &self,
        run: &RunHandle,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError>;

    /// 覆盖写入元数据
    async fn write_metadata(
        &self,
        run: &RunHandle,
        metadata: &RunMetadata,
    ) -> Result<PathBuf, StorageError>;
}
