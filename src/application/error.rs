//! 应用层错误定义
//!
//! 一次合成运行的错误分类。所有错误都会终止整个运行，不做重试。

use std::path::PathBuf;
use thiserror::Error;

use crate::application::ports::{PlaybackError, StorageError, TtsError};
use crate::domain::SegmentMismatch;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// 缺少 API key
    #[error("API key missing: set ELEVEN_LABS_API_KEY (or READTOME_ELEVENLABS__API_KEY)")]
    MissingCredential,

    /// 没有可朗读的文本
    #[error("Nothing to read: input text is empty")]
    EmptyInput,

    /// 网络/连接失败或服务端故障
    #[error("Transport error on chunk {chunk}: {message}")]
    Transport { chunk: usize, message: String },

    /// 服务拒绝请求内容（参数、额度、鉴权）
    #[error("Request for chunk {chunk} rejected (HTTP {status}): {message}")]
    Validation {
        chunk: usize,
        status: u16,
        message: String,
    },

    /// 返回的音频无法解码
    #[error("Cannot decode audio for chunk {chunk}: {message}")]
    Decode { chunk: usize, message: String },

    #[error("Playback error: {0}")]
    Playback(String),

    /// 写入运行产物失败
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SynthesisError {
    /// 按 chunk 归类 TTS 错误
    pub fn from_tts(chunk: usize, err: TtsError) -> Self {
        match err {
            TtsError::Rejected { status, message } => Self::Validation {
                chunk,
                status,
                message,
            },
            TtsError::InvalidResponse(message) => Self::Decode { chunk, message },
            TtsError::NetworkError(_) | TtsError::Timeout | TtsError::ServiceError { .. } => {
                Self::Transport {
                    chunk,
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<StorageError> for SynthesisError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<PlaybackError> for SynthesisError {
    fn from(err: PlaybackError) -> Self {
        Self::Playback(err.to_string())
    }
}

impl From<SegmentMismatch> for SynthesisError {
    fn from(err: SegmentMismatch) -> Self {
        let chunk = match &err {
            SegmentMismatch::Format { index, .. } => *index,
            SegmentMismatch::Empty => 0,
        };
        Self::Decode {
            chunk,
            message: err.to_string(),
        }
    }
}

/// 运行失败（终止状态 `Failed`）
///
/// 已写入的文件保留在磁盘上供检查，不做回滚。
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: SynthesisError,
    /// 已创建的运行目录
    pub run_dir: Option<PathBuf>,
    /// 失败前已写入的音频文件
    pub kept_files: Vec<String>,
}

impl RunFailure {
    /// 尚未创建任何目录时的失败
    pub fn before_run(error: SynthesisError) -> Self {
        Self {
            error,
            run_dir: None,
            kept_files: Vec::new(),
        }
    }
}
