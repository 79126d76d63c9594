//! Audio Player Port - 音频播放抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioSegment;

/// 播放错误
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio device error: {0}")]
    DeviceError(String),

    #[error("Playback interrupted: {0}")]
    Interrupted(String),
}

/// Audio Player Port
#[async_trait]
pub trait AudioPlayerPort: Send + Sync {
    /// 播放片段，直到播放结束才返回
    async fn play(&self, segment: &AudioSegment) -> Result<(), PlaybackError>;
}
