//! Silent Player - 不输出声音，只记录日志（`--no-play` 与测试使用）

use async_trait::async_trait;

use crate::application::ports::{AudioPlayerPort, PlaybackError};
use crate::domain::AudioSegment;

#[derive(Debug, Clone, Default)]
pub struct SilentPlayer;

impl SilentPlayer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioPlayerPort for SilentPlayer {
    async fn play(&self, segment: &AudioSegment) -> Result<(), PlaybackError> {
        tracing::info!(
            duration_ms = segment.duration_ms(),
            "Playback skipped"
        );
        Ok(())
    }
}
