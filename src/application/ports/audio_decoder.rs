//! Audio Decoder Port - 音频解码抽象

use thiserror::Error;

use crate::domain::AudioSegment;

/// 解码错误
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported audio: {0}")]
    Unsupported(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("No audio frames decoded")]
    Empty,
}

/// Audio Decoder Port
///
/// 把服务返回的压缩音频解码为 PCM 片段
pub trait AudioDecoderPort: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<AudioSegment, DecodeError>;
}
