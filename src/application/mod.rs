//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Synthesizer、AudioDecoder、AudioPlayer、RunStorage）
//! - commands: SynthesizeText 命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

pub use commands::{
    handlers::{SynthesisSettings, SynthesizeTextHandler},
    RunReport, SynthesizeText,
};

pub use error::{RunFailure, SynthesisError};

pub use ports::{
    // Synthesizer
    ApiKey,
    SynthesisRequest,
    SynthesizerPort,
    TtsError,
    VoiceProfile,
    VoiceSettings,
    // Decoder / player
    AudioDecoderPort,
    AudioPlayerPort,
    DecodeError,
    PlaybackError,
    // Run storage
    RunHandle,
    RunMetadata,
    RunStoragePort,
    StorageError,
};
