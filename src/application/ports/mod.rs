//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_decoder;
mod audio_player;
mod run_storage;
mod synthesizer;

pub use audio_decoder::{AudioDecoderPort, DecodeError};
pub use audio_player::{AudioPlayerPort, PlaybackError};
pub use run_storage::{
    chunk_file_name, RunHandle, RunMetadata, RunStoragePort, StorageError, COMBINED_FILE_NAME,
    METADATA_FILE_NAME,
};
pub use synthesizer::{
    ApiKey, SynthesisRequest, SynthesizerPort, TtsError, VoiceProfile, VoiceSettings,
};
