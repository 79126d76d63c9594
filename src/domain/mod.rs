//! Domain Layer - 领域层
//!
//! 纯函数逻辑，不依赖任何 I/O:
//! - normalizer: 文本规范化
//! - chunker: 文本分块
//! - audio: 音频片段值对象

pub mod audio;
mod chunker;
mod normalizer;

pub use audio::{AudioSegment, SegmentMismatch};
pub use chunker::{split_into_chunks, Chunk, ChunkConfig, MAX_CHARS_PER_CHUNK};
pub use normalizer::normalize;
