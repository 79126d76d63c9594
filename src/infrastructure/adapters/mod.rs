//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod decoder;
pub mod playback;
pub mod storage;
pub mod tts;

pub use decoder::*;
pub use playback::*;
pub use storage::*;
pub use tts::*;
