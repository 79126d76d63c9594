//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现，以及文本输入来源

pub mod adapters;
pub mod input;

pub use adapters::{
    ElevenLabsClient, ElevenLabsClientConfig, FakeTtsClient, FileRunStorage, RodioPlayer,
    SilentPlayer, SymphoniaDecoder,
};
