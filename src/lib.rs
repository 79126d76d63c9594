//! Read to Me - 文本转语音 CLI
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - normalizer: URL/符号改写为可朗读的短语
//! - chunker: 按句子切分为有长度上限的 chunk
//! - audio: 解码后的音频片段
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Synthesizer, AudioDecoder, AudioPlayer, RunStorage）
//! - Commands: SynthesizeText 命令及处理器（多 chunk 编排）
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: ElevenLabs Client, Symphonia 解码, Rodio 播放, 文件存储
//! - Input: 交互式输入与文件读取

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
