//! Decoder Adapter - 音频解码实现

mod symphonia_decoder;

pub use symphonia_decoder::SymphoniaDecoder;
