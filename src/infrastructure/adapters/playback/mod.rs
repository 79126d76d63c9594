//! Playback Adapter - 音频播放实现

mod rodio_player;
mod silent_player;

pub use rodio_player::RodioPlayer;
pub use silent_player::SilentPlayer;
