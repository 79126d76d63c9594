//! Synthesize Commands - 文本转语音命令

use std::path::PathBuf;

/// 把一段文本合成为语音并保存运行产物
#[derive(Debug, Clone)]
pub struct SynthesizeText {
    pub text: String,
}

impl SynthesizeText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 成功运行的报告（终止状态 `Success`）
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub chunk_count: usize,
    /// 写入的音频文件名，按写入顺序（含 combined.mp3）
    pub audio_files: Vec<String>,
    /// 多 chunk 时的合并文件
    pub combined_file: Option<PathBuf>,
    /// 播放的音频时长（毫秒）
    pub duration_ms: u64,
}
