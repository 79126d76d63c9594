//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::{ApiKey, VoiceProfile, VoiceSettings};
use crate::domain::{ChunkConfig, MAX_CHARS_PER_CHUNK};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// ElevenLabs 服务配置
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,

    /// 分块配置
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// 输出目录配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 播放配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// ElevenLabs 配置
#[derive(Clone, Deserialize)]
pub struct ElevenLabsConfig {
    /// API key，缺失时在运行阶段报错而不是加载阶段
    #[serde(default)]
    pub api_key: Option<String>,

    /// 服务基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub voice_settings: VoiceSettings,
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_voice_id() -> String {
    VoiceProfile::default().voice_id
}

fn default_model_id() -> String {
    VoiceProfile::default().model_id
}

fn default_timeout() -> u64 {
    120
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            timeout_secs: default_timeout(),
            voice_settings: VoiceSettings::default(),
        }
    }
}

impl std::fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("timeout_secs", &self.timeout_secs)
            .field("voice_settings", &self.voice_settings)
            .finish()
    }
}

impl ElevenLabsConfig {
    /// 有效的 API key（空白视为缺失）
    pub fn api_key(&self) -> Option<ApiKey> {
        self.api_key.as_deref().and_then(ApiKey::new)
    }

    /// 用于日志输出的 key：只保留末尾 4 位
    pub fn masked_api_key(&self) -> String {
        match self.api_key() {
            None => "<not set>".to_string(),
            Some(key) => {
                let chars: Vec<char> = key.expose().chars().collect();
                if chars.len() <= 4 {
                    "****".to_string()
                } else {
                    let tail: String = chars[chars.len() - 4..].iter().collect();
                    format!("****{}", tail)
                }
            }
        }
    }

    pub fn voice_profile(&self) -> VoiceProfile {
        VoiceProfile {
            voice_id: self.voice_id.clone(),
            model_id: self.model_id.clone(),
            settings: self.voice_settings,
        }
    }
}

/// 分块配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// 单个 chunk 的最大字符数
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_chars() -> usize {
    MAX_CHARS_PER_CHUNK
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

impl ChunkingConfig {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            max_chars: self.max_chars,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 运行目录的父目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// 播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 合成完成后是否播放
    #[serde(default = "default_playback_enabled")]
    pub enabled: bool,
}

fn default_playback_enabled() -> bool {
    true
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            enabled: default_playback_enabled(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
