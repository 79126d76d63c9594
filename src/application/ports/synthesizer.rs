//! Synthesizer Port - 语音合成抽象
//!
//! 定义外部 TTS 服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    /// 4xx：服务拒绝了请求内容（参数、额度、鉴权）
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx：服务端故障
    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 服务商 API key
///
/// Debug 输出时隐藏内容
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// 空白字符串视为缺失
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// 音色参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.75,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// 每次请求使用的音色/模型配置
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfile {
    pub voice_id: String,
    pub model_id: String,
    pub settings: VoiceSettings,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(), // Rachel
            model_id: "eleven_monolingual_v1".to_string(),
            settings: VoiceSettings::default(),
        }
    }
}

/// 单个 chunk 的合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// chunk 序号（用于日志和追踪）
    pub chunk_index: usize,
    /// 要合成的文本内容
    pub text: String,
    pub voice: VoiceProfile,
    pub api_key: ApiKey,
}

/// Synthesizer Port
///
/// 一个 chunk 进，一段 MP3 字节出
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, TtsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_key_is_missing() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" secret ").unwrap().expose(), "secret");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("secret").unwrap();
        assert!(!format!("{:?}", key).contains("secret"));
    }
}
