//! ElevenLabs Client - 调用 ElevenLabs TTS HTTP 服务
//!
//! 实现 SynthesizerPort trait
//!
//! 外部 TTS API:
//! POST https://api.elevenlabs.io/v1/text-to-speech/{voice_id}
//! Headers: Accept: audio/mpeg, xi-api-key: <key>
//! Request: {"text": "...", "model_id": "...", "voice_settings": {...}}  (JSON)
//! Response: audio/mpeg binary；失败时为 JSON 错误体

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, SynthesizerPort, TtsError, VoiceSettings};

/// TTS 请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ElevenLabsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ElevenLabsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// ElevenLabs HTTP 客户端
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsClientConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn synthesis_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        )
    }
}

#[async_trait]
impl SynthesizerPort for ElevenLabsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, TtsError> {
        let url = self.synthesis_url(&request.voice.voice_id);
        let body = TtsHttpRequest {
            text: &request.text,
            model_id: &request.voice.model_id,
            voice_settings: request.voice.settings,
        };

        tracing::debug!(
            url = %url,
            chunk = request.chunk_index,
            text_len = request.text.len(),
            model_id = %request.voice.model_id,
            "Sending TTS request"
        );

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "audio/mpeg")
            .header("xi-api-key", request.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&error_text).unwrap_or_else(|| {
                if error_text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    error_text
                }
            });

            tracing::warn!(
                chunk = request.chunk_index,
                status = status.as_u16(),
                error = %message,
                "TTS request failed"
            );

            return Err(if status.is_client_error() {
                TtsError::Rejected {
                    status: status.as_u16(),
                    message,
                }
            } else {
                TtsError::ServiceError {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty()
            && !content_type.starts_with("audio/")
            && !content_type.starts_with("application/octet-stream")
        {
            return Err(TtsError::InvalidResponse(format!(
                "expected audio/mpeg, got {}",
                content_type
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        tracing::info!(
            chunk = request.chunk_index,
            audio_size = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}

/// 从错误体中提取可读信息
///
/// 支持 `{"detail": {"status", "message"}}`、`{"detail": [{"msg"}]}`、
/// `{"detail": "..."}` 三种形式
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;

    match detail {
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => {
            let message = fields.get("message").and_then(Value::as_str)?;
            match fields.get("status").and_then(Value::as_str) {
                Some(code) => Some(format!("{} ({})", message, code)),
                None => Some(message.to_string()),
            }
        }
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ApiKey, VoiceProfile};
    use axum::{
        extract::Path,
        http::{header, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Json, Router,
    };
    use serde_json::json;

    const FAKE_MP3: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00];

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request(text: &str) -> SynthesisRequest {
        SynthesisRequest {
            chunk_index: 1,
            text: text.to_string(),
            voice: VoiceProfile::default(),
            api_key: ApiKey::new("test-key").unwrap(),
        }
    }

    /// 只有请求完全符合 API 约定时才返回音频
    async fn strict_provider(
        Path(voice_id): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        let header_ok = headers.get("xi-api-key").map(|v| v == "test-key") == Some(true)
            && headers.get(header::ACCEPT).map(|v| v == "audio/mpeg") == Some(true);
        let body_ok = body["text"] == "Hello there."
            && body["model_id"] == "eleven_monolingual_v1"
            && body["voice_settings"]["stability"] == 0.75
            && body["voice_settings"]["similarity_boost"] == 0.75
            && body["voice_settings"]["style"] == 0.0
            && body["voice_settings"]["use_speaker_boost"] == true;

        if voice_id == "21m00Tcm4TlvDq8ikWAM" && header_ok && body_ok {
            ([(header::CONTENT_TYPE, "audio/mpeg")], FAKE_MP3.to_vec()).into_response()
        } else {
            (StatusCode::IM_A_TEAPOT, "unexpected request").into_response()
        }
    }

    #[test]
    fn test_config_default() {
        let config = ElevenLabsClientConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = ElevenLabsClientConfig::new("http://example.com:9000/").with_timeout(60);
        let client = ElevenLabsClient::new(config).unwrap();
        assert_eq!(
            client.synthesis_url("abc"),
            "http://example.com:9000/v1/text-to-speech/abc"
        );
    }

    #[test]
    fn test_extract_error_message_shapes() {
        let object = r#"{"detail": {"status": "invalid_voice_settings", "message": "stability out of range"}}"#;
        assert_eq!(
            extract_error_message(object).unwrap(),
            "stability out of range (invalid_voice_settings)"
        );

        let list = r#"{"detail": [{"msg": "field required"}, {"msg": "bad model"}]}"#;
        assert_eq!(
            extract_error_message(list).unwrap(),
            "field required; bad model"
        );

        assert_eq!(
            extract_error_message(r#"{"detail": "quota exceeded"}"#).unwrap(),
            "quota exceeded"
        );
        assert!(extract_error_message("not json").is_none());
    }

    #[tokio::test]
    async fn test_synthesize_success() {
        let router = Router::new().route("/v1/text-to-speech/:voice_id", post(strict_provider));
        let base_url = spawn_provider(router).await;
        let client = ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url)).unwrap();

        let audio = client.synthesize(request("Hello there.")).await.unwrap();
        assert_eq!(audio, FAKE_MP3);
    }

    #[tokio::test]
    async fn test_bad_request_is_rejected() {
        let router = Router::new().route(
            "/v1/text-to-speech/:voice_id",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": {"status": "invalid_voice_settings", "message": "stability must be between 0 and 1"}})),
                )
            }),
        );
        let base_url = spawn_provider(router).await;
        let client = ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url)).unwrap();

        let err = client.synthesize(request("Hello there.")).await.unwrap_err();
        match err {
            TtsError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("stability must be between 0 and 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_service_error() {
        let router = Router::new().route(
            "/v1/text-to-speech/:voice_id",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "") }),
        );
        let base_url = spawn_provider(router).await;
        let client = ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url)).unwrap();

        let err = client.synthesize(request("Hello there.")).await.unwrap_err();
        assert_eq!(
            err,
            TtsError::ServiceError {
                status: 503,
                message: "Service Unavailable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_audio_success_is_invalid_response() {
        let router = Router::new().route(
            "/v1/text-to-speech/:voice_id",
            post(|| async { Json(json!({"ok": true})) }),
        );
        let base_url = spawn_provider(router).await;
        let client = ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url)).unwrap();

        let err = client.synthesize(request("Hello there.")).await.unwrap_err();
        assert!(matches!(err, TtsError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // 绑定后立即释放端口，保证无人监听
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            ElevenLabsClient::new(ElevenLabsClientConfig::new(format!("http://{}", addr)))
                .unwrap();

        let err = client.synthesize(request("Hello there.")).await.unwrap_err();
        assert!(matches!(err, TtsError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let router = Router::new().route(
            "/v1/text-to-speech/:voice_id",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                ([(header::CONTENT_TYPE, "audio/mpeg")], FAKE_MP3.to_vec())
            }),
        );
        let base_url = spawn_provider(router).await;
        let client =
            ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url).with_timeout(1)).unwrap();

        let err = client.synthesize(request("Hello there.")).await.unwrap_err();
        assert_eq!(err, TtsError::Timeout);
    }
}
