//! Fake TTS Client - 用于测试的 TTS 客户端
//!
//! 不实际调用 TTS 服务，返回固定音频并记录所有请求

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{SynthesisRequest, SynthesizerPort, TtsError};

/// Fake TTS Client
///
/// 始终返回配置的固定音频；可以让第 N 次调用失败
pub struct FakeTtsClient {
    audio_data: Vec<u8>,
    /// 在音频末尾追加 chunk 序号字节，便于检查顺序
    tag_chunks: bool,
    /// (从 1 开始的调用序号, 错误)
    failure: Option<(usize, TtsError)>,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl FakeTtsClient {
    pub fn new(audio_data: Vec<u8>) -> Self {
        Self {
            audio_data,
            tag_chunks: false,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chunk_tagging(mut self) -> Self {
        self.tag_chunks = true;
        self
    }

    /// 第 `call` 次调用（从 1 开始）返回 `error`
    pub fn fail_on_call(mut self, call: usize, error: TtsError) -> Self {
        self.failure = Some((call, error));
        self
    }

    /// 已收到的请求，按调用顺序
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SynthesizerPort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, TtsError> {
        tracing::debug!(
            chunk = request.chunk_index,
            text_len = request.text.len(),
            "FakeTtsClient: returning fixed audio"
        );

        let chunk_index = request.chunk_index;
        let call = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|e| TtsError::NetworkError(e.to_string()))?;
            requests.push(request);
            requests.len()
        };

        if let Some((failing_call, error)) = &self.failure {
            if *failing_call == call {
                return Err(error.clone());
            }
        }

        let mut audio = self.audio_data.clone();
        if self.tag_chunks {
            audio.push(chunk_index as u8);
        }
        Ok(audio)
    }
}
