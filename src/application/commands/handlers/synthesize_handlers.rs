//! Synthesize Command Handler - 多 chunk 合成编排
//!
//! 状态流转：
//! Init（检查 API key）→ Prepare（分块、创建运行目录）→ 逐个 chunk 合成 → Finalize（合并、播放）
//!
//! chunk 严格顺序处理，同一时刻只有一个请求在途，片段顺序即 chunk 顺序。

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::application::commands::synthesize_commands::{RunReport, SynthesizeText};
use crate::application::error::{RunFailure, SynthesisError};
use crate::application::ports::{
    chunk_file_name, ApiKey, AudioDecoderPort, AudioPlayerPort, RunHandle, RunMetadata,
    RunStoragePort, SynthesisRequest, SynthesizerPort, VoiceProfile, COMBINED_FILE_NAME,
};
use crate::domain::{split_into_chunks, AudioSegment, Chunk, ChunkConfig};

/// 合成设置（由配置层构造后注入）
#[derive(Debug, Clone, Default)]
pub struct SynthesisSettings {
    /// 缺失时运行直接失败
    pub api_key: Option<ApiKey>,
    pub voice: VoiceProfile,
    pub chunking: ChunkConfig,
}

/// SynthesizeText Handler
pub struct SynthesizeTextHandler {
    settings: SynthesisSettings,
    synthesizer: Arc<dyn SynthesizerPort>,
    decoder: Arc<dyn AudioDecoderPort>,
    player: Arc<dyn AudioPlayerPort>,
    storage: Arc<dyn RunStoragePort>,
}

impl SynthesizeTextHandler {
    pub fn new(
        settings: SynthesisSettings,
        synthesizer: Arc<dyn SynthesizerPort>,
        decoder: Arc<dyn AudioDecoderPort>,
        player: Arc<dyn AudioPlayerPort>,
        storage: Arc<dyn RunStoragePort>,
    ) -> Self {
        Self {
            settings,
            synthesizer,
            decoder,
            player,
            storage,
        }
    }

    pub async fn handle(&self, command: SynthesizeText) -> Result<RunReport, RunFailure> {
        // Init: 没有 API key 时不创建任何目录，也不发请求
        let api_key = self
            .settings
            .api_key
            .clone()
            .ok_or_else(|| RunFailure::before_run(SynthesisError::MissingCredential))?;

        // Prepare: 先分块，空输入不创建目录
        let chunks = split_into_chunks(&command.text, &self.settings.chunking);
        if chunks.is_empty() {
            return Err(RunFailure::before_run(SynthesisError::EmptyInput));
        }

        let run = self
            .storage
            .create_run(Local::now())
            .await
            .map_err(|e| RunFailure::before_run(e.into()))?;

        tracing::info!(
            run_id = %run.id,
            text_len = command.text.chars().count(),
            chunk_count = chunks.len(),
            "Synthesis run started"
        );

        let started = Instant::now();
        let mut metadata = RunMetadata::new(run.timestamp.clone(), &command.text);

        match self.execute(&run, &api_key, &chunks, &mut metadata).await {
            Ok(report) => {
                tracing::info!(
                    run_id = %run.id,
                    files = ?report.audio_files,
                    duration_ms = report.duration_ms,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Synthesis run completed"
                );
                Ok(report)
            }
            Err(error) => {
                tracing::error!(
                    run_id = %run.id,
                    error = %error,
                    kept_files = ?metadata.audio_files,
                    "Synthesis run failed, partial files kept"
                );
                Err(RunFailure {
                    error,
                    run_dir: Some(run.dir.clone()),
                    kept_files: metadata.audio_files,
                })
            }
        }
    }

    /// 逐个 chunk 合成并提交文件；任何一步失败都立即终止，已写入的文件保留
    async fn execute(
        &self,
        run: &RunHandle,
        api_key: &ApiKey,
        chunks: &[Chunk],
        metadata: &mut RunMetadata,
    ) -> Result<RunReport, SynthesisError> {
        let total = chunks.len();
        self.storage.write_metadata(run, metadata).await?;

        let mut segments: Vec<AudioSegment> = Vec::with_capacity(total);
        let mut combined_audio: Vec<u8> = Vec::new();

        for chunk in chunks {
            let audio = self.synthesize_chunk(chunk, total, api_key).await?;

            let file_name = chunk_file_name(chunk.index, total);
            self.commit_file(run, metadata, &file_name, &audio).await?;

            let segment = self
                .decoder
                .decode(&audio)
                .map_err(|e| SynthesisError::Decode {
                    chunk: chunk.index,
                    message: e.to_string(),
                })?;
            segments.push(segment);

            if total > 1 {
                combined_audio.extend_from_slice(&audio);
            }
        }

        // Finalize: 单 chunk 时 concat 只是原样返回该片段
        let playback = AudioSegment::concat(&segments)?;
        let combined_file = if total > 1 {
            let path = self
                .commit_file(run, metadata, COMBINED_FILE_NAME, &combined_audio)
                .await?;
            Some(path)
        } else {
            None
        };

        tracing::info!(
            run_id = %run.id,
            duration_ms = playback.duration_ms(),
            sample_rate = playback.sample_rate,
            "Playing audio"
        );
        self.player.play(&playback).await?;

        Ok(RunReport {
            run_id: run.id.clone(),
            run_dir: run.dir.clone(),
            chunk_count: total,
            audio_files: metadata.audio_files.clone(),
            combined_file,
            duration_ms: playback.duration_ms(),
        })
    }

    async fn synthesize_chunk(
        &self,
        chunk: &Chunk,
        total: usize,
        api_key: &ApiKey,
    ) -> Result<Vec<u8>, SynthesisError> {
        tracing::info!(
            chunk = chunk.index,
            total = total,
            chars = chunk.char_count(),
            "Synthesizing chunk"
        );

        let request = SynthesisRequest {
            chunk_index: chunk.index,
            text: chunk.text.clone(),
            voice: self.settings.voice.clone(),
            api_key: api_key.clone(),
        };

        self.synthesizer
            .synthesize(request)
            .await
            .map_err(|e| SynthesisError::from_tts(chunk.index, e))
    }

    /// 写入文件后立即重写元数据，使元数据始终与磁盘上的文件一致
    async fn commit_file(
        &self,
        run: &RunHandle,
        metadata: &mut RunMetadata,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, SynthesisError> {
        let path = self.storage.save_audio(run, file_name, data).await?;
        metadata.audio_files.push(file_name.to_string());
        self.storage.write_metadata(run, metadata).await?;

        tracing::debug!(path = %path.display(), size = data.len(), "Audio file committed");
        Ok(path)
    }
}
