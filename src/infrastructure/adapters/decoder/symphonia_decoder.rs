//! Symphonia Decoder - 基于 symphonia 的音频解码器
//!
//! 把 TTS 服务返回的 MP3 解码为交错排列的 f32 PCM

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioDecoderPort, DecodeError};
use crate::domain::AudioSegment;

/// Symphonia 解码器
///
/// 按内容探测格式，扩展名提示只用于加速探测
pub struct SymphoniaDecoder {
    extension_hint: String,
}

impl SymphoniaDecoder {
    pub fn new(extension_hint: impl Into<String>) -> Self {
        Self {
            extension_hint: extension_hint.into(),
        }
    }

    pub fn mp3() -> Self {
        Self::new("mp3")
    }
}

impl Default for SymphoniaDecoder {
    fn default() -> Self {
        Self::mp3()
    }
}

impl AudioDecoderPort for SymphoniaDecoder {
    fn decode(&self, data: &[u8]) -> Result<AudioSegment, DecodeError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(&self.extension_hint);

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unsupported(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| DecodeError::Unsupported("No audio track found".to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => {
                    return Err(DecodeError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(DecodeError::DecodingError(e.to_string()));
                }
            };

            let spec = *decoded.spec();
            if sample_rate == 0 {
                sample_rate = spec.rate;
            }
            if channels == 0 {
                channels = spec.channels.count() as u16;
            }

            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            // 只取实际写入的样本
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        if samples.is_empty() || sample_rate == 0 || channels == 0 {
            return Err(DecodeError::Empty);
        }

        let segment = AudioSegment::new(sample_rate, channels, samples);
        tracing::debug!(
            sample_rate = segment.sample_rate,
            channels = segment.channels,
            duration_ms = segment.duration_ms(),
            "Audio decoded"
        );

        Ok(segment)
    }
}
