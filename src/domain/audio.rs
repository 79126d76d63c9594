//! 音频片段值对象

use thiserror::Error;

/// 解码后的音频片段（交错排列的 f32 PCM）
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

/// 拼接失败
#[derive(Debug, Error, PartialEq)]
pub enum SegmentMismatch {
    #[error("no segments to concatenate")]
    Empty,

    #[error(
        "segment {index} is {found_rate}Hz/{found_channels}ch, expected {expected_rate}Hz/{expected_channels}ch"
    )]
    Format {
        /// 从 1 开始，与 chunk 序号一致
        index: usize,
        expected_rate: u32,
        expected_channels: u16,
        found_rate: u32,
        found_channels: u16,
    },
}

impl AudioSegment {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// 帧数（每个声道的采样数）
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 按顺序拼接多个片段
    ///
    /// 不做重采样：所有片段必须与第一个片段的采样率和声道数一致。
    pub fn concat(segments: &[AudioSegment]) -> Result<AudioSegment, SegmentMismatch> {
        let first = segments.first().ok_or(SegmentMismatch::Empty)?;

        let total: usize = segments.iter().map(|s| s.samples.len()).sum();
        let mut samples = Vec::with_capacity(total);

        for (i, segment) in segments.iter().enumerate() {
            if segment.sample_rate != first.sample_rate || segment.channels != first.channels {
                return Err(SegmentMismatch::Format {
                    index: i + 1,
                    expected_rate: first.sample_rate,
                    expected_channels: first.channels,
                    found_rate: segment.sample_rate,
                    found_channels: segment.channels,
                });
            }
            samples.extend_from_slice(&segment.samples);
        }

        Ok(AudioSegment::new(first.sample_rate, first.channels, samples))
    }
}
