//! Rodio Player - 通过系统默认输出设备播放

use async_trait::async_trait;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStreamBuilder, Sink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{AudioPlayerPort, PlaybackError};
use crate::domain::AudioSegment;

/// 阻塞线程检查停止信号的间隔
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Rodio 播放器
///
/// 输出流在阻塞线程中打开并一直持有到播放结束。
/// `play` 返回的 future 被丢弃（例如 Ctrl-C）时播放立即停止。
#[derive(Debug, Clone, Default)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioPlayerPort for RodioPlayer {
    async fn play(&self, segment: &AudioSegment) -> Result<(), PlaybackError> {
        if segment.is_empty() {
            return Ok(());
        }

        let channels = segment.channels;
        let sample_rate = segment.sample_rate;
        let samples = segment.samples.clone();

        tracing::info!(
            duration_ms = segment.duration_ms(),
            sample_rate,
            channels,
            "Playing audio"
        );

        run_until_dropped(move |stop| {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| PlaybackError::DeviceError(format!("Cannot open output: {}", e)))?;
            stream.log_on_drop(false);

            let sink = Sink::connect_new(stream.mixer());
            sink.append(SamplesBuffer::new(channels, sample_rate, samples));

            while !sink.empty() {
                if stop.load(Ordering::Relaxed) {
                    sink.stop();
                    return Err(PlaybackError::Interrupted("playback cancelled".to_string()));
                }
                std::thread::sleep(STOP_POLL_INTERVAL);
            }

            Ok(())
        })
        .await
    }
}

/// future 被丢弃时置位停止信号
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// 在阻塞线程中执行 `job`，调用方放弃等待时通知它停止
///
/// 运行时关闭会等待阻塞任务结束，`job` 必须定期检查停止信号。
async fn run_until_dropped<F>(job: F) -> Result<(), PlaybackError>
where
    F: FnOnce(&AtomicBool) -> Result<(), PlaybackError> + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let _guard = StopOnDrop(stop.clone());

    tokio::task::spawn_blocking(move || job(&stop))
        .await
        .map_err(|e| PlaybackError::Interrupted(e.to_string()))?
}
