//! Background analysis worker publishing the latest spectrum.

use crate::audio::analyzer::{AnalyzerConfig, SpectrumAnalyzer};
use crate::audio::spectrum::Spectrum;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::snapshot::SnapshotCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A block-based PCM producer (microphone, file, generator). Mono `f32` in `[-1, 1]`.
pub trait PcmSource: Send {
    fn sample_rate(&self) -> u32;

    /// Fill `buf`; returns the number of samples written. `0` means the source is exhausted.
    fn read(&mut self, buf: &mut [f32]) -> FxResult<usize>;
}

/// Endless sine generator.
#[derive(Clone, Debug)]
pub struct ToneSource {
    pub frequency: f32,
    pub amplitude: f32,
    pub sample_rate: u32,
    phase: f32,
}

impl ToneSource {
    pub fn new(frequency: f32, amplitude: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
            phase: 0.0,
        }
    }
}

impl PcmSource for ToneSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, buf: &mut [f32]) -> FxResult<usize> {
        let step = std::f32::consts::TAU * self.frequency / self.sample_rate as f32;
        for s in buf.iter_mut() {
            *s = self.amplitude * self.phase.sin();
            self.phase = (self.phase + step) % std::f32::consts::TAU;
        }
        Ok(buf.len())
    }
}

/// Analysis worker state shared with the pipeline.
#[derive(Debug, Default)]
struct FeedShared {
    stop: AtomicBool,
    failed: SnapshotCell<String>,
}

/// Running analysis worker. The latest [`Spectrum`] is read through [`AudioFeed::latest`];
/// the frame loop never waits on the worker.
#[derive(Debug)]
pub struct AudioFeed {
    spectrum: SnapshotCell<Spectrum>,
    shared: Arc<FeedShared>,
    worker: Option<JoinHandle<()>>,
}

impl AudioFeed {
    /// Start analysing `source` on a dedicated thread.
    ///
    /// `realtime` paces reads to the source's sample rate; without it the worker runs flat out
    /// (useful for generated or file sources in tests).
    pub fn start(
        mut source: Box<dyn PcmSource>,
        config: AnalyzerConfig,
        realtime: bool,
    ) -> FxResult<Self> {
        let config = AnalyzerConfig {
            sample_rate: source.sample_rate(),
            ..config
        };
        let mut analyzer = SpectrumAnalyzer::new(config)?;
        let spectrum = SnapshotCell::new();
        let shared = Arc::new(FeedShared::default());

        let out = spectrum.clone();
        let worker_shared = Arc::clone(&shared);
        let hop = config.fft_size / 2;
        let pace = Duration::from_secs_f64(hop as f64 / f64::from(config.sample_rate));
        let worker = thread::Builder::new()
            .name("livefx-audio".into())
            .spawn(move || {
                let mut buf = vec![0.0f32; hop];
                while !worker_shared.stop.load(Ordering::Acquire) {
                    match source.read(&mut buf) {
                        Ok(0) => {
                            tracing::info!("audio source exhausted");
                            break;
                        }
                        Ok(n) => {
                            analyzer.push_samples(&buf[..n]);
                            out.publish(analyzer.analyze());
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "audio source failed, analysis stopped");
                            worker_shared.failed.publish(e.to_string());
                            break;
                        }
                    }
                    if realtime {
                        thread::sleep(pace);
                    } else {
                        thread::yield_now();
                    }
                }
            })
            .map_err(|e| FxError::unavailable(format!("spawn audio worker: {e}")))?;

        tracing::debug!(sample_rate = config.sample_rate, fft_size = config.fft_size, "audio feed started");
        Ok(Self {
            spectrum,
            shared,
            worker: Some(worker),
        })
    }

    /// Most recent spectrum, if any has been produced.
    pub fn latest(&self) -> Option<Arc<Spectrum>> {
        self.spectrum.latest()
    }

    /// Read-only handle to the spectrum cell.
    pub fn cell(&self) -> SnapshotCell<Spectrum> {
        self.spectrum.clone()
    }

    /// Error that stopped the worker, if it failed.
    pub fn failure(&self) -> Option<Arc<String>> {
        self.shared.failed.latest()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop and join the worker, then clear the published spectrum. Idempotent.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("audio worker panicked");
            }
            tracing::debug!("audio feed stopped");
        }
        self.spectrum.clear();
    }
}

impl Drop for AudioFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/feed.rs"]
mod tests;
