use crate::audio::spectrum::Spectrum;
use crate::foundation::error::{FxError, FxResult};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::sync::Arc;

/// Analyser settings. Defaults match a 256-point browser analyser node.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Power of two in `32..=32768`; yields `fft_size / 2` bins.
    pub fft_size: usize,
    /// Time smoothing of bin magnitudes, `0..=1`.
    pub smoothing: f32,
    /// Decibel value mapped to byte 0.
    pub min_db: f32,
    /// Decibel value mapped to byte 255.
    pub max_db: f32,
    pub sample_rate: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
            sample_rate: 48_000,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> FxResult<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(FxError::validation(format!(
                "fft_size must be a power of two in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(FxError::validation("smoothing must be in [0, 1]"));
        }
        if !(self.min_db < self.max_db) {
            return Err(FxError::validation("min_db must be below max_db"));
        }
        if self.sample_rate == 0 {
            return Err(FxError::validation("sample_rate must be > 0"));
        }
        Ok(())
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Bin whose centre frequency is closest to `hz`.
    pub fn bin_for_frequency(&self, hz: f32) -> usize {
        let bin = (hz * self.fft_size as f32 / self.sample_rate as f32).round();
        (bin.max(0.0) as usize).min(self.bin_count().saturating_sub(1))
    }
}

/// Windowed FFT over the most recent `fft_size` samples, producing byte spectra.
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    time_domain: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("config", &self.config)
            .finish()
    }
}

impl SpectrumAnalyzer {
    pub fn new(config: AnalyzerConfig) -> FxResult<Self> {
        config.validate()?;
        let n = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(n);
        // Hann window
        let window = (0..n)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos())
            })
            .collect();
        tracing::debug!(
            fft_size = n,
            hz_per_bin = config.sample_rate as f32 / n as f32,
            "spectrum analyzer ready"
        );
        Ok(Self {
            config,
            fft,
            window,
            time_domain: vec![0.0; n],
            fft_buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; n / 2],
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Shift `samples` into the analysis window, keeping the newest `fft_size`.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.config.fft_size;
        let shift = samples.len().min(n);
        if shift < n {
            self.time_domain.copy_within(shift.., 0);
        }
        let src = &samples[samples.len() - shift..];
        self.time_domain[n - shift..].copy_from_slice(src);
    }

    /// Transform the current window into a [`Spectrum`].
    pub fn analyze(&mut self) -> Spectrum {
        let n = self.config.fft_size;
        for ((dst, &s), &w) in self
            .fft_buffer
            .iter_mut()
            .zip(&self.time_domain)
            .zip(&self.window)
        {
            *dst = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.fft_buffer);

        let tau = self.config.smoothing;
        let scale = 1.0 / n as f32;
        let range = self.config.max_db - self.config.min_db;
        let mut frequency = Vec::with_capacity(n / 2);
        for (s, c) in self.smoothed.iter_mut().zip(&self.fft_buffer) {
            let mag = c.norm() * scale;
            *s = tau * *s + (1.0 - tau) * mag;
            let db = if *s > 0.0 {
                20.0 * s.log10()
            } else {
                f32::NEG_INFINITY
            };
            let byte = (255.0 * (db - self.config.min_db) / range).clamp(0.0, 255.0);
            frequency.push(byte as u8);
        }

        let waveform = self
            .time_domain
            .iter()
            .map(|&s| (128.0 * (1.0 + s)).clamp(0.0, 255.0) as u8)
            .collect();
        Spectrum::new(frequency, waveform)
    }

    /// Forget the sample window and smoothing history.
    pub fn reset(&mut self) {
        self.time_domain.fill(0.0);
        self.smoothed.fill(0.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/analyzer.rs"]
mod tests;
