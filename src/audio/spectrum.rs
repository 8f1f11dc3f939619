use std::time::Instant;

/// One published analysis frame: byte frequency bins plus the byte waveform they came from.
///
/// Bytes follow the usual analyser convention: frequency bins map the decibel range linearly
/// onto 0..=255, waveform samples are centred on 128.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    pub frequency: Vec<u8>,
    pub waveform: Vec<u8>,
    pub captured_at: Instant,
}

impl Spectrum {
    pub fn new(frequency: Vec<u8>, waveform: Vec<u8>) -> Self {
        Self {
            frequency,
            waveform,
            captured_at: Instant::now(),
        }
    }

    pub fn bin_count(&self) -> usize {
        self.frequency.len()
    }

    /// Mean of the bins in `[floor(n*start), floor(n*end))`. Empty bands average to 0.
    pub fn band_average(&self, start: f32, end: f32) -> f32 {
        let n = self.frequency.len() as f32;
        let lo = (n * start.clamp(0.0, 1.0)).floor() as usize;
        let hi = (n * end.clamp(0.0, 1.0)).floor() as usize;
        if hi <= lo {
            return 0.0;
        }
        let sum: u32 = self.frequency[lo..hi].iter().map(|&v| u32::from(v)).sum();
        sum as f32 / (hi - lo) as f32
    }

    /// Average of the first 10% of bins.
    pub fn bass_level(&self) -> f32 {
        self.band_average(0.0, 0.1)
    }

    /// Average of bins between 10% and 30%.
    pub fn voice_level(&self) -> f32 {
        self.band_average(0.1, 0.3)
    }

    /// Index of the loudest bin, if any bin is non-zero. Ties go to the lowest bin.
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, u8)> = None;
        for (i, &v) in self.frequency.iter().enumerate() {
            if v > best.map_or(0, |(_, b)| b) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Normalized response above a threshold: `(level - threshold) / (255 - threshold)`, or 0.
pub fn response_above(level: f32, threshold: f32) -> f32 {
    if level <= threshold || threshold >= 255.0 {
        return 0.0;
    }
    ((level - threshold) / (255.0 - threshold)).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/spectrum.rs"]
mod tests;
