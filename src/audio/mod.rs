//! Audio analysis unit: PCM in, byte spectra out, on its own thread.

pub mod analyzer;
pub mod feed;
pub mod spectrum;
