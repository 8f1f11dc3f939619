use super::*;

fn spectrum(bins: Vec<u8>) -> Spectrum {
    let n = bins.len();
    Spectrum::new(bins, vec![128; n * 2])
}

#[test]
fn bass_and_voice_bands_split_bins() {
    let mut bins = vec![0u8; 100];
    bins[..10].fill(200);
    bins[10..30].fill(50);
    let s = spectrum(bins);
    assert_eq!(s.bass_level(), 200.0);
    assert_eq!(s.voice_level(), 50.0);
    assert_eq!(s.band_average(0.5, 0.5), 0.0);
}

#[test]
fn tiny_spectra_have_empty_bass_band() {
    let s = spectrum(vec![255; 5]);
    assert_eq!(s.bass_level(), 0.0);
    assert_eq!(s.peak_bin(), Some(0));
    assert_eq!(spectrum(vec![0; 4]).peak_bin(), None);
}

#[test]
fn peak_bin_prefers_the_lowest_of_equal_bins() {
    assert_eq!(spectrum(vec![10, 255, 255, 3]).peak_bin(), Some(1));
    assert_eq!(spectrum(vec![0, 0, 7, 9, 9]).peak_bin(), Some(3));
}

#[test]
fn response_scales_between_threshold_and_full() {
    assert_eq!(response_above(100.0, 150.0), 0.0);
    assert_eq!(response_above(255.0, 150.0), 1.0);
    assert!((response_above(202.5, 150.0) - 0.5).abs() < 1e-6);
    assert_eq!(response_above(255.0, 255.0), 0.0);
}
