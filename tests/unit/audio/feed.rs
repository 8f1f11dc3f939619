use super::*;
use std::time::Instant;

fn wait_for<T>(mut f: impl FnMut() -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(v) = f() {
            return Some(v);
        }
        thread::sleep(Duration::from_millis(2));
    }
    None
}

struct Broken;

impl PcmSource for Broken {
    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn read(&mut self, _buf: &mut [f32]) -> FxResult<usize> {
        Err(FxError::unavailable("microphone unplugged"))
    }
}

struct Finite(usize);

impl PcmSource for Finite {
    fn sample_rate(&self) -> u32 {
        8_000
    }

    fn read(&mut self, buf: &mut [f32]) -> FxResult<usize> {
        let n = self.0.min(buf.len());
        buf[..n].fill(0.25);
        self.0 -= n;
        Ok(n)
    }
}

#[test]
fn tone_feed_publishes_expected_peak() {
    let config = AnalyzerConfig {
        smoothing: 0.0,
        ..AnalyzerConfig::default()
    };
    let source = ToneSource::new(3000.0, 0.5, 48_000);
    let mut feed = AudioFeed::start(Box::new(source), config, false).unwrap();
    // Wait until the window has filled with tone.
    let spectrum = wait_for(|| feed.latest().filter(|s| s.peak_bin() == Some(16)));
    assert!(spectrum.is_some());
    assert!(feed.is_running());

    feed.stop();
    feed.stop();
    assert!(!feed.is_running());
    assert!(feed.latest().is_none());
}

#[test]
fn source_failure_is_reported() {
    let mut feed = AudioFeed::start(Box::new(Broken), AnalyzerConfig::default(), false).unwrap();
    let failure = wait_for(|| feed.failure());
    assert!(failure.unwrap().contains("unplugged"));
    feed.stop();
}

#[test]
fn exhausted_source_ends_worker() {
    let feed = AudioFeed::start(Box::new(Finite(300)), AnalyzerConfig::default(), false).unwrap();
    assert!(wait_for(|| (!feed.is_running()).then_some(())).is_some());
    assert!(feed.failure().is_none());
    assert!(feed.latest().is_some());
}

#[test]
fn tone_source_is_continuous() {
    let mut t = ToneSource::new(1000.0, 1.0, 8000);
    let mut a = [0.0f32; 5];
    let mut b = [0.0f32; 5];
    t.read(&mut a).unwrap();
    t.read(&mut b).unwrap();
    assert_eq!(a[0], 0.0);
    // 8 samples per period: sample 4 and 8 cross zero.
    assert!(a[4].abs() < 1e-5);
    assert!((b[1] - (std::f32::consts::TAU * 6.0 / 8.0).sin()).abs() < 1e-5);
}
