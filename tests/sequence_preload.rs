use scrubline::{
    FrameFetcher, FrameIndex, FrameSlot, FrameSequence, ScrubError, ScrubResult, SequenceSpec,
    SequenceState,
};

fn spec(frame_count: usize) -> SequenceSpec {
    SequenceSpec {
        dir: "sequence".into(),
        name: "grove".into(),
        ext: "jpg".into(),
        fallback_seed: "forest".into(),
        frame_count,
    }
}

fn png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn primary_index(url: &str) -> Option<usize> {
    let stem = url.rsplit('_').next()?;
    stem.split('.').next()?.parse().ok()
}

fn fallback_index(url: &str) -> Option<usize> {
    let seeded = url.split("seed/forest-").nth(1)?;
    seeded.split('/').next()?.parse().ok()
}

/// Records every request; fails primaries for the configured indices and
/// fallbacks for a second set.
struct ScriptedFetcher {
    fail_primary: fn(usize) -> bool,
    fail_fallback: fn(usize) -> bool,
    requests: Vec<String>,
}

impl ScriptedFetcher {
    fn new(fail_primary: fn(usize) -> bool, fail_fallback: fn(usize) -> bool) -> Self {
        Self {
            fail_primary,
            fail_fallback,
            requests: Vec::new(),
        }
    }
}

impl FrameFetcher for ScriptedFetcher {
    fn fetch(&mut self, url: &str) -> ScrubResult<Vec<u8>> {
        self.requests.push(url.to_string());
        if let Some(i) = fallback_index(url) {
            return if (self.fail_fallback)(i) {
                Err(ScrubError::resource(format!("fallback {i} unavailable")))
            } else {
                Ok(png_bytes(200))
            };
        }
        let i = primary_index(url).expect("primary url shape");
        if (self.fail_primary)(i) {
            Err(ScrubError::resource(format!("primary {i} missing")))
        } else {
            Ok(png_bytes(i as u8))
        }
    }
}

#[test]
fn every_fifth_primary_failing_still_reaches_ready() {
    let mut seq = FrameSequence::new(spec(35)).unwrap();
    let mut fetcher = ScriptedFetcher::new(|i| i % 5 == 0, |_| false);
    seq.preload(&mut fetcher);

    assert_eq!(seq.state(), SequenceState::Ready);
    for i in 0..35 {
        let slot = seq.slot(FrameIndex(i)).unwrap();
        if i % 5 == 0 {
            assert!(matches!(slot, FrameSlot::FallbackLoaded(_)), "frame {i}");
        } else {
            assert!(matches!(slot, FrameSlot::Loaded(_)), "frame {i}");
        }
        assert!(seq.frame(FrameIndex(i)).is_some(), "frame {i}");
    }

    // 35 primaries plus one fallback per failed index (0,5,...,30).
    assert_eq!(fetcher.requests.len(), 35 + 7);
}

#[test]
fn frame_with_no_primary_and_no_fallback_degrades_silently() {
    let mut seq = FrameSequence::new(spec(6)).unwrap();
    let mut fetcher = ScriptedFetcher::new(|i| i == 3, |i| i == 3);
    seq.preload(&mut fetcher);

    assert_eq!(seq.state(), SequenceState::Ready);
    assert!(matches!(seq.slot(FrameIndex(3)), Some(FrameSlot::Missing)));
    assert!(seq.frame(FrameIndex(3)).is_none());
    for i in [0, 1, 2, 4, 5] {
        assert!(seq.frame(FrameIndex(i)).is_some());
    }
}

#[test]
fn fallback_requests_are_deterministic_across_runs() {
    let run = || {
        let mut seq = FrameSequence::new(spec(10)).unwrap();
        let mut fetcher = ScriptedFetcher::new(|i| i % 2 == 0, |_| false);
        seq.preload(&mut fetcher);
        fetcher
            .requests
            .iter()
            .filter(|u| u.contains("picsum"))
            .cloned()
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn preload_never_panics_when_everything_fails() {
    let mut seq = FrameSequence::new(spec(35)).unwrap();
    let mut fetcher = ScriptedFetcher::new(|_| true, |_| true);
    seq.preload(&mut fetcher);

    assert_eq!(seq.state(), SequenceState::Ready);
    for i in 0..35 {
        assert!(matches!(seq.slot(FrameIndex(i)), Some(FrameSlot::Missing)));
    }
}
