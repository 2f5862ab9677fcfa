use crate::{
    core::{FrameIndex, Viewport, clamp_progress},
    error::ScrubResult,
    sequence::{FrameFetcher, FrameSequence, SequenceSpec, SequenceState},
    surface::Surface,
};

/// Map smoothed progress to a discrete frame index.
///
/// Pure, deterministic and monotonic non-decreasing in progress:
/// `floor(progress * (N-1))` clamped to `[0, N-1]`.
pub fn select_frame(progress: f64, frame_count: usize) -> FrameIndex {
    let n = frame_count.max(1);
    let p = clamp_progress(progress);
    let idx = (p * (n - 1) as f64).floor() as usize;
    FrameIndex(idx.min(n - 1))
}

/// Whether a render call changed the surface. A skip is an expected outcome
/// (unready sequence or missing frame), not an error; previous pixels persist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn,
    Skipped,
}

/// Scrubbable pseudo-video: owns the frame sequence and the canvas surface,
/// and redraws the progress-selected frame cover-fit.
pub struct SequencePlayer {
    sequence: FrameSequence,
    surface: Surface,
    last_index: Option<FrameIndex>,
}

impl SequencePlayer {
    pub fn new(spec: SequenceSpec, viewport: Viewport) -> ScrubResult<Self> {
        Ok(Self {
            sequence: FrameSequence::new(spec)?,
            surface: Surface::new(viewport),
            last_index: None,
        })
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    pub fn sequence_mut(&mut self) -> &mut FrameSequence {
        &mut self.sequence
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn last_index(&self) -> Option<FrameIndex> {
        self.last_index
    }

    pub fn is_ready(&self) -> bool {
        self.sequence.state() == SequenceState::Ready
    }

    /// Drive the full preload through a fetcher; frame failures degrade to
    /// fallbacks or missing frames and never escape.
    pub fn preload<F: FrameFetcher>(&mut self, fetcher: &mut F) {
        self.sequence.preload(fetcher);
    }

    /// Select the frame for `progress` and render it.
    pub fn set_progress(&mut self, progress: f64) -> RenderOutcome {
        let index = select_frame(progress, self.sequence.len());
        self.render(index)
    }

    /// Redraw the frame at `index` cover-fit onto the surface.
    ///
    /// A no-op while the sequence is not `Ready` or the frame never loaded;
    /// the surface keeps its previous contents (no flicker to blank). The
    /// index is still recorded so a later resize redraws the right frame.
    pub fn render(&mut self, index: FrameIndex) -> RenderOutcome {
        self.last_index = Some(index);
        if self.sequence.state() != SequenceState::Ready {
            tracing::trace!(index = index.0, "render skipped: sequence not ready");
            return RenderOutcome::Skipped;
        }
        let Some(img) = self.sequence.frame(index) else {
            tracing::trace!(index = index.0, "render skipped: frame missing");
            return RenderOutcome::Skipped;
        };
        self.surface.draw_cover(img);
        RenderOutcome::Drawn
    }

    /// Resize the surface to the new viewport and immediately re-render the
    /// last-selected frame. Never re-triggers image loading.
    pub fn resize(&mut self, viewport: Viewport) -> RenderOutcome {
        self.surface.resize(viewport);
        match self.last_index {
            Some(index) => self.render(index),
            None => RenderOutcome::Skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_frame_endpoints_and_midpoint() {
        assert_eq!(select_frame(0.0, 35), FrameIndex(0));
        assert_eq!(select_frame(1.0, 35), FrameIndex(34));
        assert_eq!(select_frame(0.5, 35), FrameIndex(17));
    }

    #[test]
    fn select_frame_stays_in_bounds_for_all_progress() {
        for i in 0..=1_000 {
            let p = i as f64 / 1_000.0;
            let idx = select_frame(p, 35);
            assert!(idx.0 < 35);
        }
        assert_eq!(select_frame(-1.0, 35), FrameIndex(0));
        assert_eq!(select_frame(2.0, 35), FrameIndex(34));
        assert_eq!(select_frame(f64::NAN, 35), FrameIndex(0));
    }

    #[test]
    fn select_frame_is_monotonic_non_decreasing() {
        let mut prev = select_frame(0.0, 35);
        for i in 0..=10_000 {
            let p = i as f64 / 10_000.0;
            let idx = select_frame(p, 35);
            assert!(idx >= prev);
            prev = idx;
        }
    }

    #[test]
    fn select_frame_single_frame_sequence() {
        assert_eq!(select_frame(0.0, 1), FrameIndex(0));
        assert_eq!(select_frame(1.0, 1), FrameIndex(0));
    }
}
