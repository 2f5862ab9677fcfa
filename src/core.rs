use crate::error::{ScrubError, ScrubResult};

pub use kurbo::Vec2;

/// Zero-based index into a frame sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub usize);

/// Viewport dimensions in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Clamp a progress value into the canonical [0, 1] interval.
///
/// NaN maps to 0 so a corrupt input can never poison downstream interpolation.
pub fn clamp_progress(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

pub(crate) fn ensure_finite(value: f64, what: &str) -> ScrubResult<()> {
    if !value.is_finite() {
        return Err(ScrubError::configuration(format!(
            "{what} must be finite, got {value}"
        )));
    }
    Ok(())
}
