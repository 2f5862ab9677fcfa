use crate::{
    core::Vec2,
    error::{ScrubError, ScrubResult},
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Piecewise-linear control points over normalized scroll progress.
///
/// Progress values must be strictly increasing. Sampling clamps to the first
/// and last point, never extrapolates.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Breakpoints<T> {
    points: Vec<(f64, T)>,
}

impl<T> Breakpoints<T>
where
    T: Lerp + Clone,
{
    pub fn new(points: Vec<(f64, T)>) -> ScrubResult<Self> {
        let bp = Self { points };
        bp.validate()?;
        Ok(bp)
    }

    pub fn validate(&self) -> ScrubResult<()> {
        if self.points.len() < 2 {
            return Err(ScrubError::configuration(
                "breakpoints need at least 2 control points",
            ));
        }
        if self.points.iter().any(|(p, _)| !p.is_finite()) {
            return Err(ScrubError::configuration(
                "breakpoint progress values must be finite",
            ));
        }
        if !self.points.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err(ScrubError::configuration(
                "breakpoint progress values must be strictly increasing",
            ));
        }
        Ok(())
    }

    pub fn points(&self) -> &[(f64, T)] {
        &self.points
    }

    /// Sample the track at `progress`.
    ///
    /// Assumes a validated track; on malformed points this still terminates
    /// and clamps rather than extrapolating.
    pub fn sample(&self, progress: f64) -> T {
        let idx = self.points.partition_point(|(p, _)| *p <= progress);

        if idx == 0 {
            return self.points[0].1.clone();
        }
        if idx >= self.points.len() {
            return self.points[self.points.len() - 1].1.clone();
        }

        let (pa, va) = &self.points[idx - 1];
        let (pb, vb) = &self.points[idx];
        let denom = pb - pa;
        if denom <= 0.0 {
            return va.clone();
        }

        let t = ((progress - pa) / denom).clamp(0.0, 1.0);
        T::lerp(va, vb, t)
    }
}

/// Resolved visual parameters for one page section at a given progress.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SectionStyle {
    pub opacity: f64,
    pub scale: f64,
    pub translate_y: f64,
    pub blur: f64,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            translate_y: 0.0,
            blur: 0.0,
        }
    }
}

/// Independent breakpoint tracks for one section, sharing a single smoothed
/// progress input. Sections may overlap in their active progress ranges to
/// produce cross-fades; overlap is never an error.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SectionTracks {
    pub opacity: Option<Breakpoints<f64>>,
    pub scale: Option<Breakpoints<f64>>,
    pub translate_y: Option<Breakpoints<f64>>,
    pub blur: Option<Breakpoints<f64>>,
}

impl SectionTracks {
    pub fn validate(&self) -> ScrubResult<()> {
        for track in [&self.opacity, &self.scale, &self.translate_y, &self.blur]
            .into_iter()
            .flatten()
        {
            track.validate()?;
        }
        Ok(())
    }

    pub fn sample(&self, progress: f64) -> SectionStyle {
        let default = SectionStyle::default();
        SectionStyle {
            opacity: self
                .opacity
                .as_ref()
                .map_or(default.opacity, |t| t.sample(progress)),
            scale: self
                .scale
                .as_ref()
                .map_or(default.scale, |t| t.sample(progress)),
            translate_y: self
                .translate_y
                .as_ref()
                .map_or(default.translate_y, |t| t.sample(progress)),
            blur: self
                .blur
                .as_ref()
                .map_or(default.blur, |t| t.sample(progress)),
        }
    }
}
