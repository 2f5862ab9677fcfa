use std::path::PathBuf;

use anyhow::Context;

use crate::{
    assets::{PreparedImage, decode_image},
    core::FrameIndex,
    error::{ScrubError, ScrubResult},
};

pub const DEFAULT_FRAME_COUNT: usize = 35;

fn default_dir() -> String {
    "sequence".to_string()
}

fn default_ext() -> String {
    "jpg".to_string()
}

fn default_frame_count() -> usize {
    DEFAULT_FRAME_COUNT
}

/// Addressing scheme for an ordered, fixed-length image sequence.
///
/// Primary frames live at `{dir}/{name}_{index:03}.{ext}`. The fallback for a
/// failed frame is a deterministic URL keyed by `fallback_seed` plus the same
/// index, so retries are idempotent and reproducible.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SequenceSpec {
    #[serde(default = "default_dir")]
    pub dir: String,
    pub name: String,
    #[serde(default = "default_ext")]
    pub ext: String,
    pub fallback_seed: String,
    #[serde(default = "default_frame_count")]
    pub frame_count: usize,
}

impl SequenceSpec {
    pub fn validate(&self) -> ScrubResult<()> {
        if self.frame_count == 0 {
            return Err(ScrubError::configuration("frame_count must be >= 1"));
        }
        for (field, value) in [
            ("dir", &self.dir),
            ("name", &self.name),
            ("ext", &self.ext),
            ("fallback_seed", &self.fallback_seed),
        ] {
            if value.trim().is_empty() {
                return Err(ScrubError::configuration(format!(
                    "sequence {field} must be non-empty"
                )));
            }
        }
        Ok(())
    }

    pub fn primary_url(&self, index: FrameIndex) -> String {
        format!("{}/{}_{:03}.{}", self.dir, self.name, index.0, self.ext)
    }

    pub fn fallback_url(&self, index: FrameIndex) -> String {
        format!(
            "https://picsum.photos/seed/{}-{}/1920/1080?grayscale",
            self.fallback_seed, index.0
        )
    }
}

/// Transport seam for frame bytes. Errors returned here are recovered inside
/// the sequence (fallback substitution, then silent degradation) and never
/// reach the host.
pub trait FrameFetcher {
    fn fetch(&mut self, url: &str) -> ScrubResult<Vec<u8>>;
}

/// Filesystem-backed fetcher resolving primary paths against a root
/// directory. Remote fallback URLs have no transport here and report a
/// resource error, which the sequence degrades to a missing frame.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FrameFetcher for FsFetcher {
    fn fetch(&mut self, url: &str) -> ScrubResult<Vec<u8>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(ScrubError::resource(format!(
                "no transport for remote url '{url}'"
            )));
        }
        let path = self.root.join(url);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read frame '{}'", path.display()))?;
        Ok(bytes)
    }
}

/// Per-frame load state.
///
/// `Pending -> Loaded | FallbackPending -> FallbackLoaded | Missing`.
/// A failed primary schedules exactly one fallback attempt; a failed fallback
/// leaves the frame permanently missing and it is skipped on render.
#[derive(Clone, Debug)]
pub enum FrameSlot {
    Pending,
    Loaded(PreparedImage),
    FallbackPending,
    FallbackLoaded(PreparedImage),
    Missing,
}

impl FrameSlot {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Loaded(_) | Self::FallbackLoaded(_) | Self::Missing
        )
    }

    pub fn image(&self) -> Option<&PreparedImage> {
        match self {
            Self::Loaded(img) | Self::FallbackLoaded(img) => Some(img),
            Self::Pending | Self::FallbackPending | Self::Missing => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceState {
    Unloaded,
    Loading,
    Ready,
}

/// One outstanding load request the host should satisfy and feed back via
/// [`FrameSequence::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRequest {
    pub index: FrameIndex,
    pub url: String,
}

/// Ordered, fixed-length frame collection with a counting completion
/// barrier: the sequence becomes `Ready` once every slot reaches a terminal
/// state, regardless of the order completions arrive in.
pub struct FrameSequence {
    spec: SequenceSpec,
    slots: Vec<FrameSlot>,
    pending: usize,
    state: SequenceState,
}

impl FrameSequence {
    pub fn new(spec: SequenceSpec) -> ScrubResult<Self> {
        spec.validate()?;
        let n = spec.frame_count;
        Ok(Self {
            spec,
            slots: vec![FrameSlot::Pending; n],
            pending: n,
            state: SequenceState::Unloaded,
        })
    }

    pub fn spec(&self) -> &SequenceSpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn slot(&self, index: FrameIndex) -> Option<&FrameSlot> {
        self.slots.get(index.0)
    }

    /// Decoded image for a frame, if it reached a loaded terminal state.
    pub fn frame(&self, index: FrameIndex) -> Option<&PreparedImage> {
        self.slots.get(index.0).and_then(FrameSlot::image)
    }

    /// Start loading: emits the initial primary request per index, in index
    /// order. Idempotent; subsequent calls return nothing.
    pub fn begin_preload(&mut self) -> Vec<FrameRequest> {
        if self.state != SequenceState::Unloaded {
            return Vec::new();
        }
        self.state = SequenceState::Loading;
        (0..self.slots.len())
            .map(|i| FrameRequest {
                index: FrameIndex(i),
                url: self.spec.primary_url(FrameIndex(i)),
            })
            .collect()
    }

    /// Feed one load outcome back into the sequence.
    ///
    /// Completions may arrive in any order. A primary failure returns the
    /// follow-up fallback request; every other outcome returns `None`.
    /// Out-of-range indices and already-terminal slots are guarded no-ops so
    /// a late callback after teardown or duplicate delivery cannot corrupt
    /// state.
    pub fn complete(
        &mut self,
        index: FrameIndex,
        outcome: ScrubResult<Vec<u8>>,
    ) -> Option<FrameRequest> {
        let Some(slot) = self.slots.get_mut(index.0) else {
            tracing::warn!(index = index.0, "completion for out-of-range frame");
            return None;
        };
        if slot.is_terminal() {
            return None;
        }

        let on_fallback = matches!(slot, FrameSlot::FallbackPending);
        match outcome.and_then(|bytes| decode_image(&bytes)) {
            Ok(img) => {
                *slot = if on_fallback {
                    FrameSlot::FallbackLoaded(img)
                } else {
                    FrameSlot::Loaded(img)
                };
                self.finish_one();
                None
            }
            Err(err) if on_fallback => {
                tracing::warn!(index = index.0, %err, "fallback frame failed, frame missing");
                *slot = FrameSlot::Missing;
                self.finish_one();
                None
            }
            Err(err) => {
                tracing::debug!(index = index.0, %err, "primary frame failed, trying fallback");
                *slot = FrameSlot::FallbackPending;
                Some(FrameRequest {
                    index,
                    url: self.spec.fallback_url(index),
                })
            }
        }
    }

    fn finish_one(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            self.state = SequenceState::Ready;
            tracing::debug!(frames = self.slots.len(), "frame sequence ready");
        }
    }

    /// Drive the full preload synchronously through a fetcher. Individual
    /// frame failures are recovered internally and never escape.
    #[tracing::instrument(skip(self, fetcher))]
    pub fn preload<F: FrameFetcher>(&mut self, fetcher: &mut F) {
        for request in self.begin_preload() {
            let outcome = fetcher.fetch(&request.url);
            if let Some(fallback) = self.complete(request.index, outcome) {
                let outcome = fetcher.fetch(&fallback.url);
                self.complete(fallback.index, outcome);
            }
        }
    }
}
