use std::{
    cell::{Ref, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use crate::{
    anim::{SectionStyle, SectionTracks},
    anim_spring::{Spring, SpringConfig},
    core::{Viewport, clamp_progress},
    error::{ScrubError, ScrubResult},
    player::SequencePlayer,
    scroll::{ProgressCell, ScrollRange, Subscription},
    sequence::{FrameFetcher, SequenceSpec},
};

/// Declarative scene description: spring parameters, the background frame
/// sequence, and per-section breakpoint tracks keyed by section name.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneSpec {
    #[serde(default)]
    pub spring: SpringConfig,
    pub sequence: SequenceSpec,
    #[serde(default)]
    pub sections: BTreeMap<String, SectionTracks>,
}

impl SceneSpec {
    pub fn from_json(json: &str) -> ScrubResult<Self> {
        let spec: Self =
            serde_json::from_str(json).map_err(|e| ScrubError::serde(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Fail fast on any configuration defect before the scene runs.
    pub fn validate(&self) -> ScrubResult<()> {
        self.spring.validate()?;
        self.sequence.validate()?;
        for (name, tracks) in &self.sections {
            if name.trim().is_empty() {
                return Err(ScrubError::configuration("section name must be non-empty"));
            }
            tracks
                .validate()
                .map_err(|e| ScrubError::configuration(format!("section '{name}': {e}")))?;
        }
        Ok(())
    }
}

/// The assembled core: raw scroll offsets in, smoothed progress out to the
/// section mapper and the frame player.
///
/// All work runs on the caller's single thread. `on_scroll` only retargets
/// the spring; `tick` advances the filter once and publishes through the
/// smoothed cell, which fans out to the style recompute and the canvas
/// redraw. Once the spring settles, ticks stop doing work until the next
/// scroll event.
pub struct ScrollScene {
    range: ScrollRange,
    spring: Spring,
    smoothed: ProgressCell,
    styles: Rc<RefCell<BTreeMap<String, SectionStyle>>>,
    player: Rc<RefCell<SequencePlayer>>,
    _subscriptions: Vec<Subscription>,
}

impl ScrollScene {
    pub fn new(spec: &SceneSpec, range: ScrollRange, viewport: Viewport) -> ScrubResult<Self> {
        spec.validate()?;

        let spring = Spring::new(spec.spring, 0.0)?;
        let smoothed = ProgressCell::new(0.0);
        let player = Rc::new(RefCell::new(SequencePlayer::new(
            spec.sequence.clone(),
            viewport,
        )?));
        let sections = Rc::new(spec.sections.clone());
        let styles = Rc::new(RefCell::new(BTreeMap::new()));

        // Both consumers see the mount state immediately via the cell's
        // fire-on-subscribe contract.
        let mut subscriptions = Vec::new();
        {
            let sections = sections.clone();
            let styles = styles.clone();
            subscriptions.push(smoothed.subscribe(move |p| {
                let mut map = styles.borrow_mut();
                for (name, tracks) in sections.iter() {
                    map.insert(name.clone(), tracks.sample(p));
                }
            }));
        }
        {
            let player = player.clone();
            subscriptions.push(smoothed.subscribe(move |p| {
                player.borrow_mut().set_progress(p);
            }));
        }

        Ok(Self {
            range,
            spring,
            smoothed,
            styles,
            player,
            _subscriptions: subscriptions,
        })
    }

    /// Load the background sequence, then surface the current frame so a
    /// sequence that becomes ready mid-scroll shows up without waiting for
    /// the next progress change.
    pub fn preload<F: FrameFetcher>(&mut self, fetcher: &mut F) {
        let mut player = self.player.borrow_mut();
        player.preload(fetcher);
        player.set_progress(self.smoothed.get());
    }

    /// Feed a raw scroll offset. Retargets the spring only; smoothing and
    /// fan-out happen on the next `tick`.
    pub fn on_scroll(&mut self, offset: f64) {
        self.spring.set_target(self.range.progress(offset));
    }

    /// Advance the smoothing filter by `dt` seconds and publish the result.
    /// Returns whether the spring is still converging, so hosts can stop
    /// ticking a settled scene.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.spring.is_settled() {
            return false;
        }
        let value = clamp_progress(self.spring.step(dt));
        self.smoothed.set(value);
        !self.spring.is_settled()
    }

    pub fn smoothed(&self) -> f64 {
        self.smoothed.get()
    }

    /// Observable smoothed-progress cell for additional consumers.
    pub fn progress_cell(&self) -> &ProgressCell {
        &self.smoothed
    }

    pub fn style(&self, section: &str) -> Option<SectionStyle> {
        self.styles.borrow().get(section).copied()
    }

    pub fn styles(&self) -> BTreeMap<String, SectionStyle> {
        self.styles.borrow().clone()
    }

    pub fn player(&self) -> Ref<'_, SequencePlayer> {
        self.player.borrow()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.player.borrow_mut().resize(viewport);
    }
}
