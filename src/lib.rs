#![forbid(unsafe_code)]

pub mod anim;
pub mod anim_spring;
pub mod assets;
pub mod core;
pub mod error;
pub mod player;
pub mod scene;
pub mod scroll;
pub mod sequence;
pub mod surface;

pub use anim::{Breakpoints, Lerp, SectionStyle, SectionTracks};
pub use anim_spring::{Spring, SpringConfig};
pub use assets::{PreparedImage, decode_image};
pub use crate::core::{FrameIndex, Vec2, Viewport, clamp_progress};
pub use error::{ScrubError, ScrubResult};
pub use player::{RenderOutcome, SequencePlayer, select_frame};
pub use scene::{SceneSpec, ScrollScene};
pub use scroll::{ProgressCell, ScrollRange, Subscription};
pub use sequence::{
    DEFAULT_FRAME_COUNT, FrameFetcher, FrameRequest, FrameSequence, FrameSlot, FsFetcher,
    SequenceSpec, SequenceState,
};
pub use surface::{CoverFit, Surface, cover_fit};
