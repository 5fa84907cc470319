//! Playback side of the card preview: the frame-rate gated draw loop, the
//! frame scheduler capability it runs on, and the policy deciding whether a
//! source gets the alpha-matte shaders at all.

mod driver;
mod preview;
mod scheduler;

pub use driver::{
    PlaybackDriver, PlaybackSettings, PlaybackState, PlaybackStats, TickOutcome, VideoSource,
};
pub use preview::{Preview, SourceGate};
pub use scheduler::{DisplayClock, FrameHandle, FrameScheduler, Refresh};
