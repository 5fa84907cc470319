use cardconfig::{CardConfig, SplitAxis};
use image::RgbaImage;
use renderer::{FrameRenderer, Orientation, RenderError};

use crate::scheduler::{FrameHandle, FrameScheduler};

/// What the driver needs to know about the video element.
pub trait VideoSource {
    fn is_paused(&self) -> bool;
    fn is_ended(&self) -> bool;
    /// Latest decoded frame; `None` until the first frame is available.
    fn current_frame(&self) -> Option<&RgbaImage>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub fps: f32,
    pub scale: f32,
    pub orientation: Orientation,
}

impl PlaybackSettings {
    pub fn from_config(config: &CardConfig) -> Self {
        Self {
            fps: config.playback.fps,
            scale: config.playback.scale,
            orientation: match config.render.orientation {
                SplitAxis::Horizontal => Orientation::Horizontal,
                SplitAxis::Vertical => Orientation::Vertical,
            },
        }
    }

    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.fps)
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self::from_config(&CardConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was uploaded and drawn; the next tick is scheduled.
    Drew,
    /// Not due yet; rescheduled without drawing.
    Waiting,
    /// The video was paused or ended; the loop stopped.
    Stopped,
    /// The handle is not the one currently pending; ignored.
    Stale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub ticks: u64,
    pub draws: u64,
    pub waits: u64,
    pub stale: u64,
}

/// Frame-rate gated draw loop.
///
/// Holds at most one pending [`FrameHandle`]. Every tick that finds the video
/// playing reschedules itself; it only draws once more than
/// `1000 / fps` milliseconds have passed since the last drawn frame. The
/// first playing tick always draws.
pub struct PlaybackDriver {
    settings: PlaybackSettings,
    state: PlaybackState,
    pending: Option<FrameHandle>,
    last_draw_ms: Option<f64>,
    stats: PlaybackStats,
}

impl PlaybackDriver {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            state: PlaybackState::Idle,
            pending: None,
            last_draw_ms: None,
            stats: PlaybackStats::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    pub fn orientation(&self) -> Orientation {
        self.settings.orientation
    }

    /// Takes effect on the next drawn frame.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.settings.orientation = orientation;
    }

    /// Starts the loop. Returns `false` when a callback is already pending.
    pub fn on_play<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.state = PlaybackState::Playing;
        self.pending = Some(scheduler.request_frame());
        tracing::debug!(pending = ?self.pending, "playback started");
        true
    }

    /// Stops the loop, cancelling the pending callback. Returns whether one
    /// was cancelled.
    pub fn on_pause<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
        self.state = PlaybackState::Idle;
        match self.pending.take() {
            Some(handle) => {
                scheduler.cancel_frame(handle);
                tracing::debug!(?handle, "playback paused");
                true
            }
            None => false,
        }
    }

    pub fn on_ended<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
        self.on_pause(scheduler)
    }

    /// Cancels any pending callback and consumes the driver.
    pub fn teardown<S: FrameScheduler>(mut self, scheduler: &mut S) -> PlaybackStats {
        self.on_pause(scheduler);
        self.stats
    }

    /// Handles the frame callback for `handle` fired at `now_ms`.
    pub fn tick<V, R, S>(
        &mut self,
        handle: FrameHandle,
        now_ms: f64,
        video: &V,
        renderer: &mut R,
        scheduler: &mut S,
    ) -> Result<TickOutcome, RenderError>
    where
        V: VideoSource + ?Sized,
        R: FrameRenderer + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        if self.pending != Some(handle) {
            self.stats.stale += 1;
            return Ok(TickOutcome::Stale);
        }
        self.pending = None;
        self.stats.ticks += 1;

        if self.state != PlaybackState::Playing || video.is_paused() || video.is_ended() {
            self.state = PlaybackState::Idle;
            return Ok(TickOutcome::Stopped);
        }

        let due = match self.last_draw_ms {
            Some(last) => now_ms - last > self.settings.frame_interval_ms(),
            None => true,
        };
        let outcome = if due {
            self.last_draw_ms = Some(now_ms);
            if let Err(err) = self.draw(video, renderer) {
                self.state = PlaybackState::Idle;
                return Err(err);
            }
            self.stats.draws += 1;
            TickOutcome::Drew
        } else {
            self.stats.waits += 1;
            TickOutcome::Waiting
        };

        self.pending = Some(scheduler.request_frame());
        Ok(outcome)
    }

    fn draw<V, R>(&self, video: &V, renderer: &mut R) -> Result<(), RenderError>
    where
        V: VideoSource + ?Sized,
        R: FrameRenderer + ?Sized,
    {
        let Some(frame) = video.current_frame() else {
            tracing::trace!("no decoded frame yet");
            return Ok(());
        };
        let orientation = self.settings.orientation;
        let (width, height) =
            orientation.output_size(frame.width(), frame.height(), self.settings.scale);
        renderer.set_texture(frame)?;
        renderer.render(width, height, orientation)
    }
}
