use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

/// Identifier of a pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host capability that delivers frame callbacks, one per display refresh.
///
/// The host calls back into [`crate::PlaybackDriver::tick`] with the handle
/// returned by `request_frame` once the frame is due.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Result of waiting for one display refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refresh {
    /// Milliseconds since the clock was created.
    pub at_ms: f64,
    /// Callback that fires on this refresh, if one was requested.
    pub due: Option<FrameHandle>,
}

/// Fixed-rate stand-in for the display's frame-presentation callback.
pub struct DisplayClock {
    ticker: Receiver<Instant>,
    origin: Instant,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl DisplayClock {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            ticker: crossbeam_channel::tick(refresh_interval),
            origin: Instant::now(),
            next_id: 0,
            pending: None,
        }
    }

    /// Blocks until the next refresh and hands out the callback due on it.
    pub fn next_refresh(&mut self) -> Refresh {
        let now = self.ticker.recv().unwrap_or_else(|_| Instant::now());
        Refresh {
            at_ms: now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0,
            due: self.pending.take(),
        }
    }

}

impl FrameScheduler for DisplayClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(previous) = self.pending.replace(handle) {
            tracing::warn!(?previous, ?handle, "frame requested while another was pending");
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
