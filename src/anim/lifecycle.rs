//! Explicit start/stop handles for per-frame animations.
//!
//! egui repaints on demand, so an animation only keeps advancing while its
//! [`FrameLoop`] is running and the owner keeps requesting repaints. Every
//! running loop is counted in a shared [`LoopRegistry`]; after teardown the
//! count must be back to zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Frame rate the per-frame constants are tuned for.
pub const REFERENCE_FPS: f32 = 60.0;

/// Longest catch-up applied by a single tick, in reference frames.
pub const MAX_STEP_FRAMES: f32 = 4.0;

/// Counts live frame loops.
#[derive(Debug, Clone, Default)]
pub struct LoopRegistry {
    live: Arc<AtomicUsize>,
}

impl LoopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct FrameLoop {
    name: &'static str,
    registry: LoopRegistry,
    running: bool,
    last: Option<Instant>,
}

impl FrameLoop {
    /// A stopped loop registered with `registry`.
    pub fn new(name: &'static str, registry: &LoopRegistry) -> Self {
        Self {
            name,
            registry: registry.clone(),
            running: false,
            last: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last = None;
        self.registry.live.fetch_add(1, Ordering::SeqCst);
        log::debug!("frame loop '{}' started", self.name);
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.last = None;
        self.registry.live.fetch_sub(1, Ordering::SeqCst);
        log::debug!("frame loop '{}' stopped", self.name);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance to `now`. Returns the elapsed time in reference frames
    /// (1.0 on the first tick, capped at [`MAX_STEP_FRAMES`]), or `None`
    /// when stopped.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if !self.running {
            return None;
        }
        let frames = match self.last {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32() * REFERENCE_FPS,
            None => 1.0,
        };
        self.last = Some(now);
        Some(frames.min(MAX_STEP_FRAMES))
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
