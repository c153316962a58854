//! Animation Driver - Frame-cadence value animations
//!
//! The host owns the clock. A [`FrameDriver`] keeps every running
//! [`Animation`] and advances them when the host calls [`FrameDriver::tick`]
//! once per frame.
//!
//! # Pattern
//!
//! - An animation groups one or more tracks that share a duration and easing
//!   (they play together) plus one optional completion callback
//! - Within a tick every update callback runs before any completion callback
//! - Cancelling an animation drops it without running its completion
//! - Callbacks run with no driver state borrowed, so they may start or cancel
//!   animations themselves
//!
//! # Example
//!
//! ```ignore
//! use spark_collapsible::state::animate::{Animation, AnimationDriver, FrameDriver};
//! use std::time::Duration;
//!
//! let driver = FrameDriver::new();
//! driver.start(
//!     Animation::new(Duration::from_millis(300))
//!         .track(0.0, 10.0, |v| println!("height {v}"))
//!         .on_end(|| println!("done")),
//! );
//!
//! // In the host's frame loop
//! driver.tick(Duration::from_millis(16));
//! ```

use std::cell::{Cell, RefCell};
use std::f32::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

// =============================================================================
// TYPES
// =============================================================================

/// Handle to a started animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

/// Time interpolation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Slow start and end, cosine shaped.
    #[default]
    AccelerateDecelerate,
}

impl Easing {
    /// Map linear progress (0.0 - 1.0) to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
        }
    }
}

/// One interpolated property.
struct Track {
    from: f32,
    to: f32,
    on_update: Box<dyn FnMut(f32)>,
}

/// A group of duration-matched tracks with a single completion.
pub struct Animation {
    duration: Duration,
    easing: Easing,
    tracks: Vec<Track>,
    on_end: Option<Box<dyn FnOnce()>>,
}

impl Animation {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::default(),
            tracks: Vec::new(),
            on_end: None,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Add a track interpolating `from` → `to`, reporting every frame.
    pub fn track(mut self, from: f32, to: f32, on_update: impl FnMut(f32) + 'static) -> Self {
        self.tracks.push(Track {
            from,
            to,
            on_update: Box::new(on_update),
        });
        self
    }

    /// Run once after the final frame, unless cancelled first.
    pub fn on_end(mut self, on_end: impl FnOnce() + 'static) -> Self {
        self.on_end = Some(Box::new(on_end));
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Animation service consumed by components.
pub trait AnimationDriver {
    fn start(&self, animation: Animation) -> AnimationId;

    /// Stop an animation without running its completion.
    ///
    /// Returns false if it already finished or was never started.
    fn cancel(&self, id: AnimationId) -> bool;

    fn is_running(&self, id: AnimationId) -> bool;
}

// =============================================================================
// FRAME DRIVER
// =============================================================================

struct Running {
    id: AnimationId,
    cancelled: Cell<bool>,
    elapsed: Cell<Duration>,
    animation: RefCell<Animation>,
}

#[derive(Default)]
struct DriverState {
    next_id: u64,
    running: Vec<Rc<Running>>,
}

/// Single-threaded animation driver advanced by the host's frame loop.
#[derive(Default)]
pub struct FrameDriver {
    state: RefCell<DriverState>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of animations still running.
    pub fn running_count(&self) -> usize {
        self.state.borrow().running.len()
    }

    pub fn is_idle(&self) -> bool {
        self.running_count() == 0
    }

    /// Advance every running animation by `dt`.
    ///
    /// Returns the number of animations still running afterwards.
    pub fn tick(&self, dt: Duration) -> usize {
        let snapshot: Vec<Rc<Running>> = self.state.borrow().running.clone();
        let mut finished = Vec::new();

        for running in &snapshot {
            if running.cancelled.get() {
                continue;
            }

            let elapsed = running.elapsed.get().saturating_add(dt);
            running.elapsed.set(elapsed);

            let mut animation = running.animation.borrow_mut();
            let progress = if animation.duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f32() / animation.duration.as_secs_f32()).min(1.0)
            };
            let eased = animation.easing.apply(progress);

            for track in animation.tracks.iter_mut() {
                if running.cancelled.get() {
                    break;
                }
                let value = track.from + (track.to - track.from) * eased;
                (track.on_update)(value);
            }

            if progress >= 1.0 {
                finished.push(running.clone());
            }
        }

        if !finished.is_empty() {
            self.state
                .borrow_mut()
                .running
                .retain(|r| !finished.iter().any(|f| f.id == r.id));
        }

        for running in finished {
            if running.cancelled.get() {
                trace!(id = running.id.0, "animation cancelled during its final frame");
                continue;
            }
            let on_end = running.animation.borrow_mut().on_end.take();
            if let Some(on_end) = on_end {
                on_end();
            }
        }

        self.running_count()
    }

    /// Tick until nothing is running, at a fixed frame interval.
    ///
    /// Returns the number of frames run. Gives up after `max_frames`.
    pub fn run_to_completion(&self, frame: Duration, max_frames: usize) -> usize {
        let mut frames = 0;
        while !self.is_idle() && frames < max_frames {
            self.tick(frame);
            frames += 1;
        }
        frames
    }
}

impl AnimationDriver for FrameDriver {
    fn start(&self, animation: Animation) -> AnimationId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = AnimationId(state.next_id);
        trace!(
            id = id.0,
            duration_ms = animation.duration.as_millis() as u64,
            tracks = animation.tracks.len(),
            "animation started"
        );
        state.running.push(Rc::new(Running {
            id,
            cancelled: Cell::new(false),
            elapsed: Cell::new(Duration::ZERO),
            animation: RefCell::new(animation),
        }));
        id
    }

    fn cancel(&self, id: AnimationId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.running.iter().position(|r| r.id == id) else {
            return false;
        };
        let running = state.running.remove(pos);
        running.cancelled.set(true);
        trace!(id = id.0, "animation cancelled");
        true
    }

    fn is_running(&self, id: AnimationId) -> bool {
        self.state.borrow().running.iter().any(|r| r.id == id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
