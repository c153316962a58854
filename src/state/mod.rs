//! State Module - Host-facing services and lifecycle plumbing
//!
//! - [`animate`] - Frame-cadence animation driver
//! - [`deferred`] - Post-layout task queue
//! - [`lifecycle`] - Clearable back-references for deferred callbacks
//! - [`input`] - Pointer classification over crossterm events

pub mod animate;
pub mod deferred;
pub mod input;
pub mod lifecycle;

pub use animate::{Animation, AnimationDriver, AnimationId, Easing, FrameDriver};
pub use deferred::{DeferredQueue, Scheduler};
pub use input::{classify, is_press_inside, is_pointer_down, PointerAction};
pub use lifecycle::BackRef;
