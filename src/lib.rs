//! # spark-collapsible
//!
//! Collapsible text for terminal UIs.
//!
//! Body text is shown capped to a few lines. When it needs more, an expand
//! control appears and a click animates the container open (and closed
//! again), fading the text in and cross-fading a gradient overlay.
//!
//! The component is headless: the host supplies text measurement, an
//! animation clock, a post-layout task queue and icon resolution through
//! [`HostServices`], and decides when to lay out and paint. [`TerminalHost`]
//! bundles cell-grid implementations of all four.
//!
//! ## Modules
//!
//! - [`collapse`] - The component, its state machine and measurement engine
//! - [`config`] - Style data and validated configuration
//! - [`layout`] - Text measurement and the container's Taffy layout pass
//! - [`state`] - Animation driver, deferred queue, lifecycle guard, input
//! - [`resources`] - Icon resolution
//! - [`view`] - Painting a committed frame through crossterm
//! - [`types`] - Colors, insets, bounds and presentation enums

pub mod collapse;
pub mod config;
pub mod error;
pub mod host;
pub mod layout;
pub mod resources;
pub mod state;
pub mod types;
pub mod view;

// Re-export commonly used items
pub use collapse::{CollapseState, CollapsibleText, Direction, FrameSnapshot, Presentation};
pub use config::{Configuration, StyleAttributes};
pub use error::{CollapsibleError, Result};
pub use host::{HostServices, TerminalHost};
pub use layout::{CellTextMeasurer, ContainerMetrics, TextMeasurer};
pub use resources::{GlyphIcons, Icon, IconResolver, IconSource};
pub use state::{AnimationDriver, DeferredQueue, FrameDriver, Scheduler};
pub use types::*;
