//! Layout Module
//!
//! Text measurement on the terminal cell grid and the container's flexbox
//! layout pass on [Taffy](https://github.com/DioxusLabs/taffy).
//!
//! The collapse engine only ever talks to these through [`TextMeasurer`]
//! and [`compute_container`], so a host with its own text stack swaps in its
//! measurer and keeps the rest.

mod container;
mod text_measure;

pub use container::{compute_container, ContainerMetrics, ContainerSpec, ExpandControlSpec};
pub use text_measure::*;
