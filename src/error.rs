//! Error types.
//!
//! Only integration-time mistakes surface as errors. Style data is sanitized
//! on load and lifecycle races are swallowed, so neither appears here.

use thiserror::Error;

use crate::types::Orientation;

#[derive(Error, Debug)]
pub enum CollapsibleError {
    #[error("minimum visible lines is 1, got {0}")]
    InvalidVisibleLineCount(i64),

    #[error("animation duration must not be negative, got {0}ms")]
    NegativeAnimationDuration(i64),

    #[error("alpha should be in range 0.0..=1.0, got {0}")]
    AlphaOutOfRange(f32),

    #[error("collapsible text only supports vertical orientation, got {0}")]
    UnsupportedOrientation(Orientation),

    #[error("invalid style data: {0}")]
    Style(#[from] toml::de::Error),

    #[error("layout failed: {0}")]
    Layout(#[from] taffy::TaffyError),
}

pub type Result<T> = std::result::Result<T, CollapsibleError>;
