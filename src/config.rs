//! Configuration
//!
//! Two sources feed a component's tunables:
//!
//! - [`StyleAttributes`] - passive style data (TOML or any serde source),
//!   read once at construction. Invalid values are sanitized to safe
//!   defaults and logged, never rejected.
//! - Explicit setters on [`Configuration`] - integration-time calls. Invalid
//!   values are rejected with a [`CollapsibleError`].
//!
//! # Example
//!
//! ```
//! use spark_collapsible::config::{Configuration, StyleAttributes};
//!
//! let style = StyleAttributes::from_toml_str(r#"
//!     visible_lines = 3
//!     alpha_start = 2.5
//!     expand_label = "Show more"
//! "#).unwrap();
//!
//! let config = Configuration::from_style(&style);
//! assert_eq!(config.visible_line_count(), 3);
//! assert_eq!(config.alpha_start(), 0.7);
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{CollapsibleError, Result};
use crate::layout::TextStyle;
use crate::resources::IconSource;
use crate::types::{Insets, Rgba};

pub const DEFAULT_VISIBLE_LINES: u16 = 4;
pub const MIN_VISIBLE_LINES: u16 = 1;
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);
pub const DEFAULT_ALPHA_START: f32 = 0.7;
pub const ALPHA_OPAQUE: f32 = 1.0;
pub const ALPHA_TRANSPARENT: f32 = 0.0;
/// Rows the gradient overlay covers at the bottom of the collapsed text.
pub const DEFAULT_GRADIENT_ROWS: u16 = 1;

// =============================================================================
// Style attributes
// =============================================================================

/// Padding as written in style data. Missing sides are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaddingAttr {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl From<PaddingAttr> for Insets {
    fn from(p: PaddingAttr) -> Self {
        Insets::new(p.top, p.right, p.bottom, p.left)
    }
}

/// Passive style data for a collapsible text.
///
/// Every field is optional. Numeric fields are signed so out-of-range
/// values survive deserialization and get sanitized instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleAttributes {
    pub visible_lines: Option<i64>,
    pub animation_duration_ms: Option<i64>,
    pub alpha_start: Option<f32>,

    pub body_text: Option<String>,
    pub body_text_color: Option<String>,
    pub body_text_size: Option<i64>,
    pub body_padding: Option<PaddingAttr>,
    pub container_padding: Option<PaddingAttr>,

    pub show_icon: Option<bool>,
    pub expand_icon: Option<String>,
    pub collapse_icon: Option<String>,
    pub icon_tint: Option<String>,

    pub expand_label: Option<String>,
    pub collapse_label: Option<String>,
    pub label_color: Option<String>,
    pub label_text_size: Option<i64>,

    pub show_gradient: Option<bool>,
    pub gradient: Option<String>,
}

impl StyleAttributes {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Replace an out-of-range alpha with the default.
pub fn sanitize_alpha(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        warn!(alpha = raw, "alpha_start out of range, using default");
        DEFAULT_ALPHA_START
    }
}

fn sanitize_color(field: &str, raw: Option<&str>) -> Option<Rgba> {
    let raw = raw?;
    let color = Rgba::from_hex(raw);
    if color.is_none() {
        warn!(field, value = raw, "unparsable color ignored");
    }
    color
}

fn sanitize_text_size(field: &str, raw: Option<i64>) -> Option<u16> {
    let raw = raw?;
    if raw < 1 {
        warn!(field, value = raw, "text size must be positive, ignored");
        return None;
    }
    Some(raw.min(u16::MAX as i64) as u16)
}

// =============================================================================
// Configuration
// =============================================================================

/// Behavioral tunables of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    visible_line_count: u16,
    animation_duration: Duration,
    alpha_start: f32,
    show_icon: bool,
    show_gradient: bool,
    expand_label: Option<String>,
    collapse_label: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            visible_line_count: DEFAULT_VISIBLE_LINES,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            alpha_start: DEFAULT_ALPHA_START,
            show_icon: true,
            show_gradient: false,
            expand_label: None,
            collapse_label: None,
        }
    }
}

impl Configuration {
    /// Load from style data, clamping and defaulting invalid values.
    pub fn from_style(style: &StyleAttributes) -> Self {
        let visible_line_count = match style.visible_lines {
            Some(n) if n < MIN_VISIBLE_LINES as i64 => {
                warn!(visible_lines = n, "visible_lines below minimum, clamped");
                MIN_VISIBLE_LINES
            }
            Some(n) => n.min(u16::MAX as i64) as u16,
            None => DEFAULT_VISIBLE_LINES,
        };

        let animation_duration = match style.animation_duration_ms {
            Some(ms) if ms < 0 => {
                warn!(animation_duration_ms = ms, "negative duration, clamped to 0");
                Duration::ZERO
            }
            Some(ms) => Duration::from_millis(ms as u64),
            None => DEFAULT_ANIMATION_DURATION,
        };

        Self {
            visible_line_count,
            animation_duration,
            alpha_start: style.alpha_start.map_or(DEFAULT_ALPHA_START, sanitize_alpha),
            show_icon: style.show_icon.unwrap_or(true),
            show_gradient: style.show_gradient.unwrap_or(false),
            expand_label: style.expand_label.clone(),
            collapse_label: style.collapse_label.clone(),
        }
    }

    pub fn visible_line_count(&self) -> u16 {
        self.visible_line_count
    }

    pub fn animation_duration(&self) -> Duration {
        self.animation_duration
    }

    pub fn alpha_start(&self) -> f32 {
        self.alpha_start
    }

    pub fn show_icon(&self) -> bool {
        self.show_icon
    }

    pub fn show_gradient(&self) -> bool {
        self.show_gradient
    }

    pub fn expand_label(&self) -> Option<&str> {
        self.expand_label.as_deref()
    }

    pub fn collapse_label(&self) -> Option<&str> {
        self.collapse_label.as_deref()
    }

    pub fn set_visible_line_count(&mut self, count: i64) -> Result<()> {
        if count < MIN_VISIBLE_LINES as i64 || count > u16::MAX as i64 {
            return Err(CollapsibleError::InvalidVisibleLineCount(count));
        }
        self.visible_line_count = count as u16;
        Ok(())
    }

    pub fn set_animation_duration_ms(&mut self, millis: i64) -> Result<()> {
        if millis < 0 {
            return Err(CollapsibleError::NegativeAnimationDuration(millis));
        }
        self.animation_duration = Duration::from_millis(millis as u64);
        Ok(())
    }

    pub fn set_alpha_start(&mut self, alpha: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(CollapsibleError::AlphaOutOfRange(alpha));
        }
        self.alpha_start = alpha;
        Ok(())
    }

    pub fn set_show_icon(&mut self, show: bool) {
        self.show_icon = show;
    }

    pub fn set_show_gradient(&mut self, show: bool) {
        self.show_gradient = show;
    }

    pub fn set_expand_label(&mut self, label: Option<String>) {
        self.expand_label = label;
    }

    pub fn set_collapse_label(&mut self, label: Option<String>) {
        self.collapse_label = label;
    }
}

// =============================================================================
// Appearance
// =============================================================================

/// Visual styling: text styles, padding and icon sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub body: TextStyle,
    pub label: TextStyle,
    pub container_padding: Insets,
    pub expand_icon: IconSource,
    pub collapse_icon: IconSource,
    pub icon_tint: Option<Rgba>,
    pub gradient: IconSource,
    pub gradient_rows: u16,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            body: TextStyle::default(),
            label: TextStyle::default(),
            container_padding: Insets::ZERO,
            expand_icon: IconSource::Default,
            collapse_icon: IconSource::Default,
            icon_tint: None,
            gradient: IconSource::Default,
            gradient_rows: DEFAULT_GRADIENT_ROWS,
        }
    }
}

impl Appearance {
    pub fn from_style(style: &StyleAttributes) -> Self {
        let defaults = Self::default();

        let body = TextStyle {
            color: sanitize_color("body_text_color", style.body_text_color.as_deref())
                .unwrap_or(defaults.body.color),
            line_height: sanitize_text_size("body_text_size", style.body_text_size)
                .unwrap_or(defaults.body.line_height),
            insets: style.body_padding.map(Insets::from).unwrap_or(defaults.body.insets),
        };

        let label = TextStyle {
            color: sanitize_color("label_color", style.label_color.as_deref())
                .unwrap_or(defaults.label.color),
            line_height: sanitize_text_size("label_text_size", style.label_text_size)
                .unwrap_or(defaults.label.line_height),
            ..defaults.label
        };

        let source = |name: &Option<String>| {
            name.as_ref()
                .map_or(IconSource::Default, |n| IconSource::Named(n.clone()))
        };

        Self {
            body,
            label,
            container_padding: style
                .container_padding
                .map(Insets::from)
                .unwrap_or(defaults.container_padding),
            expand_icon: source(&style.expand_icon),
            collapse_icon: source(&style.collapse_icon),
            icon_tint: sanitize_color("icon_tint", style.icon_tint.as_deref()),
            gradient: source(&style.gradient),
            gradient_rows: defaults.gradient_rows,
        }
    }
}
