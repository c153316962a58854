//! Icon resolution.
//!
//! Icons and the gradient overlay are referenced by source and resolved
//! through an [`IconResolver`]. [`GlyphIcons`] resolves to terminal glyphs:
//! built-in defaults per role plus any glyphs registered by name.

use std::collections::HashMap;

use tracing::warn;

use crate::types::Rgba;

/// Where an icon comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IconSource {
    /// The built-in icon for the role.
    #[default]
    Default,
    Named(String),
}

impl IconSource {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

/// What the icon is used for. Picks the default glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRole {
    Expand,
    Collapse,
    Gradient,
}

/// A resolved icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub glyph: String,
    pub tint: Option<Rgba>,
}

impl Icon {
    pub fn new(glyph: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            tint: None,
        }
    }
}

/// Icon resolution service.
pub trait IconResolver {
    /// `None` if the source does not resolve.
    fn resolve(&self, source: &IconSource, role: IconRole) -> Option<Icon>;

    fn tint(&self, icon: Icon, color: Rgba) -> Icon {
        Icon {
            tint: Some(color),
            ..icon
        }
    }
}

/// Terminal glyph icons.
#[derive(Debug, Clone, Default)]
pub struct GlyphIcons {
    named: HashMap<String, String>,
}

impl GlyphIcons {
    pub const EXPAND: &'static str = "▾";
    pub const COLLAPSE: &'static str = "▴";
    pub const GRADIENT: &'static str = "░";

    pub fn new() -> Self {
        Self::default()
    }

    /// Register a glyph under `name`.
    pub fn with_glyph(mut self, name: impl Into<String>, glyph: impl Into<String>) -> Self {
        self.named.insert(name.into(), glyph.into());
        self
    }

    fn default_glyph(role: IconRole) -> &'static str {
        match role {
            IconRole::Expand => Self::EXPAND,
            IconRole::Collapse => Self::COLLAPSE,
            IconRole::Gradient => Self::GRADIENT,
        }
    }
}

impl IconResolver for GlyphIcons {
    fn resolve(&self, source: &IconSource, role: IconRole) -> Option<Icon> {
        match source {
            IconSource::Default => Some(Icon::new(Self::default_glyph(role))),
            IconSource::Named(name) => match self.named.get(name) {
                Some(glyph) => Some(Icon::new(glyph.clone())),
                None => {
                    warn!(name = %name, ?role, "unknown icon");
                    None
                }
            },
        }
    }
}
