//! Two-pass measurement.
//!
//! Capping the line count changes the container's height, and that height
//! has to be measured rather than derived. So the engine lays out once
//! uncapped to learn the natural line count and full height, then (only
//! when collapsed and truncation is needed) again under the cap.
//!
//! The engine never calls the layout system directly. It is handed a
//! layout-pass capability and the presentation it is allowed to change.

use tracing::{debug, trace};

use crate::error::Result;
use crate::layout::ContainerMetrics;
use crate::types::{Affordances, TextCap};

use super::Presentation;

/// What the engine needs to know about the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureRequest {
    pub width: u16,
    pub has_text: bool,
    pub visible_line_count: u16,
    pub collapsed: bool,
    pub show_gradient: bool,
}

/// Outcome of one run of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub requires_truncation: bool,
    /// Natural line count at the measured width.
    pub line_count: u16,
    /// Extent of every natural line plus the text element's insets.
    pub full_content_height: u16,
    /// Container height under the line cap. Only measured when collapsed.
    pub collapsed_container_height: Option<u16>,
}

impl Measurement {
    fn fits(line_count: u16, full_content_height: u16) -> Self {
        Self {
            requires_truncation: false,
            line_count,
            full_content_height,
            collapsed_container_height: None,
        }
    }
}

/// Decide truncation and measure the heights involved.
///
/// `presentation` is reset first and left in the state the committed layout
/// pass should use. `layout_pass` runs one container layout with the given
/// presentation.
pub fn measure<F>(
    request: &MeasureRequest,
    presentation: &mut Presentation,
    mut layout_pass: F,
) -> Result<Measurement>
where
    F: FnMut(&Presentation) -> Result<ContainerMetrics>,
{
    presentation.text_cap = TextCap::None;
    presentation.affordances = Affordances::empty();

    if request.width == 0 || !request.has_text {
        trace!(width = request.width, "nothing to measure");
        return Ok(Measurement::fits(0, 0));
    }

    let uncapped = layout_pass(presentation)?;
    let text = &uncapped.text;
    let line_count = text.line_count();
    let full_content_height = text
        .line_top(line_count)
        .saturating_add(text.insets().vertical());

    if line_count <= request.visible_line_count {
        debug!(
            lines = line_count,
            visible = request.visible_line_count,
            "text fits, no truncation"
        );
        return Ok(Measurement::fits(line_count, full_content_height));
    }

    presentation.affordances = Affordances::CLICKABLE | Affordances::EXPAND_CONTROL;

    let mut collapsed_container_height = None;
    if request.collapsed {
        presentation.text_cap = TextCap::Lines(request.visible_line_count);
        if request.show_gradient {
            presentation.affordances.insert(Affordances::GRADIENT);
        }
        let capped = layout_pass(presentation)?;
        collapsed_container_height = Some(capped.height);
    }

    debug!(
        lines = line_count,
        visible = request.visible_line_count,
        full = full_content_height,
        collapsed = ?collapsed_container_height,
        "text truncated"
    );

    Ok(Measurement {
        requires_truncation: true,
        line_count,
        full_content_height,
        collapsed_container_height,
    })
}
