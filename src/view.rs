//! Terminal rendition of a committed frame.
//!
//! [`render`] turns a [`FrameSnapshot`] into positioned, colored spans:
//! body text faded by the current text alpha, the gradient overlay dimming
//! the last visible rows, and the expand control row. [`write_spans`]
//! queues them to a terminal through crossterm.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};

use crate::collapse::FrameSnapshot;
use crate::layout::string_width;
use crate::types::{Affordances, Rgba};

/// A run of text at a position relative to the component origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub column: u16,
    pub row: u16,
    pub text: String,
    pub fg: Rgba,
    /// Set when the overlay has no color to blend with.
    pub dim: bool,
}

/// Fade `color` toward `background` at `alpha`.
fn fade(color: Rgba, alpha: f32, background: Rgba) -> Rgba {
    Rgba::blend(color.with_opacity(alpha), background)
}

pub fn to_crossterm_color(color: Rgba) -> Color {
    if color.is_terminal_default() {
        return Color::Reset;
    }
    Color::Rgb {
        r: color.r.clamp(0, 255) as u8,
        g: color.g.clamp(0, 255) as u8,
        b: color.b.clamp(0, 255) as u8,
    }
}

/// Render the committed frame over `background`.
pub fn render(frame: &FrameSnapshot, background: Rgba) -> Vec<Span> {
    let metrics = &frame.metrics;
    let presentation = &frame.presentation;
    let mut spans = Vec::new();
    if metrics.height == 0 {
        return spans;
    }

    let text = &metrics.text;
    let insets = text.insets();
    let gradient = metrics
        .gradient
        .filter(|g| g.height > 0 && presentation.affordances.contains(Affordances::GRADIENT));
    let overlay = frame
        .gradient_icon
        .as_ref()
        .and_then(|icon| icon.tint)
        .unwrap_or(background);
    let body_fg = fade(frame.body.color, presentation.text_alpha, background);

    for (i, line) in text
        .lines()
        .iter()
        .take(text.visible_line_count() as usize)
        .enumerate()
    {
        let row = metrics
            .body
            .y
            .saturating_add(insets.top)
            .saturating_add(text.line_top(i as u16));
        if row >= metrics.height {
            break;
        }

        let mut span = Span {
            column: metrics.body.x.saturating_add(insets.left),
            row,
            text: line.clone(),
            fg: body_fg,
            dim: false,
        };

        if let Some(g) = gradient.filter(|g| row >= g.y && row < g.bottom()) {
            let depth = (row - g.y + 1) as f32 / (g.height + 1) as f32;
            let strength = presentation.gradient_alpha * depth;
            if overlay.is_terminal_default() {
                span.dim = strength >= 0.25;
            } else {
                span.fg = Rgba::blend(overlay.with_opacity(strength), span.fg);
            }
        }

        spans.push(span);
    }

    if let Some(control) = metrics.expand_control {
        let row = control.y.saturating_add(frame.label.insets.top);
        let mut column = control.x.saturating_add(frame.label.insets.left);

        if !frame.control_label.is_empty() {
            spans.push(Span {
                column,
                row,
                text: frame.control_label.clone(),
                fg: frame.label.color,
                dim: false,
            });
            column = column
                .saturating_add(string_width(&frame.control_label))
                .saturating_add(1);
        }
        if let Some(icon) = &frame.control_icon {
            spans.push(Span {
                column,
                row,
                text: icon.glyph.clone(),
                fg: icon.tint.unwrap_or(frame.label.color),
                dim: false,
            });
        }
    }

    spans
}

/// Queue `spans` at `origin` on screen and flush.
pub fn write_spans<W: Write>(out: &mut W, origin: (u16, u16), spans: &[Span]) -> io::Result<()> {
    let (x, y) = origin;
    for span in spans {
        queue!(
            out,
            MoveTo(x.saturating_add(span.column), y.saturating_add(span.row)),
            SetForegroundColor(to_crossterm_color(span.fg))
        )?;
        if span.dim {
            queue!(out, SetAttribute(Attribute::Dim))?;
        }
        queue!(out, Print(&span.text), SetAttribute(Attribute::Reset), ResetColor)?;
    }
    out.flush()
}
