//! Text Measurement
//!
//! Measures body text in terminal cells and exposes the result the way a
//! host text layout does: natural line count, line top offsets and the
//! compound insets around the text.
//!
//! Terminal text width depends on Unicode character widths:
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Zero-width and control characters: 0 cells

use unicode_width::UnicodeWidthChar;

use crate::types::{Insets, Rgba, TextCap};

// =============================================================================
// WIDTH
// =============================================================================

/// Display width of a single character in terminal cells.
#[inline]
pub fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Measure the display width of a string in terminal cells.
pub fn string_width(s: &str) -> u16 {
    s.chars()
        .fold(0u16, |width, c| width.saturating_add(char_width(c)))
}

// =============================================================================
// WRAPPING
// =============================================================================

/// Word-wrap text to a given width.
///
/// Explicit newlines always break. Words longer than the width are broken
/// at character boundaries. A zero width disables wrapping.
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, width: u16, out: &mut Vec<String>) {
    if paragraph.is_empty() {
        out.push(String::new());
        return;
    }

    let mut line = String::new();
    let mut line_width = 0u16;

    for word in paragraph.split_inclusive(' ') {
        let word_width = string_width(word);
        let ink_width = string_width(word.trim_end_matches(' '));

        if line_width.saturating_add(ink_width) > width && !line.is_empty() {
            out.push(line.trim_end().to_string());
            line.clear();
            line_width = 0;
        }

        if ink_width > width {
            for c in word.chars() {
                let cw = char_width(c);
                if line_width.saturating_add(cw) > width && !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width = line_width.saturating_add(cw);
            }
        } else {
            line.push_str(word);
            line_width = line_width.saturating_add(word_width);
        }
    }

    if !line.is_empty() {
        out.push(line.trim_end().to_string());
    }
}

// =============================================================================
// TEXT LAYOUT
// =============================================================================

/// Style of a text element as far as measurement and painting care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Rgba,
    /// Rows per line. The terminal rendition of a text size.
    pub line_height: u16,
    /// Compound padding around the text inside its element.
    pub insets: Insets,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Rgba::TERMINAL_DEFAULT,
            line_height: 1,
            insets: Insets::ZERO,
        }
    }
}

/// Result of laying out text at a width constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    lines: Vec<String>,
    line_height: u16,
    insets: Insets,
    cap: TextCap,
}

impl TextLayout {
    pub fn new(lines: Vec<String>, line_height: u16, insets: Insets, cap: TextCap) -> Self {
        Self {
            lines,
            line_height: line_height.max(1),
            insets,
            cap,
        }
    }

    /// Natural (uncapped) line count.
    pub fn line_count(&self) -> u16 {
        self.lines.len().min(u16::MAX as usize) as u16
    }

    /// Vertical offset of the top of line `n`, relative to the first line.
    ///
    /// `line_top(line_count())` is the extent of all lines.
    pub fn line_top(&self, n: u16) -> u16 {
        n.min(self.line_count()).saturating_mul(self.line_height)
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn cap(&self) -> TextCap {
        self.cap
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Height of every natural line plus insets.
    pub fn full_height(&self) -> u16 {
        self.line_top(self.line_count())
            .saturating_add(self.insets.vertical())
    }

    /// Height of the text element under its cap.
    pub fn height(&self) -> u16 {
        match self.cap {
            TextCap::None => self.full_height(),
            TextCap::Lines(n) => self.line_top(n).saturating_add(self.insets.vertical()),
            TextCap::Height(h) => self.full_height().min(h),
        }
    }

    /// Lines that are fully visible under the cap.
    pub fn visible_line_count(&self) -> u16 {
        match self.cap {
            TextCap::None => self.line_count(),
            TextCap::Lines(n) => n.min(self.line_count()),
            TextCap::Height(h) => {
                let rows = h.saturating_sub(self.insets.top);
                (rows / self.line_height).min(self.line_count())
            }
        }
    }
}

/// Text layout measurement service.
///
/// `width` is the outer width of the text element; implementations subtract
/// the style's horizontal insets before wrapping.
pub trait TextMeasurer {
    fn measure(&self, text: &str, width: u16, cap: TextCap, style: &TextStyle) -> TextLayout;
}

/// Measures text on the terminal cell grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellTextMeasurer;

impl TextMeasurer for CellTextMeasurer {
    fn measure(&self, text: &str, width: u16, cap: TextCap, style: &TextStyle) -> TextLayout {
        let content_width = width.saturating_sub(style.insets.horizontal()).max(1);
        TextLayout::new(
            wrap_text(text, content_width),
            style.line_height,
            style.insets,
            cap,
        )
    }
}
