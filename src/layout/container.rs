//! Container layout pass on Taffy.
//!
//! The component is a vertical flex container holding the body text and,
//! when shown, the expand/collapse control row. The gradient overlay is
//! painted over the last body rows and never takes part in sizing.
//!
//! Text nodes are leaves measured through the host's [`TextMeasurer`], so
//! applying a [`TextCap`] changes the measured container height exactly as
//! a real layout pass would.

use taffy::{
    AvailableSpace, Dimension, FlexDirection, LengthPercentage, NodeId, Rect, Size, Style,
    TaffyTree,
};

use crate::error::Result;
use crate::types::{Bounds, HeightConstraint, Insets, TextCap};

use super::text_measure::{string_width, TextLayout, TextMeasurer, TextStyle};

/// The expand/collapse control row as laid out.
#[derive(Debug, Clone, Copy)]
pub struct ExpandControlSpec<'a> {
    pub label: &'a str,
    pub icon: Option<&'a str>,
    pub style: &'a TextStyle,
}

impl ExpandControlSpec<'_> {
    /// Label, a separating space, then the icon glyph.
    fn content_width(&self) -> u16 {
        let label = string_width(self.label);
        match self.icon {
            Some(icon) if label > 0 => label.saturating_add(1).saturating_add(string_width(icon)),
            Some(icon) => string_width(icon),
            None => label,
        }
        .saturating_add(self.style.insets.horizontal())
    }

    fn height(&self) -> u16 {
        self.style
            .line_height
            .max(1)
            .saturating_add(self.style.insets.vertical())
    }
}

/// Everything one layout pass of the container depends on.
#[derive(Debug, Clone, Copy)]
pub struct ContainerSpec<'a> {
    pub width: u16,
    pub height: HeightConstraint,
    pub padding: Insets,
    pub text: &'a str,
    pub body_style: &'a TextStyle,
    pub text_cap: TextCap,
    /// `None` hides the control row.
    pub expand_control: Option<ExpandControlSpec<'a>>,
    /// Rows covered by the gradient overlay; `None` hides it.
    pub gradient_rows: Option<u16>,
}

/// Measured result of one container layout pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetrics {
    pub width: u16,
    pub height: u16,
    /// Body text element, relative to the container origin.
    pub body: Bounds,
    pub expand_control: Option<Bounds>,
    pub gradient: Option<Bounds>,
    /// Body text laid out at its final width.
    pub text: TextLayout,
}

impl ContainerMetrics {
    /// Metrics of a component that takes no space.
    pub fn collapsed_to_nothing() -> Self {
        Self {
            width: 0,
            height: 0,
            body: Bounds::default(),
            expand_control: None,
            gradient: None,
            text: TextLayout::new(Vec::new(), 1, Insets::ZERO, TextCap::None),
        }
    }

    /// Height of the body text element.
    pub fn text_height(&self) -> u16 {
        self.body.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Body,
    ExpandControl,
}

fn to_taffy_height(height: HeightConstraint) -> Dimension {
    match height {
        HeightConstraint::WrapContent => Dimension::Auto,
        HeightConstraint::Fixed(rows) => Dimension::Length(rows as f32),
    }
}

fn to_taffy_padding(insets: Insets) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(insets.top as f32),
        right: LengthPercentage::Length(insets.right as f32),
        bottom: LengthPercentage::Length(insets.bottom as f32),
        left: LengthPercentage::Length(insets.left as f32),
    }
}

fn to_bounds(layout: &taffy::Layout) -> Bounds {
    Bounds::new(
        layout.location.x.round().max(0.0) as u16,
        layout.location.y.round().max(0.0) as u16,
        layout.size.width.round().max(0.0) as u16,
        layout.size.height.round().max(0.0) as u16,
    )
}

/// Run one layout pass of the container.
pub fn compute_container(
    measurer: &dyn TextMeasurer,
    spec: &ContainerSpec<'_>,
) -> Result<ContainerMetrics> {
    let mut tree: TaffyTree<NodeKind> = TaffyTree::new();

    let leaf_style = Style {
        flex_shrink: 0.0,
        ..Default::default()
    };

    let body = tree.new_leaf_with_context(leaf_style.clone(), NodeKind::Body)?;
    let mut children = vec![body];

    let expand = match spec.expand_control {
        Some(_) => {
            let node = tree.new_leaf_with_context(leaf_style, NodeKind::ExpandControl)?;
            children.push(node);
            Some(node)
        }
        None => None,
    };

    let root = tree.new_with_children(
        Style {
            flex_direction: FlexDirection::Column,
            size: Size {
                width: Dimension::Length(spec.width as f32),
                height: to_taffy_height(spec.height),
            },
            padding: to_taffy_padding(spec.padding),
            ..Default::default()
        },
        &children,
    )?;

    let inner_width = spec.width.saturating_sub(spec.padding.horizontal());

    let mut measure_fn = |known_dimensions: Size<Option<f32>>,
                          available_space: Size<AvailableSpace>,
                          _node_id: NodeId,
                          context: Option<&mut NodeKind>,
                          _style: &Style| {
        let width = known_dimensions
            .width
            .map(|w| w.round() as u16)
            .unwrap_or(match available_space.width {
                AvailableSpace::Definite(w) => w.round() as u16,
                AvailableSpace::MinContent | AvailableSpace::MaxContent => inner_width,
            });

        match context.map(|kind| *kind) {
            Some(NodeKind::Body) => {
                let text = measurer.measure(spec.text, width, spec.text_cap, spec.body_style);
                Size {
                    width: width as f32,
                    height: known_dimensions.height.unwrap_or(text.height() as f32),
                }
            }
            Some(NodeKind::ExpandControl) => match spec.expand_control {
                Some(control) => Size {
                    width: known_dimensions
                        .width
                        .unwrap_or(control.content_width().min(inner_width) as f32),
                    height: known_dimensions.height.unwrap_or(control.height() as f32),
                },
                None => Size::ZERO,
            },
            None => Size::ZERO,
        }
    };

    tree.compute_layout_with_measure(
        root,
        Size {
            width: AvailableSpace::Definite(spec.width as f32),
            height: AvailableSpace::MaxContent,
        },
        &mut measure_fn,
    )?;

    let root_bounds = to_bounds(tree.layout(root)?);
    let body_bounds = to_bounds(tree.layout(body)?);
    let expand_bounds = match expand {
        Some(node) => Some(to_bounds(tree.layout(node)?)),
        None => None,
    };

    let text = measurer.measure(spec.text, body_bounds.width, spec.text_cap, spec.body_style);

    let gradient = spec.gradient_rows.map(|rows| {
        let rows = rows.min(body_bounds.height);
        Bounds::new(
            body_bounds.x,
            body_bounds.bottom().saturating_sub(rows),
            body_bounds.width,
            rows,
        )
    });

    Ok(ContainerMetrics {
        width: root_bounds.width,
        height: root_bounds.height,
        body: body_bounds,
        expand_control: expand_bounds,
        gradient,
        text,
    })
}
