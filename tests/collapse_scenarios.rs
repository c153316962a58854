//! End-to-end collapse scenarios.
//!
//! Drives a component the way a terminal host does: lay out, run the
//! post-layout queue, tick the frame driver, repeat.
//!
//! Run with: cargo test --test collapse_scenarios

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use spark_collapsible::config::StyleAttributes;
use spark_collapsible::{
    Affordances, CollapseState, CollapsibleText, ContainerMetrics, Direction, HeightConstraint,
    TerminalHost, TextCap,
};

const FRAME: Duration = Duration::from_millis(16);
const WIDTH: u16 = 30;
const TEN_LINES: &str = "one\ntwo\nthree\nfour\nfive\nsix\nseven\neight\nnine\nten";
const THREE_LINES: &str = "one\ntwo\nthree";

// =============================================================================
// HARNESS
// =============================================================================

struct Harness {
    host: TerminalHost,
    text: CollapsibleText,
    notified: Rc<RefCell<Vec<bool>>>,
}

impl Harness {
    fn new(style: &str) -> Self {
        let style = StyleAttributes::from_toml_str(style).unwrap();
        let host = TerminalHost::new();
        let text = CollapsibleText::with_style(&style, host.services());

        let notified = Rc::new(RefCell::new(Vec::new()));
        let sink = notified.clone();
        text.set_listener(move |expanded| sink.borrow_mut().push(expanded));

        Self {
            host,
            text,
            notified,
        }
    }

    fn default_style() -> Self {
        Self::new(
            r#"
            visible_lines = 4
            alpha_start = 0.7
            animation_duration_ms = 300
            show_gradient = true
            expand_label = "Show more"
            collapse_label = "Show less"
            "#,
        )
    }

    /// One host layout turn: lay out, then run post-layout work.
    fn layout(&self) -> ContainerMetrics {
        let metrics = self.text.layout(WIDTH).unwrap();
        self.host.queue.run_pending();
        metrics
    }

    /// One animation frame followed by a layout turn.
    fn frame(&self) -> ContainerMetrics {
        self.host.driver.tick(FRAME);
        self.layout()
    }

    /// Frames until the driver is idle. Returns the committed heights.
    fn run_out(&self) -> Vec<u16> {
        let mut heights = Vec::new();
        for _ in 0..200 {
            if self.host.driver.is_idle() {
                break;
            }
            heights.push(self.frame().height);
        }
        heights
    }

    fn notifications(&self) -> Vec<bool> {
        self.notified.borrow().clone()
    }
}

fn press(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::empty(),
    }
}

// =============================================================================
// TRUNCATION
// =============================================================================

#[test]
fn test_ten_lines_expand_scenario() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);

    let collapsed = h.layout();
    let measurement = h.text.measurement().unwrap();
    assert!(measurement.requires_truncation);
    assert_eq!(measurement.line_count, 10);
    assert_eq!(measurement.collapsed_container_height, Some(collapsed.height));
    assert_eq!(collapsed.height, 5);
    assert!(collapsed.expand_control.is_some());
    assert!(h.text.affordances().contains(Affordances::CLICKABLE));
    assert_eq!(h.text.control_label(), "Show more");

    assert!(h.text.click());
    assert_eq!(h.text.state(), CollapseState::Animating(Direction::ToExpanded));
    assert_eq!(h.text.control_label(), "Show less");

    let first = h.frame();
    assert!(h.text.text_alpha() >= 0.7 && h.text.text_alpha() < 0.75);
    assert!(h.text.gradient_alpha() > 0.9);
    assert!(matches!(h.text.height_constraint(), HeightConstraint::Fixed(_)));
    assert!(first.height >= collapsed.height);

    // the text clip follows the container height on every frame
    let margin = h.text.text_bottom_margin().unwrap();
    assert_eq!(margin, 1);
    assert_eq!(h.text.text_cap(), TextCap::Height(first.height - margin));
    for _ in 0..3 {
        let mid = h.frame();
        assert_eq!(h.text.text_cap(), TextCap::Height(mid.height - margin));
    }

    let heights = h.run_out();
    assert!(heights.windows(2).all(|w| w[0] <= w[1]));
    // grows by the hidden text: 5 + (10 - 4)
    assert_eq!(heights.last(), Some(&11));

    assert_eq!(h.text.state(), CollapseState::Expanded);
    assert!(!h.text.is_collapsed());
    assert_eq!(h.text.text_alpha(), 1.0);
    assert_eq!(h.text.gradient_alpha(), 0.0);
    assert_eq!(h.text.height_constraint(), HeightConstraint::WrapContent);
    assert_eq!(h.notifications(), vec![true]);
    assert!(h.text.expanded_signal().get());
}

#[test]
fn test_three_lines_never_truncate() {
    let h = Harness::default_style();
    h.text.set_text(THREE_LINES);

    let metrics = h.layout();
    assert_eq!(metrics.height, 3);
    assert!(metrics.expand_control.is_none());
    assert!(!h.text.measurement().unwrap().requires_truncation);
    assert_eq!(h.text.affordances(), Affordances::empty());

    assert!(!h.text.click());
    assert!(!h.text.handle_mouse(&press(1, 1), (0, 0)));
    assert_eq!(h.text.state(), CollapseState::Collapsed);
    assert!(h.host.driver.is_idle());
    assert_eq!(h.text.text_bottom_margin(), None);
}

#[test]
fn test_shrinking_text_hides_control() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.layout();
    h.text.click();
    h.run_out();

    h.text.set_text(THREE_LINES);
    let metrics = h.layout();
    assert!(metrics.expand_control.is_none());
    assert!(!h.text.affordances().contains(Affordances::CLICKABLE));
    assert!(!h.text.click());
}

#[test]
fn test_emptied_text_is_not_clickable() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.layout();
    assert!(h.text.affordances().contains(Affordances::CLICKABLE));

    h.text.set_text("");
    let metrics = h.layout();
    assert_eq!(metrics.height, 0);
    assert!(h.text.measurement().is_none());
    assert_eq!(h.text.affordances(), Affordances::empty());

    assert!(!h.text.click());
    assert!(!h.text.handle_mouse(&press(1, 1), (0, 0)));
    h.host.driver.run_to_completion(FRAME, 200);
    assert_eq!(h.text.state(), CollapseState::Collapsed);
    assert!(h.text.is_collapsed());
    assert!(h.notifications().is_empty());
    assert!(!h.text.expanded_signal().get());
}

#[test]
fn test_layout_is_idempotent() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);

    let first = h.layout();
    let presentation = h.text.presentation();
    let second = h.layout();

    assert_eq!(first, second);
    assert_eq!(presentation, h.text.presentation());
    assert_eq!(h.text.measurement_count(), 1);
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[test]
fn test_click_while_animating_is_ignored() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.layout();

    assert!(h.text.click());
    h.frame();
    let running = h.host.driver.running_count();

    assert!(!h.text.click());
    assert!(h.text.handle_mouse(&press(1, 1), (0, 0)));
    assert_eq!(h.host.driver.running_count(), running);
    assert_eq!(h.text.state(), CollapseState::Animating(Direction::ToExpanded));

    h.run_out();
    assert_eq!(h.notifications(), vec![true]);
}

#[test]
fn test_round_trip_returns_to_collapsed_height() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    let collapsed = h.layout().height;

    h.text.click();
    h.run_out();
    assert_eq!(h.layout().height, 11);

    assert!(h.text.click());
    assert_eq!(h.text.state(), CollapseState::Animating(Direction::ToCollapsed));
    let heights = h.run_out();
    assert!(heights.windows(2).all(|w| w[0] >= w[1]));

    assert!(h.text.is_collapsed());
    assert_eq!(h.layout().height, collapsed);
    assert_eq!(h.text.text_cap(), TextCap::Lines(4));
    assert_eq!(h.text.height_constraint(), HeightConstraint::WrapContent);
    assert_eq!(h.text.gradient_alpha(), 1.0);
    assert_eq!(h.notifications(), vec![true, false]);
    assert!(!h.text.expanded_signal().get());
}

#[test]
fn test_collapse_after_text_changed_while_expanded() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.layout();
    h.text.click();
    h.run_out();

    h.text.set_text("a\nb\nc\nd\ne\nf");
    assert_eq!(h.layout().height, 7);
    assert_eq!(h.text.measurement().unwrap().collapsed_container_height, None);

    assert!(h.text.click());
    h.run_out();
    assert!(h.text.is_collapsed());
    assert_eq!(h.layout().height, 5);
}

#[test]
fn test_bottom_margin_with_padding() {
    let h = Harness::new(
        r#"
        visible_lines = 4
        container_padding = { top = 1, bottom = 2 }
        body_padding = { top = 1, bottom = 1 }
        "#,
    );
    h.text.set_text(TEN_LINES);

    // 1 + (4 + 2) + 1 + 2
    assert_eq!(h.layout().height, 10);
    assert_eq!(h.text.text_bottom_margin(), Some(4));

    h.text.click();
    let heights = h.run_out();
    // grows by the hidden text only: 10 + 12 - 6
    assert_eq!(heights.last(), Some(&16));
    assert_eq!(h.layout().height, 16);
}

// =============================================================================
// TEARDOWN
// =============================================================================

#[test]
fn test_detach_mid_animation_never_notifies() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.layout();
    h.text.click();
    h.frame();
    h.frame();

    h.text.detach();
    for _ in 0..50 {
        h.host.driver.tick(FRAME);
    }

    assert!(h.host.driver.is_idle());
    assert!(h.notifications().is_empty());
    assert!(!h.text.expanded_signal().get());
    assert_eq!(h.text.state(), CollapseState::Collapsed);
}

#[test]
fn test_detach_disarms_pending_margin_capture() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.text.layout(WIDTH).unwrap();
    assert_eq!(h.host.queue.len(), 1);

    h.text.detach();
    h.host.queue.run_pending();
    assert_eq!(h.text.text_bottom_margin(), None);
}

#[test]
fn test_dropped_component_callbacks_are_noops() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.text.layout(WIDTH).unwrap();
    h.text.click();

    let Harness {
        host,
        text,
        notified,
    } = h;
    drop(text);

    host.queue.run_pending();
    host.driver.run_to_completion(FRAME, 200);
    assert!(host.driver.is_idle());
    assert!(notified.borrow().is_empty());
}

#[test]
fn test_reattach_after_detach() {
    let h = Harness::default_style();
    h.text.set_text(TEN_LINES);
    h.layout();
    h.text.click();
    h.frame();
    h.text.detach();

    h.text.attach();
    assert_eq!(h.layout().height, 5);
    assert!(h.text.click());
    h.run_out();
    assert_eq!(h.notifications(), vec![true]);
}
