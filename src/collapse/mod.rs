//! Collapsible Text - Text truncated to a few lines, expanded on click.
//!
//! [`CollapsibleText`] shows its body text capped to a visible line count.
//! When the text needs more lines, an expand control appears and a click
//! animates the container between its collapsed and full heights.
//!
//! # Pattern
//!
//! - Content changes mark the component dirty
//! - The next [`CollapsibleText::layout`] runs the two-pass measurement and
//!   decides truncation; clean layouts reuse the previous decision
//! - A click plans a transition and starts it on the host's animation driver
//! - Animation frames and completion reach the component through a
//!   [`BackRef`], so they become no-ops once it is detached or dropped
//!
//! # Example
//!
//! ```ignore
//! use spark_collapsible::{CollapsibleText, TerminalHost};
//! use std::time::Duration;
//!
//! let host = TerminalHost::new();
//! let text = CollapsibleText::new(host.services());
//! text.set_text(long_description);
//! text.set_listener(|expanded| println!("expanded: {expanded}"));
//!
//! // Host frame loop
//! text.layout(60)?;
//! host.queue.run_pending();
//! host.driver.tick(Duration::from_millis(16));
//! ```

mod animator;
mod measure;
mod state;

pub use animator::TransitionPlan;
pub use measure::{measure, MeasureRequest, Measurement};
pub use state::{ClickOutcome, CollapseState, Direction, IgnoredClick};

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::MouseEvent;
use spark_signals::{signal, Signal};
use tracing::{debug, trace, warn};

use crate::config::{
    Appearance, Configuration, StyleAttributes, ALPHA_OPAQUE, ALPHA_TRANSPARENT,
};
use crate::error::{CollapsibleError, Result};
use crate::host::HostServices;
use crate::layout::{compute_container, ContainerMetrics, ContainerSpec, ExpandControlSpec, TextStyle};
use crate::resources::{Icon, IconResolver, IconRole, IconSource};
use crate::state::{is_pointer_down, is_press_inside, AnimationDriver, AnimationId, BackRef};
use crate::types::{
    Affordances, Bounds, HeightConstraint, Orientation, Rgba, TextCap, Visibility,
};

// =============================================================================
// TYPES
// =============================================================================

/// Presentation attributes driven by measurement and animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub visibility: Visibility,
    pub affordances: Affordances,
    pub text_cap: TextCap,
    pub height: HeightConstraint,
    pub text_alpha: f32,
    pub gradient_alpha: f32,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            visibility: Visibility::Gone,
            affordances: Affordances::empty(),
            text_cap: TextCap::None,
            height: HeightConstraint::WrapContent,
            text_alpha: ALPHA_OPAQUE,
            gradient_alpha: ALPHA_OPAQUE,
        }
    }
}

/// Everything needed to paint the committed layout.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub metrics: ContainerMetrics,
    pub presentation: Presentation,
    pub body: TextStyle,
    pub label: TextStyle,
    pub control_label: String,
    pub control_icon: Option<Icon>,
    pub gradient_icon: Option<Icon>,
}

type Listener = Rc<RefCell<Box<dyn FnMut(bool)>>>;
type Back = BackRef<RefCell<Inner>>;

#[derive(Debug, Default)]
struct ResolvedIcons {
    expand: Option<Icon>,
    collapse: Option<Icon>,
    gradient: Option<Icon>,
}

struct Inner {
    text: String,
    config: Configuration,
    appearance: Appearance,
    services: HostServices,
    icons: ResolvedIcons,

    state: CollapseState,
    presentation: Presentation,
    dirty: bool,
    measured_width: Option<u16>,
    measurement: Option<Measurement>,
    text_bottom_margin: Option<u16>,
    committed: Option<ContainerMetrics>,
    measurement_count: usize,

    running: Vec<AnimationId>,
    back_ref: Back,
    listener: Option<Listener>,
    expanded: Signal<bool>,
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Handle to a collapsible text component.
///
/// Cloning the handle shares the component.
#[derive(Clone)]
pub struct CollapsibleText {
    inner: Rc<RefCell<Inner>>,
}

impl CollapsibleText {
    pub fn new(services: HostServices) -> Self {
        Self::with_style(&StyleAttributes::default(), services)
    }

    /// Build from style data. Invalid style values are sanitized, never
    /// rejected.
    pub fn with_style(style: &StyleAttributes, services: HostServices) -> Self {
        let inner = Rc::new_cyclic(|weak| {
            let mut inner = Inner {
                text: String::new(),
                config: Configuration::from_style(style),
                appearance: Appearance::from_style(style),
                services,
                icons: ResolvedIcons::default(),
                state: CollapseState::default(),
                presentation: Presentation::default(),
                dirty: true,
                measured_width: None,
                measurement: None,
                text_bottom_margin: None,
                committed: None,
                measurement_count: 0,
                running: Vec::new(),
                back_ref: BackRef::from_weak(weak.clone()),
                listener: None,
                expanded: signal(false),
            };
            inner.resolve_icons();
            RefCell::new(inner)
        });

        let component = Self { inner };
        if let Some(text) = style.body_text.as_deref().filter(|t| !t.is_empty()) {
            component.set_text(text);
        }
        component
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Replace the body text. Empty text hides the component.
    pub fn set_text(&self, text: impl Into<String>) {
        let mut inner = self.inner.borrow_mut();
        inner.text = text.into();
        inner.dirty = true;
        if inner.text.is_empty() {
            inner.presentation.visibility = Visibility::Gone;
            inner.presentation.affordances = Affordances::empty();
            inner.measurement = None;
        } else {
            inner.presentation.visibility = Visibility::Visible;
        }
        trace!(len = inner.text.len(), "text replaced");
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Whether the last settled state is collapsed.
    pub fn is_collapsed(&self) -> bool {
        self.inner.borrow().state.is_collapsed()
    }

    pub fn state(&self) -> CollapseState {
        self.inner.borrow().state
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().state.is_animating()
    }

    /// Reactive view of the expanded state, updated on every settle.
    pub fn expanded_signal(&self) -> Signal<bool> {
        self.inner.borrow().expanded.clone()
    }

    pub fn presentation(&self) -> Presentation {
        self.inner.borrow().presentation
    }

    pub fn height_constraint(&self) -> HeightConstraint {
        self.inner.borrow().presentation.height
    }

    pub fn text_cap(&self) -> TextCap {
        self.inner.borrow().presentation.text_cap
    }

    pub fn affordances(&self) -> Affordances {
        self.inner.borrow().presentation.affordances
    }

    pub fn text_alpha(&self) -> f32 {
        self.inner.borrow().presentation.text_alpha
    }

    pub fn gradient_alpha(&self) -> f32 {
        self.inner.borrow().presentation.gradient_alpha
    }

    /// Result of the last measurement, if any ran.
    pub fn measurement(&self) -> Option<Measurement> {
        self.inner.borrow().measurement
    }

    /// Number of times the two-pass measurement has run.
    pub fn measurement_count(&self) -> usize {
        self.inner.borrow().measurement_count
    }

    /// Container rows not taken by the text, once captured after layout.
    pub fn text_bottom_margin(&self) -> Option<u16> {
        self.inner.borrow().text_bottom_margin
    }

    /// Metrics of the last layout pass.
    pub fn committed(&self) -> Option<ContainerMetrics> {
        self.inner.borrow().committed.clone()
    }

    /// Label currently shown on the expand control.
    pub fn control_label(&self) -> String {
        self.inner.borrow().control_label().to_string()
    }

    pub fn control_icon(&self) -> Option<Icon> {
        self.inner.borrow().control_icon().cloned()
    }

    pub fn snapshot(&self) -> Option<FrameSnapshot> {
        let inner = self.inner.borrow();
        let metrics = inner.committed.clone()?;
        Some(FrameSnapshot {
            metrics,
            presentation: inner.presentation,
            body: inner.appearance.body,
            label: inner.appearance.label,
            control_label: inner.control_label().to_string(),
            control_icon: inner.control_icon().cloned(),
            gradient_icon: inner.icons.gradient.clone(),
        })
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    pub fn visible_line_count(&self) -> u16 {
        self.inner.borrow().config.visible_line_count()
    }

    pub fn animation_duration(&self) -> Duration {
        self.inner.borrow().config.animation_duration()
    }

    pub fn animation_alpha_start(&self) -> f32 {
        self.inner.borrow().config.alpha_start()
    }

    /// Rejects counts below one.
    pub fn set_visible_line_count(&self, count: i64) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.config.set_visible_line_count(count)?;
        inner.dirty = true;
        Ok(())
    }

    /// Rejects negative durations.
    pub fn set_animation_duration_ms(&self, millis: i64) -> Result<()> {
        self.inner.borrow_mut().config.set_animation_duration_ms(millis)
    }

    /// Rejects values outside `[0, 1]`.
    pub fn set_animation_alpha_start(&self, alpha: f32) -> Result<()> {
        self.inner.borrow_mut().config.set_alpha_start(alpha)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::Vertical
    }

    /// The layout is always vertical; anything else is rejected.
    pub fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        match orientation {
            Orientation::Vertical => Ok(()),
            other => Err(CollapsibleError::UnsupportedOrientation(other)),
        }
    }

    pub fn set_body_text_color(&self, color: Rgba) {
        self.inner.borrow_mut().appearance.body.color = color;
    }

    /// Rows per body line.
    pub fn set_body_text_size(&self, rows: u16) {
        let mut inner = self.inner.borrow_mut();
        inner.appearance.body.line_height = rows.max(1);
        inner.dirty = true;
    }

    pub fn set_expand_button_text_color(&self, color: Rgba) {
        self.inner.borrow_mut().appearance.label.color = color;
    }

    /// Rows per expand control line.
    pub fn set_expand_button_text_size(&self, rows: u16) {
        let mut inner = self.inner.borrow_mut();
        inner.appearance.label.line_height = rows.max(1);
        inner.dirty = true;
    }

    pub fn set_expand_label(&self, label: Option<String>) {
        self.inner.borrow_mut().config.set_expand_label(label);
    }

    pub fn set_collapse_label(&self, label: Option<String>) {
        self.inner.borrow_mut().config.set_collapse_label(label);
    }

    /// Replace both control icons. `tint`, when set, is applied to both.
    pub fn set_expand_collapse_icons(
        &self,
        collapse: IconSource,
        expand: IconSource,
        tint: Option<Rgba>,
    ) {
        let mut inner = self.inner.borrow_mut();
        inner.appearance.collapse_icon = collapse;
        inner.appearance.expand_icon = expand;
        inner.appearance.icon_tint = tint;
        inner.resolve_icons();
    }

    /// Use `source` as the gradient overlay and show it while collapsed.
    pub fn set_transition_gradient(&self, source: IconSource) {
        let mut inner = self.inner.borrow_mut();
        inner.appearance.gradient = source;
        inner.config.set_show_gradient(true);
        inner.resolve_icons();
        inner.dirty = true;
    }

    pub fn set_show_icon(&self, show: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.config.set_show_icon(show);
        inner.resolve_icons();
    }

    // -------------------------------------------------------------------------
    // Listener
    // -------------------------------------------------------------------------

    /// Register the expand state listener, replacing any previous one.
    pub fn set_listener(&self, listener: impl FnMut(bool) + 'static) {
        let listener: Box<dyn FnMut(bool)> = Box::new(listener);
        self.inner.borrow_mut().listener = Some(Rc::new(RefCell::new(listener)));
    }

    pub fn clear_listener(&self) {
        self.inner.borrow_mut().listener = None;
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// Run a layout pass at `width` columns and commit it.
    ///
    /// Measures only when content changed since the last measurement and
    /// no transition is running.
    pub fn layout(&self, width: u16) -> Result<ContainerMetrics> {
        let (metrics, capture_margin) = self.inner.borrow_mut().layout(width)?;

        if capture_margin {
            let (scheduler, back) = {
                let inner = self.inner.borrow();
                (inner.services.scheduler.clone(), inner.back_ref.clone())
            };
            scheduler.post(Box::new(move || capture_text_bottom_margin(&back)));
        }

        Ok(metrics)
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Toggle between collapsed and expanded.
    ///
    /// Returns true if a transition started.
    pub fn click(&self) -> bool {
        let begun = self.inner.borrow_mut().begin_transition();
        let Some((plan, back, driver)) = begun else {
            return false;
        };

        let (primary, gradient) = plan.build(
            {
                let back = back.clone();
                move |rows| with_inner(&back, |inner| inner.apply_height(&plan, rows))
            },
            {
                let back = back.clone();
                move |alpha| with_inner(&back, |inner| inner.presentation.text_alpha = alpha)
            },
            {
                let back = back.clone();
                move |alpha| {
                    with_inner(&back, |inner| inner.presentation.gradient_alpha = alpha)
                }
            },
            move || settle(&back, plan.direction),
        );

        let ids = [driver.start(primary), driver.start(gradient)];

        let mut inner = self.inner.borrow_mut();
        if inner.state == CollapseState::Animating(plan.direction) {
            inner.running.extend(ids);
        }
        true
    }

    /// Whether a pointer event must be swallowed before it reaches
    /// anything under the component.
    pub fn intercepts_pointer(&self, event: &MouseEvent) -> bool {
        if self.is_animating() && is_pointer_down(event) {
            trace!("pointer swallowed while animating");
            return true;
        }
        false
    }

    /// Route a pointer event. `origin` is the component's screen position.
    ///
    /// Returns true if the event was consumed.
    pub fn handle_mouse(&self, event: &MouseEvent, origin: (u16, u16)) -> bool {
        if self.intercepts_pointer(event) {
            return true;
        }

        let target = {
            let inner = self.inner.borrow();
            let clickable = inner
                .presentation
                .affordances
                .contains(Affordances::CLICKABLE);
            inner
                .committed
                .as_ref()
                .filter(|_| clickable)
                .map(|m| Bounds::new(0, 0, m.width, m.height))
        };

        match target {
            Some(bounds) if is_press_inside(event, origin, bounds) => self.click(),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Arm deferred work again after a [`detach`](Self::detach).
    pub fn attach(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.back_ref.is_cleared() {
            inner.back_ref = BackRef::new(&self.inner);
            trace!("attached");
        }
    }

    /// Tear down: cancel running animations without their completion and
    /// disarm every pending callback.
    ///
    /// An interrupted transition reverts to the state it started from.
    pub fn detach(&self) {
        let (driver, running) = {
            let mut inner = self.inner.borrow_mut();
            inner.back_ref.clear();
            if inner.state.is_animating() {
                inner.revert_transition();
            }
            (
                inner.services.animations.clone(),
                std::mem::take(&mut inner.running),
            )
        };

        let cancelled = running.into_iter().filter(|id| driver.cancel(*id)).count();
        debug!(cancelled, "detached");
    }

    pub fn is_attached(&self) -> bool {
        !self.inner.borrow().back_ref.is_cleared()
    }
}

// =============================================================================
// INNER
// =============================================================================

impl Inner {
    fn resolve_icons(&mut self) {
        let resolver = self.services.icons.clone();
        let tint = self.appearance.icon_tint;
        let resolve = |source: &IconSource, role| {
            let icon = resolver.resolve(source, role)?;
            Some(match tint {
                Some(color) => resolver.tint(icon, color),
                None => icon,
            })
        };

        if self.config.show_icon() {
            self.icons.expand = resolve(&self.appearance.expand_icon, IconRole::Expand);
            self.icons.collapse = resolve(&self.appearance.collapse_icon, IconRole::Collapse);
        } else {
            self.icons.expand = None;
            self.icons.collapse = None;
        }

        self.icons.gradient = if self.config.show_gradient() {
            resolver.resolve(&self.appearance.gradient, IconRole::Gradient)
        } else {
            None
        };
    }

    fn shows_gradient(&self) -> bool {
        self.config.show_gradient() && self.icons.gradient.is_some()
    }

    fn control_label(&self) -> &str {
        let label = if self.state.offers_expand() {
            self.config.expand_label()
        } else {
            self.config.collapse_label()
        };
        label.unwrap_or("")
    }

    fn control_icon(&self) -> Option<&Icon> {
        if self.state.offers_expand() {
            self.icons.expand.as_ref()
        } else {
            self.icons.collapse.as_ref()
        }
    }

    fn container_spec(&self, width: u16, presentation: &Presentation) -> ContainerSpec<'_> {
        let affordances = presentation.affordances;
        ContainerSpec {
            width,
            height: presentation.height,
            padding: self.appearance.container_padding,
            text: &self.text,
            body_style: &self.appearance.body,
            text_cap: presentation.text_cap,
            expand_control: affordances
                .contains(Affordances::EXPAND_CONTROL)
                .then(|| ExpandControlSpec {
                    label: self.control_label(),
                    icon: self.control_icon().map(|icon| icon.glyph.as_str()),
                    style: &self.appearance.label,
                }),
            gradient_rows: affordances
                .contains(Affordances::GRADIENT)
                .then_some(self.appearance.gradient_rows),
        }
    }

    fn layout_pass(&self, width: u16, presentation: &Presentation) -> Result<ContainerMetrics> {
        compute_container(
            self.services.measurer.as_ref(),
            &self.container_spec(width, presentation),
        )
    }

    /// Returns the committed metrics and whether the text bottom margin
    /// should be captured once this layout commits.
    fn layout(&mut self, width: u16) -> Result<(ContainerMetrics, bool)> {
        if self.presentation.visibility == Visibility::Gone {
            let metrics = ContainerMetrics::collapsed_to_nothing();
            self.committed = Some(metrics.clone());
            return Ok((metrics, false));
        }

        if self.measured_width.is_some_and(|w| w != width) {
            trace!(width, "width changed");
            self.dirty = true;
        }

        let mut capture_margin = false;
        if self.dirty {
            if self.state.is_animating() {
                trace!("layout while animating, measurement deferred");
            } else {
                capture_margin = self.run_measurement(width)?;
            }
        }

        let metrics = self.layout_pass(width, &self.presentation)?;
        self.committed = Some(metrics.clone());
        Ok((metrics, capture_margin))
    }

    fn run_measurement(&mut self, width: u16) -> Result<bool> {
        self.dirty = false;
        self.measured_width = Some(width);
        self.measurement_count += 1;

        let request = MeasureRequest {
            width,
            has_text: !self.text.is_empty(),
            visible_line_count: self.config.visible_line_count(),
            collapsed: self.state == CollapseState::Collapsed,
            show_gradient: self.shows_gradient(),
        };

        let mut presentation = self.presentation;
        presentation.height = HeightConstraint::WrapContent;
        let measurement = measure(&request, &mut presentation, |p| self.layout_pass(width, p))?;

        if measurement.requires_truncation && request.collapsed {
            presentation.gradient_alpha = ALPHA_OPAQUE;
        }
        self.presentation = presentation;
        self.measurement = Some(measurement);
        Ok(measurement.requires_truncation)
    }

    /// Collapsed container height, probing a capped layout if the last
    /// measurement ran while expanded.
    fn collapsed_container_height(&mut self, width: u16) -> Result<u16> {
        if let Some(height) = self.measurement.and_then(|m| m.collapsed_container_height) {
            return Ok(height);
        }

        let mut probe = self.presentation;
        probe.text_cap = TextCap::Lines(self.config.visible_line_count());
        probe.height = HeightConstraint::WrapContent;
        let height = self.layout_pass(width, &probe)?.height;
        trace!(height, "collapsed height probed");

        if let Some(measurement) = self.measurement.as_mut() {
            measurement.collapsed_container_height = Some(height);
        }
        Ok(height)
    }

    fn begin_transition(&mut self) -> Option<(TransitionPlan, Back, Rc<dyn AnimationDriver>)> {
        if self.back_ref.is_cleared() {
            trace!("click while detached ignored");
            return None;
        }
        if self.presentation.visibility == Visibility::Gone {
            trace!("click while hidden ignored");
            return None;
        }

        let truncated = self
            .presentation
            .affordances
            .contains(Affordances::CLICKABLE)
            && self.measurement.is_some_and(|m| m.requires_truncation);

        let direction = match self.state.on_click(truncated) {
            ClickOutcome::Start(direction) => direction,
            ClickOutcome::Ignored(reason) => {
                trace!(?reason, "click ignored");
                return None;
            }
        };

        let (Some(committed), Some(measurement)) = (self.committed.clone(), self.measurement)
        else {
            trace!("click before first layout ignored");
            return None;
        };

        let collapsed_height = match direction {
            Direction::ToCollapsed => match self.collapsed_container_height(committed.width) {
                Ok(height) => height,
                Err(err) => {
                    warn!(%err, "collapsed height unavailable, click ignored");
                    return None;
                }
            },
            Direction::ToExpanded => committed.height,
        };

        let margin = match self.text_bottom_margin {
            Some(margin) => margin,
            None => {
                let margin = committed.height.saturating_sub(committed.text_height());
                self.text_bottom_margin = Some(margin);
                margin
            }
        };

        self.state = CollapseState::Animating(direction);
        if direction == Direction::ToCollapsed && self.shows_gradient() {
            self.presentation.affordances.insert(Affordances::GRADIENT);
            self.presentation.gradient_alpha = ALPHA_TRANSPARENT;
        }

        let plan = TransitionPlan::new(
            direction,
            &committed,
            &measurement,
            collapsed_height,
            margin,
            self.config.alpha_start(),
            self.config.animation_duration(),
        );
        self.presentation.text_alpha = plan.alpha_from;

        Some((
            plan,
            self.back_ref.clone(),
            self.services.animations.clone(),
        ))
    }

    fn apply_height(&mut self, plan: &TransitionPlan, rows: u16) {
        self.presentation.height = HeightConstraint::Fixed(rows);
        self.presentation.text_cap = plan.text_cap_at(rows);
    }

    /// Presentation of the current settled state.
    fn present_settled(&mut self) {
        self.presentation.height = HeightConstraint::WrapContent;
        self.presentation.text_alpha = ALPHA_OPAQUE;

        if self.state.is_collapsed() {
            self.presentation.text_cap = TextCap::Lines(self.config.visible_line_count());
            self.presentation.gradient_alpha = ALPHA_OPAQUE;
            if self.shows_gradient() {
                self.presentation.affordances.insert(Affordances::GRADIENT);
            }
        } else {
            self.presentation.text_cap = TextCap::None;
            self.presentation.gradient_alpha = ALPHA_TRANSPARENT;
            self.presentation.affordances.remove(Affordances::GRADIENT);
        }
    }

    /// Settle a finished transition. Returns what to notify, if anything.
    fn settle(&mut self, direction: Direction) -> Option<(bool, Option<Listener>, Signal<bool>)> {
        if self.state != CollapseState::Animating(direction) {
            trace!(?direction, "stale transition completion ignored");
            return None;
        }

        self.state = self.state.on_animation_end();
        self.running.clear();
        self.present_settled();

        let expanded = !self.state.is_collapsed();
        debug!(expanded, "transition settled");
        Some((expanded, self.listener.clone(), self.expanded.clone()))
    }

    fn revert_transition(&mut self) {
        let interrupted = self.state;
        self.state = self.state.on_cancel();
        self.present_settled();
        self.dirty = true;
        debug!(?interrupted, reverted_to = ?self.state, "transition interrupted");
    }
}

// =============================================================================
// DEFERRED CALLBACKS
// =============================================================================

fn with_inner(back: &Back, f: impl FnOnce(&mut Inner)) {
    let Some(inner) = back.upgrade() else {
        trace!("animation frame after teardown ignored");
        return;
    };
    let Ok(mut guard) = inner.try_borrow_mut() else {
        trace!("animation frame skipped, component busy");
        return;
    };
    f(&mut guard);
}

fn capture_text_bottom_margin(back: &Back) {
    with_inner(back, |inner| {
        let margin = inner
            .committed
            .as_ref()
            .map(|m| m.height.saturating_sub(m.text_height()));
        if let Some(margin) = margin {
            trace!(margin, "text bottom margin captured");
            inner.text_bottom_margin = Some(margin);
        }
    });
}

fn settle(back: &Back, direction: Direction) {
    let Some(inner) = back.upgrade() else {
        trace!(?direction, "completion after teardown ignored");
        return;
    };

    let notify = match inner.try_borrow_mut() {
        Ok(mut guard) => guard.settle(direction),
        Err(_) => {
            warn!(?direction, "transition completed while component borrowed");
            None
        }
    };

    if let Some((expanded, listener, signal)) = notify {
        signal.set(expanded);
        if let Some(listener) = listener {
            let mut callback = listener.borrow_mut();
            (*callback)(expanded);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TerminalHost;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_millis(16);
    const TEN_LINES: &str = "one\ntwo\nthree\nfour\nfive\nsix\nseven\neight\nnine\nten";

    fn setup() -> (TerminalHost, CollapsibleText) {
        let host = TerminalHost::new();
        let text = CollapsibleText::new(host.services());
        (host, text)
    }

    fn press(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// Pump the host until the transition settles, laying out every frame.
    fn settle_frames(host: &TerminalHost, text: &CollapsibleText) {
        for _ in 0..100 {
            if host.driver.is_idle() {
                break;
            }
            host.driver.tick(FRAME);
            text.layout(30).unwrap();
            host.queue.run_pending();
        }
    }

    #[test]
    fn test_hidden_until_text_set() {
        let (_host, text) = setup();
        assert_eq!(text.presentation().visibility, Visibility::Gone);
        assert_eq!(text.layout(30).unwrap().height, 0);
        assert_eq!(text.measurement_count(), 0);

        text.set_text("hello");
        assert_eq!(text.presentation().visibility, Visibility::Visible);
        assert_eq!(text.layout(30).unwrap().height, 1);

        text.set_text("");
        assert_eq!(text.presentation().visibility, Visibility::Gone);
        assert_eq!(text.text(), "");
    }

    #[test]
    fn test_body_text_from_style() {
        let host = TerminalHost::new();
        let style = StyleAttributes {
            body_text: Some(TEN_LINES.to_string()),
            visible_lines: Some(2),
            ..StyleAttributes::default()
        };
        let text = CollapsibleText::with_style(&style, host.services());
        assert_eq!(text.text(), TEN_LINES);
        assert_eq!(text.visible_line_count(), 2);
        // 2 text rows + control row
        assert_eq!(text.layout(30).unwrap().height, 3);
    }

    #[test]
    fn test_truncation_shows_control() {
        let (host, text) = setup();
        text.set_text(TEN_LINES);
        let metrics = text.layout(30).unwrap();

        assert_eq!(metrics.height, 5);
        assert!(metrics.expand_control.is_some());
        assert!(text.affordances().contains(Affordances::CLICKABLE));
        assert_eq!(text.text_cap(), TextCap::Lines(4));
        assert_eq!(text.control_icon().map(|i| i.glyph), Some("▾".to_string()));

        assert_eq!(text.text_bottom_margin(), None);
        host.queue.run_pending();
        assert_eq!(text.text_bottom_margin(), Some(1));
    }

    #[test]
    fn test_clean_layout_does_not_remeasure() {
        let (_host, text) = setup();
        text.set_text(TEN_LINES);
        let first = text.layout(30).unwrap();
        let second = text.layout(30).unwrap();
        assert_eq!(first, second);
        assert_eq!(text.measurement_count(), 1);

        text.layout(20).unwrap();
        assert_eq!(text.measurement_count(), 2);
    }

    #[test]
    fn test_setters_validate() {
        let (_host, text) = setup();
        assert!(matches!(
            text.set_visible_line_count(0),
            Err(CollapsibleError::InvalidVisibleLineCount(0))
        ));
        assert!(text.set_animation_duration_ms(-1).is_err());
        assert!(text.set_animation_alpha_start(1.5).is_err());
        assert!(text.set_orientation(Orientation::Horizontal).is_err());
        assert!(text.set_orientation(Orientation::Vertical).is_ok());

        text.set_visible_line_count(6).unwrap();
        text.set_animation_duration_ms(0).unwrap();
        text.set_animation_alpha_start(0.0).unwrap();
        assert_eq!(text.visible_line_count(), 6);
        assert_eq!(text.animation_duration(), Duration::ZERO);
        assert_eq!(text.animation_alpha_start(), 0.0);
    }

    #[test]
    fn test_expand_and_collapse() {
        let (host, text) = setup();
        text.set_expand_label(Some("more".into()));
        text.set_collapse_label(Some("less".into()));
        text.set_text(TEN_LINES);
        text.layout(30).unwrap();
        host.queue.run_pending();
        assert_eq!(text.control_label(), "more");

        assert!(text.click());
        assert_eq!(text.state(), CollapseState::Animating(Direction::ToExpanded));
        assert_eq!(text.control_label(), "less");
        assert!(text.is_collapsed());

        settle_frames(&host, &text);
        assert_eq!(text.state(), CollapseState::Expanded);
        assert_eq!(text.height_constraint(), HeightConstraint::WrapContent);
        assert_eq!(text.text_cap(), TextCap::None);
        assert_eq!(text.layout(30).unwrap().height, 11);

        assert!(text.click());
        settle_frames(&host, &text);
        assert!(text.is_collapsed());
        assert_eq!(text.layout(30).unwrap().height, 5);
        assert_eq!(text.control_label(), "more");
    }

    #[test]
    fn test_listener_and_signal() {
        let (host, text) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        text.set_listener(move |expanded| sink.borrow_mut().push(expanded));
        let signal = text.expanded_signal();

        text.set_text(TEN_LINES);
        text.layout(30).unwrap();
        text.click();
        settle_frames(&host, &text);
        assert!(signal.get());

        text.click();
        settle_frames(&host, &text);
        assert!(!signal.get());
        assert_eq!(*seen.borrow(), vec![true, false]);

        text.clear_listener();
        text.click();
        settle_frames(&host, &text);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_listener_may_reenter_component() {
        let (host, text) = setup();
        let handle = text.clone();
        let observed = Rc::new(Cell::new(None));
        let o = observed.clone();
        text.set_listener(move |_| o.set(Some(handle.is_collapsed())));

        text.set_text(TEN_LINES);
        text.layout(30).unwrap();
        text.click();
        settle_frames(&host, &text);
        assert_eq!(observed.get(), Some(false));
    }

    #[test]
    fn test_pointer_interception() {
        let (host, text) = setup();
        text.set_text(TEN_LINES);
        text.layout(30).unwrap();

        assert!(!text.intercepts_pointer(&press(0, 0)));
        assert!(text.handle_mouse(&press(2, 1), (0, 0)));
        assert!(text.intercepts_pointer(&press(50, 50)));

        let release = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            ..press(2, 1)
        };
        assert!(!text.intercepts_pointer(&release));

        settle_frames(&host, &text);
        assert!(!text.handle_mouse(&press(2, 40), (0, 0)));
    }

    #[test]
    fn test_gradient_fades_in_on_collapse() {
        let (host, text) = setup();
        text.set_transition_gradient(IconSource::Default);
        text.set_text(TEN_LINES);
        text.layout(30).unwrap();
        assert!(text.affordances().contains(Affordances::GRADIENT));
        assert_eq!(text.gradient_alpha(), 1.0);

        text.click();
        settle_frames(&host, &text);
        assert!(!text.affordances().contains(Affordances::GRADIENT));

        text.click();
        assert!(text.affordances().contains(Affordances::GRADIENT));
        assert_eq!(text.gradient_alpha(), 0.0);
        settle_frames(&host, &text);
        assert_eq!(text.gradient_alpha(), 1.0);
    }

    #[test]
    fn test_hidden_icons() {
        let (_host, text) = setup();
        text.set_show_icon(false);
        assert!(text.control_icon().is_none());

        text.set_show_icon(true);
        text.set_expand_collapse_icons(
            IconSource::Default,
            IconSource::Default,
            Some(Rgba::WHITE),
        );
        assert_eq!(text.control_icon().and_then(|i| i.tint), Some(Rgba::WHITE));
    }

    #[test]
    fn test_detach_reverts_and_attach_rearms() {
        let (host, text) = setup();
        text.set_text(TEN_LINES);
        text.layout(30).unwrap();
        text.click();
        host.driver.tick(FRAME);

        text.detach();
        assert!(!text.is_attached());
        assert!(host.driver.is_idle());
        assert_eq!(text.state(), CollapseState::Collapsed);
        assert!(!text.click());

        text.attach();
        assert!(text.is_attached());
        text.layout(30).unwrap();
        assert_eq!(text.measurement_count(), 2);
        assert!(text.click());
    }
}
