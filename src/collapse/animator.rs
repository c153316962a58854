//! Transition planning and animation construction.
//!
//! A transition is two driver animations of equal duration:
//!
//! - primary: container height and text alpha, carrying the completion
//!   that settles the state machine
//! - gradient: overlay alpha, fire-and-forget

use std::time::Duration;

use tracing::debug;

use crate::config::{ALPHA_OPAQUE, ALPHA_TRANSPARENT};
use crate::layout::ContainerMetrics;
use crate::state::Animation;
use crate::types::TextCap;

use super::measure::Measurement;
use super::state::Direction;

/// Endpoints of one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPlan {
    pub direction: Direction,
    pub from_height: u16,
    pub to_height: u16,
    pub alpha_from: f32,
    pub alpha_to: f32,
    pub gradient_from: f32,
    pub gradient_to: f32,
    /// Container rows not taken by the text element.
    pub text_bottom_margin: u16,
    pub duration: Duration,
}

impl TransitionPlan {
    /// Plan a transition from the committed layout.
    ///
    /// Expanding grows the container by exactly the hidden text height.
    /// Collapsing shrinks it to the measured collapsed height.
    pub fn new(
        direction: Direction,
        committed: &ContainerMetrics,
        measurement: &Measurement,
        collapsed_container_height: u16,
        text_bottom_margin: u16,
        alpha_start: f32,
        duration: Duration,
    ) -> Self {
        let from_height = committed.height;
        let (to_height, gradient_from, gradient_to) = match direction {
            Direction::ToExpanded => (
                from_height
                    .saturating_add(measurement.full_content_height)
                    .saturating_sub(committed.text_height()),
                ALPHA_OPAQUE,
                ALPHA_TRANSPARENT,
            ),
            Direction::ToCollapsed => {
                (collapsed_container_height, ALPHA_TRANSPARENT, ALPHA_OPAQUE)
            }
        };

        let plan = Self {
            direction,
            from_height,
            to_height,
            alpha_from: alpha_start,
            alpha_to: ALPHA_OPAQUE,
            gradient_from,
            gradient_to,
            text_bottom_margin,
            duration,
        };
        debug!(
            ?direction,
            from = plan.from_height,
            to = plan.to_height,
            margin = plan.text_bottom_margin,
            duration_ms = duration.as_millis() as u64,
            "transition planned"
        );
        plan
    }

    /// Text clip for an animated container height.
    pub fn text_cap_at(&self, height: u16) -> TextCap {
        TextCap::Height(height.saturating_sub(self.text_bottom_margin))
    }

    /// Build both animations. `on_height` receives whole rows.
    pub fn build(
        &self,
        mut on_height: impl FnMut(u16) + 'static,
        on_text_alpha: impl FnMut(f32) + 'static,
        on_gradient_alpha: impl FnMut(f32) + 'static,
        on_end: impl FnOnce() + 'static,
    ) -> (Animation, Animation) {
        let primary = Animation::new(self.duration)
            .track(self.from_height as f32, self.to_height as f32, move |value| {
                on_height(value.round().max(0.0) as u16)
            })
            .track(self.alpha_from, self.alpha_to, on_text_alpha)
            .on_end(on_end);

        let gradient = Animation::new(self.duration).track(
            self.gradient_from,
            self.gradient_to,
            on_gradient_alpha,
        );

        (primary, gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AnimationDriver, FrameDriver};
    use crate::layout::TextLayout;
    use crate::types::{Bounds, Insets};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn committed(height: u16, text_height: u16) -> ContainerMetrics {
        ContainerMetrics {
            width: 20,
            height,
            body: Bounds::new(0, 0, 20, text_height),
            expand_control: None,
            gradient: None,
            text: TextLayout::new(Vec::new(), 1, Insets::ZERO, TextCap::None),
        }
    }

    fn measurement(full: u16) -> Measurement {
        Measurement {
            requires_truncation: true,
            line_count: full,
            full_content_height: full,
            collapsed_container_height: Some(5),
        }
    }

    #[test]
    fn test_expand_grows_by_hidden_text() {
        let plan = TransitionPlan::new(
            Direction::ToExpanded,
            &committed(5, 4),
            &measurement(10),
            5,
            1,
            0.7,
            Duration::from_millis(300),
        );
        assert_eq!(plan.from_height, 5);
        assert_eq!(plan.to_height, 11);
        assert_eq!((plan.alpha_from, plan.alpha_to), (0.7, 1.0));
        assert_eq!((plan.gradient_from, plan.gradient_to), (1.0, 0.0));
        assert_eq!(plan.text_cap_at(11), TextCap::Height(10));
    }

    #[test]
    fn test_collapse_targets_collapsed_height() {
        let plan = TransitionPlan::new(
            Direction::ToCollapsed,
            &committed(11, 10),
            &measurement(10),
            5,
            1,
            0.7,
            Duration::from_millis(300),
        );
        assert_eq!(plan.to_height, 5);
        assert_eq!((plan.alpha_from, plan.alpha_to), (0.7, 1.0));
        assert_eq!((plan.gradient_from, plan.gradient_to), (0.0, 1.0));
    }

    #[test]
    fn test_text_cap_never_underflows() {
        let plan = TransitionPlan::new(
            Direction::ToCollapsed,
            &committed(3, 2),
            &measurement(2),
            1,
            4,
            0.7,
            Duration::ZERO,
        );
        assert_eq!(plan.text_cap_at(2), TextCap::Height(0));
    }

    #[test]
    fn test_build_drives_tracks_and_single_completion() {
        let plan = TransitionPlan::new(
            Direction::ToExpanded,
            &committed(5, 4),
            &measurement(10),
            5,
            1,
            0.7,
            Duration::from_millis(100),
        );
        let heights = Rc::new(RefCell::new(Vec::new()));
        let gradient = Rc::new(Cell::new(-1.0));
        let ends = Rc::new(Cell::new(0));

        let h = heights.clone();
        let g = gradient.clone();
        let e = ends.clone();
        let (primary, fade) = plan.build(
            move |rows| h.borrow_mut().push(rows),
            |_| {},
            move |alpha| g.set(alpha),
            move || e.set(e.get() + 1),
        );
        assert_eq!(primary.track_count(), 2);
        assert_eq!(fade.track_count(), 1);

        let driver = FrameDriver::new();
        driver.start(primary);
        driver.start(fade);
        driver.run_to_completion(Duration::from_millis(16), 100);

        assert_eq!(heights.borrow().last(), Some(&11));
        assert_eq!(gradient.get(), 0.0);
        assert_eq!(ends.get(), 1);
    }
}
