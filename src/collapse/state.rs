//! Collapse state machine.
//!
//! `Collapsed` and `Expanded` never reach each other directly: every
//! visible change passes through `Animating`. Each transition function is
//! total; inputs that make no sense in a state are explicit no-ops.

/// Direction of an in-flight transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToExpanded,
    ToCollapsed,
}

impl Direction {
    /// State reached when the transition completes.
    pub fn target(self) -> CollapseState {
        match self {
            Self::ToExpanded => CollapseState::Expanded,
            Self::ToCollapsed => CollapseState::Collapsed,
        }
    }

    /// State the transition started from.
    pub fn origin(self) -> CollapseState {
        match self {
            Self::ToExpanded => CollapseState::Collapsed,
            Self::ToCollapsed => CollapseState::Expanded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollapseState {
    #[default]
    Collapsed,
    Expanded,
    Animating(Direction),
}

/// Why a click did not start a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredClick {
    /// The text fits; there is nothing to expand.
    NotTruncated,
    /// A transition is already running.
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Start(Direction),
    Ignored(IgnoredClick),
}

impl CollapseState {
    pub fn on_click(self, truncated: bool) -> ClickOutcome {
        match self {
            Self::Animating(_) => ClickOutcome::Ignored(IgnoredClick::Animating),
            _ if !truncated => ClickOutcome::Ignored(IgnoredClick::NotTruncated),
            Self::Collapsed => ClickOutcome::Start(Direction::ToExpanded),
            Self::Expanded => ClickOutcome::Start(Direction::ToCollapsed),
        }
    }

    /// Completion of the primary animation. No-op unless animating.
    pub fn on_animation_end(self) -> Self {
        match self {
            Self::Animating(direction) => direction.target(),
            settled => settled,
        }
    }

    /// Teardown mid-transition returns to where the transition started.
    pub fn on_cancel(self) -> Self {
        match self {
            Self::Animating(direction) => direction.origin(),
            settled => settled,
        }
    }

    pub fn is_animating(self) -> bool {
        matches!(self, Self::Animating(_))
    }

    /// Last settled state was collapsed.
    pub fn is_collapsed(self) -> bool {
        matches!(
            self,
            Self::Collapsed | Self::Animating(Direction::ToExpanded)
        )
    }

    /// Whether the control offers to expand. Switches as soon as a
    /// transition starts, to the look of the state being entered.
    pub fn offers_expand(self) -> bool {
        matches!(
            self,
            Self::Collapsed | Self::Animating(Direction::ToCollapsed)
        )
    }
}
