//! Input Module - Pointer classification over crossterm events
//!
//! The component only cares about two things a pointer can do:
//! press (which it may intercept while animating, or treat as a click)
//! and everything else (which it never consumes).

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::Bounds;

/// What a crossterm mouse event means to the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Primary button pressed at (column, row).
    Press { column: u16, row: u16 },
    /// Any other button pressed.
    SecondaryPress,
    /// Release, drag, move or scroll.
    Other,
}

/// Classify a crossterm mouse event.
pub fn classify(event: &MouseEvent) -> PointerAction {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerAction::Press {
            column: event.column,
            row: event.row,
        },
        MouseEventKind::Down(_) => PointerAction::SecondaryPress,
        _ => PointerAction::Other,
    }
}

/// Whether the event is a pointer-down of any button.
pub fn is_pointer_down(event: &MouseEvent) -> bool {
    matches!(event.kind, MouseEventKind::Down(_))
}

/// Primary press inside `bounds`, whose origin is at `origin` on screen.
pub fn is_press_inside(event: &MouseEvent, origin: (u16, u16), bounds: Bounds) -> bool {
    match classify(event) {
        PointerAction::Press { column, row } => {
            let (ox, oy) = origin;
            column >= ox && row >= oy && bounds.contains(column - ox, row - oy)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn test_classify_left_press() {
        let event = mouse(MouseEventKind::Down(MouseButton::Left), 10, 5);
        assert_eq!(
            classify(&event),
            PointerAction::Press { column: 10, row: 5 }
        );
        assert!(is_pointer_down(&event));
    }

    #[test]
    fn test_classify_other_buttons() {
        let right = mouse(MouseEventKind::Down(MouseButton::Right), 0, 0);
        assert_eq!(classify(&right), PointerAction::SecondaryPress);
        assert!(is_pointer_down(&right));

        let up = mouse(MouseEventKind::Up(MouseButton::Left), 0, 0);
        assert_eq!(classify(&up), PointerAction::Other);
        assert!(!is_pointer_down(&up));

        let scroll = mouse(MouseEventKind::ScrollDown, 0, 0);
        assert_eq!(classify(&scroll), PointerAction::Other);
    }

    #[test]
    fn test_press_inside_with_origin() {
        let bounds = Bounds::new(0, 0, 20, 5);
        let inside = mouse(MouseEventKind::Down(MouseButton::Left), 12, 7);
        let outside = mouse(MouseEventKind::Down(MouseButton::Left), 12, 9);
        let before = mouse(MouseEventKind::Down(MouseButton::Left), 1, 1);

        assert!(is_press_inside(&inside, (10, 3), bounds));
        assert!(!is_press_inside(&outside, (10, 3), bounds));
        assert!(!is_press_inside(&before, (10, 3), bounds));
    }
}
