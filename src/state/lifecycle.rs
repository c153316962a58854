//! Lifecycle guard for deferred callbacks.
//!
//! Work scheduled past the current turn (post-layout margin capture,
//! animation updates and completion) reaches its component through a
//! [`BackRef`]: a weak reference that can also be cleared explicitly.
//!
//! All clones share one slot. Clearing any clone disarms every callback
//! created from it, even if the component itself is still alive and later
//! re-attached with a fresh `BackRef`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub struct BackRef<T> {
    slot: Rc<RefCell<Option<Weak<T>>>>,
}

impl<T> BackRef<T> {
    pub fn new(target: &Rc<T>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(Rc::downgrade(target)))),
        }
    }

    /// For use inside `Rc::new_cyclic`, before the target exists.
    pub fn from_weak(target: Weak<T>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(target))),
        }
    }

    /// The target, unless cleared or dropped.
    pub fn upgrade(&self) -> Option<Rc<T>> {
        self.slot.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Disarm every clone of this reference.
    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    pub fn is_cleared(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl<T> Clone for BackRef<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for BackRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackRef")
            .field("cleared", &self.is_cleared())
            .finish()
    }
}
