//! Host services.
//!
//! The services a component consumes from its host. Each is a trait object
//! so a host plugs in its own text stack, frame clock or event loop.

use std::rc::Rc;

use crate::layout::{CellTextMeasurer, TextMeasurer};
use crate::resources::{GlyphIcons, IconResolver};
use crate::state::{AnimationDriver, DeferredQueue, FrameDriver, Scheduler};

#[derive(Clone)]
pub struct HostServices {
    pub measurer: Rc<dyn TextMeasurer>,
    pub animations: Rc<dyn AnimationDriver>,
    pub scheduler: Rc<dyn Scheduler>,
    pub icons: Rc<dyn IconResolver>,
}

impl HostServices {
    pub fn new(
        measurer: Rc<dyn TextMeasurer>,
        animations: Rc<dyn AnimationDriver>,
        scheduler: Rc<dyn Scheduler>,
        icons: Rc<dyn IconResolver>,
    ) -> Self {
        Self {
            measurer,
            animations,
            scheduler,
            icons,
        }
    }
}

/// Built-in terminal host: cell measurement, a frame driver, a deferred
/// queue and glyph icons. Keep the driver and queue handles to pump them.
pub struct TerminalHost {
    pub driver: Rc<FrameDriver>,
    pub queue: Rc<DeferredQueue>,
    pub icons: Rc<GlyphIcons>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::with_icons(GlyphIcons::new())
    }

    pub fn with_icons(icons: GlyphIcons) -> Self {
        Self {
            driver: Rc::new(FrameDriver::new()),
            queue: Rc::new(DeferredQueue::new()),
            icons: Rc::new(icons),
        }
    }

    pub fn services(&self) -> HostServices {
        HostServices::new(
            Rc::new(CellTextMeasurer),
            self.driver.clone(),
            self.queue.clone(),
            self.icons.clone(),
        )
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}
