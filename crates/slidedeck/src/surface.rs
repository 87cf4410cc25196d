//! The seam between the engine and whatever draws the deck.

use std::cell::RefCell;
use std::rc::Rc;

use crate::modes::{Blank, Modes};

/// A visible side effect the engine asks the rendering surface for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceUpdate {
    /// Mark slide `current` (a slide id) as the active one.
    MarkCurrent {
        previous: Option<String>,
        current: String,
    },
    /// No slide is active any more.
    ClearCurrent,
    /// Bring the slide with this id into view.
    ScrollIntoView(String),
    FullScreen(bool),
    ShowBlank(Blank),
    HideBlank,
    OpenPanel,
    ClosePanel,
    /// Drop focus from the focused element.
    Blur,
    /// Controls should reflect these modes (pressed state, view attribute).
    Controls(Modes),
}

pub trait Surface {
    fn render(&mut self, update: SurfaceUpdate);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn render(&mut self, _update: SurfaceUpdate) {}
}

/// Keeps every update in a log that stays readable after the surface has
/// been handed to a deck.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Rc<RefCell<Vec<SurfaceUpdate>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<SurfaceUpdate> {
        self.log.borrow().clone()
    }

    /// Take the updates recorded so far, leaving the log empty.
    pub fn drain(&self) -> Vec<SurfaceUpdate> {
        self.log.borrow_mut().drain(..).collect()
    }

    /// The slide id most recently marked current, unless cleared since.
    pub fn current(&self) -> Option<String> {
        self.log
            .borrow()
            .iter()
            .rev()
            .find_map(|update| match update {
                SurfaceUpdate::MarkCurrent { current, .. } => Some(Some(current.clone())),
                SurfaceUpdate::ClearCurrent => Some(None),
                _ => None,
            })
            .flatten()
    }
}

impl Surface for RecordingSurface {
    fn render(&mut self, update: SurfaceUpdate) {
        self.log.borrow_mut().push(update);
    }
}
