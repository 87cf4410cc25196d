//! The three persistence channels of a deck: the shareable locator, the
//! durable last-slide entry and the per-session view preferences.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::error::Result;
use crate::identity::{DeckId, StorageKeys};
use crate::modes::{ViewMode, ViewSet};
use crate::nav::parse_slide;
use crate::storage::{DurableHandle, SharedArea};

const LOCATOR_MARKER: &str = "#slide_";

#[derive(Debug, Default)]
struct LocationState {
    fragment: String,
    history: Vec<String>,
}

/// The page's location fragment, shared by every deck on the page.
///
/// Assigning the fragment it already holds adds no history entry.
#[derive(Debug, Clone, Default)]
pub struct Location {
    inner: Rc<RefCell<LocationState>>,
}

impl Location {
    pub fn new(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self {
            inner: Rc::new(RefCell::new(LocationState {
                history: vec![fragment.clone()],
                fragment,
            })),
        }
    }

    pub fn fragment(&self) -> String {
        self.inner.borrow().fragment.clone()
    }

    /// Navigate to `fragment`. Returns false when it was already current.
    pub fn assign(&self, fragment: &str) -> bool {
        let mut state = self.inner.borrow_mut();
        if state.fragment == fragment {
            return false;
        }
        state.fragment = fragment.to_string();
        state.history.push(fragment.to_string());
        true
    }

    pub fn history(&self) -> Vec<String> {
        self.inner.borrow().history.clone()
    }
}

/// Encodes the active slide into the location as `#slide_<deckId>-<N>`.
#[derive(Debug, Clone)]
pub struct LocatorChannel {
    location: Location,
    prefix: String,
    root: String,
}

impl LocatorChannel {
    pub fn new(id: &DeckId, location: Location) -> Self {
        Self {
            location,
            prefix: format!("{LOCATOR_MARKER}{id}-"),
            root: format!("#{id}"),
        }
    }

    pub fn encode(&self, slide: u32) -> String {
        format!("{}{slide}", self.prefix)
    }

    /// Slide named by the current fragment, if it is one of ours.
    ///
    /// Fragments belonging to other decks or to ordinary page anchors decode
    /// to `None`. The number has to run to the end of the fragment, so deck
    /// `talk` never reads `#slide_talk-1-3` (slide 3 of deck `talk-1`).
    pub fn decode(&self) -> Option<i64> {
        let fragment = self.location.fragment();
        let number = fragment.strip_prefix(&self.prefix)?;
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parse_slide(number)
    }

    pub fn write(&self, slide: u32) {
        let fragment = self.encode(slide);
        if self.location.assign(&fragment) {
            trace!(%fragment, "locator updated");
        }
    }

    /// Point the location at the deck itself, dropping any slide.
    pub fn reset(&self) {
        self.location.assign(&self.root);
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// The per-deck "last slide" entry that survives reloads and is shared by
/// every viewer of the same deck id.
#[derive(Clone)]
pub struct DurableStore {
    key: String,
    handle: DurableHandle,
}

impl DurableStore {
    pub fn new(keys: &StorageKeys, handle: DurableHandle) -> Self {
        Self {
            key: keys.slide.clone(),
            handle,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The saved slide, or `None` when absent or not a positive integer.
    pub fn saved(&self) -> Option<u32> {
        let raw = match self.handle.get(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read saved slide");
                return None;
            }
        };
        parse_slide(&raw)
            .filter(|slide| *slide >= 1)
            .and_then(|slide| u32::try_from(slide).ok())
    }

    pub fn get(&self, fallback: u32) -> u32 {
        self.saved().unwrap_or(fallback)
    }

    /// Save `slide`, or remove the entry when `None`.
    pub fn set(&self, slide: Option<u32>) -> Result<()> {
        match slide {
            Some(slide) => self.handle.set(&self.key, &slide.to_string()),
            None => self.handle.remove(&self.key),
        }
    }
}

/// Which session-scoped mode flag to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlag {
    KeyControl,
    FollowActive,
}

/// Per-tab preferences: the view, and whether key control and follow mode are on.
#[derive(Clone)]
pub struct SessionPreference {
    keys: StorageKeys,
    area: SharedArea,
}

impl SessionPreference {
    pub fn new(keys: &StorageKeys, area: SharedArea) -> Self {
        Self {
            keys: keys.clone(),
            area,
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.area.borrow().get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "could not read session preference");
                None
            }
        }
    }

    fn flag_key(&self, flag: SessionFlag) -> &str {
        match flag {
            SessionFlag::KeyControl => &self.keys.control,
            SessionFlag::FollowActive => &self.keys.follow,
        }
    }

    pub fn view(&self) -> Option<String> {
        self.read(&self.keys.view)
    }

    pub fn set_view(&self, view: &ViewMode) -> Result<()> {
        self.area.borrow_mut().set(&self.keys.view, view.as_str())
    }

    pub fn flag(&self, flag: SessionFlag) -> Option<bool> {
        match self.read(self.flag_key(flag))?.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn set_flag(&self, flag: SessionFlag, on: bool) -> Result<()> {
        let value = if on { "true" } else { "false" };
        self.area.borrow_mut().set(self.flag_key(flag), value)
    }

    /// Forget every preference of this deck.
    pub fn clear(&self) -> Result<()> {
        let mut area = self.area.borrow_mut();
        for key in [&self.keys.view, &self.keys.control, &self.keys.follow] {
            area.remove(key)?;
        }
        Ok(())
    }

    /// View to start in: the session value, then the attribute, then the
    /// deck's default. Values the deck does not know are skipped.
    pub fn resolve_view(&self, attribute: Option<&str>, views: &ViewSet) -> ViewMode {
        self.view()
            .and_then(|view| views.find(&view))
            .or_else(|| attribute.and_then(|view| views.find(view)))
            .unwrap_or_else(|| views.default_view().clone())
    }

    /// Flag to start with: the session value, then the attribute.
    pub fn resolve_flag(&self, flag: SessionFlag, attribute: bool) -> bool {
        self.flag(flag).unwrap_or(attribute)
    }
}
