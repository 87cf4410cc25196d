//! Deck identity: the namespace every persisted key and locator is built from.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

const FALLBACK_BASE: &str = "deck";
const SLIDE_PREFIX: &str = "slide_";

/// Collision-free id of one deck instance on a page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeckId(String);

impl DeckId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Addressable id of the slide at `ordinal` (1-indexed).
    pub fn slide_id(&self, ordinal: u32) -> String {
        format!("{SLIDE_PREFIX}{}-{ordinal}", self.0)
    }

    /// Storage keys namespaced by this id.
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::for_deck(self)
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeckId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The four persistence channels of a deck, each prefixed with the deck id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub control: String,
    pub follow: String,
    pub view: String,
    pub slide: String,
}

impl StorageKeys {
    pub fn for_deck(id: &DeckId) -> Self {
        let key = |channel: &str| format!("{}.{channel}", id.as_str());
        Self {
            control: key("control"),
            follow: key("follow"),
            view: key("view"),
            slide: key("slide"),
        }
    }
}

/// Ids in use on one page.
///
/// Ids not owned by a deck (other elements on the page) can be reserved so a
/// deck never shadows them.
#[derive(Debug, Default)]
pub struct DeckRegistry {
    taken: BTreeSet<String>,
}

impl DeckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an id as used by something other than a deck.
    pub fn reserve(&mut self, id: &str) {
        self.taken.insert(id.to_string());
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Claim a unique id, from `explicit` when given, otherwise from the page path.
    ///
    /// On collision the base gets `-1`, `-2`, ... appended until it is free.
    pub fn claim(&mut self, explicit: Option<&str>, page_path: &str) -> DeckId {
        let base = match explicit.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => base_from_path(page_path),
        };

        let mut candidate = base.clone();
        let mut count = 0u32;
        while self.taken.contains(&candidate) {
            count += 1;
            candidate = format!("{base}-{count}");
        }

        if count > 0 {
            debug!(base = %base, id = %candidate, "deck id collided, suffixed");
        }
        self.taken.insert(candidate.clone());
        DeckId(candidate)
    }

    /// Take back an id previously handed out by [`claim`](Self::claim).
    ///
    /// Returns false when the id is already held (re-attaching next to a
    /// deck that took the same name in the meantime).
    pub fn restore(&mut self, id: &DeckId) -> bool {
        self.taken.insert(id.0.clone())
    }

    pub fn release(&mut self, id: &DeckId) {
        self.taken.remove(id.as_str());
    }
}

/// Default id base: the document path up to its first `.`, with slashes folded.
fn base_from_path(path: &str) -> String {
    let stem = path.split('.').next().unwrap_or_default();
    let base = stem.trim_matches('/').replace('/', "-");
    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}
