//! The durable area shared by every viewer, and its change broadcast.
//!
//! A write made through one viewer's [`DurableHandle`] that actually changes
//! a value is queued as a [`StorageEvent`] for every *other* connected
//! viewer, the way browser `storage` events reach other windows but never the
//! writer. Viewers drain their own inbox whenever their host loop gets to it,
//! so delivery is deferred and unordered relative to local writes.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use super::{Area, MemoryArea};
use crate::error::Result;

/// One browsing context connected to a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewerId(u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer-{}", self.0)
    }
}

/// A durable value changed somewhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

struct HubInner {
    area: Box<dyn Area>,
    next_viewer: u64,
    inboxes: BTreeMap<ViewerId, VecDeque<StorageEvent>>,
}

impl HubInner {
    fn broadcast(&mut self, origin: Option<ViewerId>, event: &StorageEvent) {
        for (viewer, inbox) in self.inboxes.iter_mut() {
            if Some(*viewer) != origin {
                inbox.push_back(event.clone());
            }
        }
    }
}

/// Durable storage shared by all viewers of one browsing environment.
#[derive(Clone)]
pub struct StorageHub {
    inner: Rc<RefCell<HubInner>>,
}

impl StorageHub {
    pub fn new(area: impl Area + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                area: Box::new(area),
                next_viewer: 0,
                inboxes: BTreeMap::new(),
            })),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryArea::new())
    }

    /// Register a new viewer and hand back its handle.
    pub fn connect(&self) -> DurableHandle {
        let mut inner = self.inner.borrow_mut();
        let viewer = ViewerId(inner.next_viewer);
        inner.next_viewer += 1;
        inner.inboxes.insert(viewer, VecDeque::new());
        trace!(%viewer, "viewer connected");
        DurableHandle {
            hub: self.clone(),
            viewer,
        }
    }

    /// Stop queueing events for `viewer`.
    pub fn disconnect(&self, viewer: ViewerId) {
        self.inner.borrow_mut().inboxes.remove(&viewer);
        trace!(%viewer, "viewer disconnected");
    }

    pub fn viewer_count(&self) -> usize {
        self.inner.borrow().inboxes.len()
    }

    /// Pick up changes other processes made to the underlying area and queue
    /// them for every connected viewer. Returns the number of changed keys.
    pub fn refresh(&self) -> Result<usize> {
        let mut inner = self.inner.borrow_mut();
        let changed = inner.area.refresh()?;
        for key in &changed {
            let new_value = inner.area.get(key)?;
            let event = StorageEvent {
                key: key.clone(),
                new_value,
            };
            inner.broadcast(None, &event);
        }
        Ok(changed.len())
    }

    /// Read a value without going through a viewer.
    pub fn peek(&self, key: &str) -> Result<Option<String>> {
        self.inner.borrow().area.get(key)
    }
}

/// A viewer's access to the shared durable area.
#[derive(Clone)]
pub struct DurableHandle {
    hub: StorageHub,
    viewer: ViewerId,
}

impl DurableHandle {
    pub fn viewer(&self) -> ViewerId {
        self.viewer
    }

    pub fn hub(&self) -> &StorageHub {
        &self.hub
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.hub.inner.borrow().area.get(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, Some(value))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.write(key, None)
    }

    fn write(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut inner = self.hub.inner.borrow_mut();
        let previous = match inner.area.get(key) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(key, error = %e, "could not read previous value, broadcasting anyway");
                None
            }
        };
        match value {
            Some(value) => inner.area.set(key, value)?,
            None => inner.area.remove(key)?,
        }

        if previous.as_deref() == value {
            return Ok(());
        }
        let event = StorageEvent {
            key: key.to_string(),
            new_value: value.map(str::to_string),
        };
        inner.broadcast(Some(self.viewer), &event);
        Ok(())
    }

    /// Next change made by another viewer, if any is waiting.
    pub fn next_event(&self) -> Option<StorageEvent> {
        self.hub
            .inner
            .borrow_mut()
            .inboxes
            .get_mut(&self.viewer)
            .and_then(VecDeque::pop_front)
    }

    pub fn pending_events(&self) -> usize {
        self.hub
            .inner
            .borrow()
            .inboxes
            .get(&self.viewer)
            .map_or(0, VecDeque::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_reach_other_viewers_only() {
        let hub = StorageHub::in_memory();
        let a = hub.connect();
        let b = hub.connect();
        let c = hub.connect();

        a.set("deck.slide", "3").unwrap();

        assert_eq!(a.next_event(), None);
        let expected = StorageEvent {
            key: "deck.slide".to_string(),
            new_value: Some("3".to_string()),
        };
        assert_eq!(b.next_event(), Some(expected.clone()));
        assert_eq!(c.next_event(), Some(expected));
        assert_eq!(b.get("deck.slide").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_unchanged_writes_are_not_broadcast() {
        let hub = StorageHub::in_memory();
        let a = hub.connect();
        let b = hub.connect();
        a.set("k", "1").unwrap();
        a.set("k", "1").unwrap();
        assert_eq!(b.pending_events(), 1);

        a.remove("missing").unwrap();
        assert_eq!(b.pending_events(), 1);

        a.remove("k").unwrap();
        assert_eq!(b.pending_events(), 2);
    }

    #[test]
    fn test_disconnected_viewer_gets_nothing() {
        let hub = StorageHub::in_memory();
        let a = hub.connect();
        let b = hub.connect();
        hub.disconnect(b.viewer());
        a.set("k", "1").unwrap();
        assert_eq!(b.next_event(), None);
        assert_eq!(hub.viewer_count(), 1);
    }

    #[test]
    fn test_refresh_reaches_every_local_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let hub = StorageHub::new(crate::storage::FileArea::open(&path).unwrap());
        let a = hub.connect();

        let mut other_process = crate::storage::FileArea::open(&path).unwrap();
        other_process.set("deck.slide", "4").unwrap();

        assert_eq!(hub.refresh().unwrap(), 1);
        assert_eq!(
            a.next_event(),
            Some(StorageEvent {
                key: "deck.slide".to_string(),
                new_value: Some("4".to_string()),
            })
        );
    }
}
