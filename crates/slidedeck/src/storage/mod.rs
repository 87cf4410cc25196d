//! Key/value storage areas backing the durable and session channels.

pub mod file;
pub mod hub;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Result;

pub use file::FileArea;
pub use hub::{DurableHandle, StorageEvent, StorageHub, ViewerId};

/// A string-to-string storage area, the shape of browser local/session storage.
pub trait Area {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Keys changed behind this area's back since the last call.
    ///
    /// Only areas shared with other processes ever report anything.
    fn refresh(&mut self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// A storage area shared by every deck of one page (session storage).
pub type SharedArea = Rc<RefCell<dyn Area>>;

/// Wrap an area so several decks can hold it.
pub fn shared(area: impl Area + 'static) -> SharedArea {
    Rc::new(RefCell::new(area))
}

/// In-process storage area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryArea {
    entries: BTreeMap<String, String>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Area for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
