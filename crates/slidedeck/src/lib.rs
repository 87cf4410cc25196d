//! State sync and keyboard arbitration for slide decks.
//!
//! A [`Page`] hosts decks. Each [`Deck`] tracks its active slide, keeps it in
//! three places (the shareable location fragment, a durable store shared by
//! every viewer of the same deck, and per-session view preferences), follows
//! other viewers when asked to, and decides what each key press means.
//!
//! ```
//! use slidedeck::{Command, DeckOptions, NullSurface, Page, StorageHub};
//!
//! let hub = StorageHub::in_memory();
//! let mut page = Page::new(&hub, "/talks/intro.html", "");
//! let id = page.attach(DeckOptions::new(5), NullSurface);
//!
//! page.invoke(&id, &Command::Start);
//! page.invoke(&id, &Command::Next);
//! assert_eq!(page.deck(&id).and_then(|deck| deck.active_slide()), Some(2));
//! assert_eq!(page.location().fragment(), "#slide_talks-intro-2");
//! ```

pub mod channels;
pub mod command;
pub mod deck;
pub mod error;
pub mod follow;
pub mod identity;
pub mod input;
pub mod modes;
pub mod nav;
pub mod page;
pub mod storage;
pub mod surface;

#[cfg(test)]
mod tests;

pub use channels::{DurableStore, Location, LocatorChannel, SessionFlag, SessionPreference};
pub use command::Command;
pub use deck::{Deck, DeckOptions};
pub use error::{Error, Result};
pub use follow::{FollowBus, FollowSync, Subscription};
pub use identity::{DeckId, DeckRegistry, StorageKeys};
pub use input::{
    Chord, EscapePolicy, FocusTarget, Key, KeyInput, Keymap, Modifiers, RouterConfig, Routing,
    Tier,
};
pub use modes::{Blank, Effect, Modes, Transition, ViewMode, ViewSet};
pub use nav::NavigationState;
pub use page::Page;
pub use storage::{Area, DurableHandle, FileArea, MemoryArea, StorageEvent, StorageHub};
pub use surface::{NullSurface, RecordingSurface, Surface, SurfaceUpdate};
