//! A page: one browsing context hosting any number of decks.
//!
//! The page owns what its decks share: the location, the session area, this
//! viewer's handle on the durable hub, the follow observer list and the id
//! registry. Key presses arrive through an explicit scope → deck registry
//! instead of a page-wide listener.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::channels::Location;
use crate::command::Command;
use crate::deck::{Deck, DeckOptions, PageContext};
use crate::follow::FollowBus;
use crate::identity::{DeckId, DeckRegistry};
use crate::input::{KeyInput, Routing};
use crate::storage::{DurableHandle, MemoryArea, SharedArea, StorageHub, shared};
use crate::surface::Surface;

pub struct Page {
    path: String,
    location: Location,
    session: SharedArea,
    durable: DurableHandle,
    bus: FollowBus,
    identities: DeckRegistry,
    decks: BTreeMap<DeckId, Deck>,
    scopes: BTreeMap<String, DeckId>,
}

impl Page {
    /// Open a page at `path` with `fragment` as the initial location, as a
    /// new viewer of `hub`, with a fresh session.
    pub fn new(hub: &StorageHub, path: &str, fragment: &str) -> Self {
        Self::with_session(hub, path, fragment, shared(MemoryArea::new()))
    }

    /// Like [`new`](Self::new), but reusing a session area, the way a
    /// reload keeps the tab's session storage.
    pub fn with_session(hub: &StorageHub, path: &str, fragment: &str, session: SharedArea) -> Self {
        Self {
            path: path.to_string(),
            location: Location::new(fragment),
            session,
            durable: hub.connect(),
            bus: FollowBus::new(),
            identities: DeckRegistry::new(),
            decks: BTreeMap::new(),
            scopes: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn session(&self) -> &SharedArea {
        &self.session
    }

    pub fn durable(&self) -> &DurableHandle {
        &self.durable
    }

    pub fn follow_bus(&self) -> &FollowBus {
        &self.bus
    }

    /// Keep decks from taking an id some other element of the page uses.
    pub fn reserve_id(&mut self, id: &str) {
        self.identities.reserve(id);
    }

    pub fn attach(&mut self, options: DeckOptions, surface: impl Surface + 'static) -> DeckId {
        let id = self.identities.claim(options.id.as_deref(), &self.path);
        let context = PageContext {
            location: self.location.clone(),
            session: self.session.clone(),
            durable: self.durable.clone(),
            bus: self.bus.clone(),
        };
        let mut deck = Deck::attach(id.clone(), &options, context, Box::new(surface));

        let requested = options.input_scope.unwrap_or_else(|| id.to_string());
        deck.input_scope = self.register_scope(requested, &id);
        self.decks.insert(id.clone(), deck);
        id
    }

    /// Returns the scope the deck ended up with, if any.
    fn register_scope(&mut self, requested: String, id: &DeckId) -> Option<String> {
        let scope = if self.scopes.contains_key(&requested) {
            warn!(scope = %requested, deck = %id, "input scope taken, using deck id");
            id.to_string()
        } else {
            requested
        };
        if let Some(owner) = self.scopes.get(&scope) {
            warn!(scope = %scope, owner = %owner, deck = %id, "deck has no input scope");
            return None;
        }
        debug!(scope = %scope, deck = %id, "input scope registered");
        self.scopes.insert(scope.clone(), id.clone());
        Some(scope)
    }

    /// Take a deck off the page. Its keyboard scope and follow subscription
    /// are gone when this returns.
    pub fn detach(&mut self, id: &DeckId) -> Option<Deck> {
        let mut deck = self.decks.remove(id)?;
        self.scopes.retain(|_, owner| owner != id);
        deck.suspend();
        self.identities.release(id);
        debug!(deck = %id, "deck detached");
        Some(deck)
    }

    /// Put a detached deck back, under its own id and the scope it had.
    ///
    /// Fails, handing the deck back, when another deck took its id meanwhile.
    pub fn reattach(&mut self, mut deck: Deck) -> Result<DeckId, Box<Deck>> {
        let id = deck.id().clone();
        if !self.identities.restore(&id) {
            warn!(deck = %id, "deck id taken while detached");
            return Err(Box::new(deck));
        }
        deck.resubscribe();
        let requested = deck.input_scope.take().unwrap_or_else(|| id.to_string());
        deck.input_scope = self.register_scope(requested, &id);
        self.decks.insert(id.clone(), deck);
        debug!(deck = %id, "deck reattached");
        Ok(id)
    }

    pub fn deck(&self, id: &DeckId) -> Option<&Deck> {
        self.decks.get(id)
    }

    pub fn deck_mut(&mut self, id: &DeckId) -> Option<&mut Deck> {
        self.decks.get_mut(id)
    }

    pub fn deck_ids(&self) -> Vec<DeckId> {
        self.decks.keys().cloned().collect()
    }

    /// Deck listening on an input scope.
    pub fn scope_owner(&self, scope: &str) -> Option<&DeckId> {
        self.scopes.get(scope)
    }

    /// Deliver a key press to the deck registered for `scope`.
    pub fn key_down(&mut self, scope: &str, input: &KeyInput) -> Routing {
        let Some(id) = self.scopes.get(scope) else {
            return Routing::fall_through();
        };
        match self.decks.get_mut(id) {
            Some(deck) => deck.handle_key(input),
            None => Routing::fall_through(),
        }
    }

    /// Run a command on a deck. Returns whether anything changed.
    pub fn invoke(&mut self, id: &DeckId, command: &Command) -> bool {
        self.decks
            .get_mut(id)
            .is_some_and(|deck| deck.invoke(command))
    }

    /// Deliver every queued durable-store change to the decks following it.
    /// Returns the number of events taken from the inbox.
    pub fn pump_storage_events(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.durable.next_event() {
            delivered += 1;
            for id in self.bus.observers(&event.key) {
                if let Some(deck) = self.decks.get_mut(&id) {
                    deck.on_storage_event(&event);
                }
            }
        }
        delivered
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.durable.hub().disconnect(self.durable.viewer());
    }
}
