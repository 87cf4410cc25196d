//! Follow mode plumbing: an explicit observer list keyed by storage key.
//!
//! A deck in follow mode holds a [`Subscription`] to its durable `slide` key.
//! When a [`StorageEvent`](crate::storage::StorageEvent) for that key arrives,
//! the page looks up the observers and has each of them re-read the saved slide.
//! Dropping the subscription removes the deck from the list.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::identity::DeckId;

#[derive(Debug, Default)]
struct Observers {
    next_token: u64,
    by_key: BTreeMap<String, Vec<(u64, DeckId)>>,
}

/// Per-viewer observer list.
#[derive(Debug, Clone, Default)]
pub struct FollowBus {
    inner: Rc<RefCell<Observers>>,
}

impl FollowBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `deck` as an observer of `key` until the subscription drops.
    pub fn subscribe(&self, key: &str, deck: DeckId) -> Subscription {
        let mut observers = self.inner.borrow_mut();
        let token = observers.next_token;
        observers.next_token += 1;
        trace!(key, %deck, "follow subscribed");
        observers
            .by_key
            .entry(key.to_string())
            .or_default()
            .push((token, deck));
        Subscription {
            bus: Rc::downgrade(&self.inner),
            key: key.to_string(),
            token,
        }
    }

    /// Decks observing `key`, in subscription order.
    pub fn observers(&self, key: &str) -> Vec<DeckId> {
        self.inner
            .borrow()
            .by_key
            .get(key)
            .map(|list| list.iter().map(|(_, deck)| deck.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().by_key.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Membership in a [`FollowBus`]; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<RefCell<Observers>>,
    key: String,
    token: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        let mut observers = bus.borrow_mut();
        if let Some(list) = observers.by_key.get_mut(&self.key) {
            list.retain(|(token, _)| *token != self.token);
            if list.is_empty() {
                observers.by_key.remove(&self.key);
            }
        }
        trace!(key = %self.key, "follow unsubscribed");
    }
}

/// A deck's follow-mode subscription, present exactly while follow mode is on.
#[derive(Debug)]
pub struct FollowSync {
    bus: FollowBus,
    key: String,
    deck: DeckId,
    subscription: Option<Subscription>,
}

impl FollowSync {
    pub fn new(bus: FollowBus, key: &str, deck: DeckId) -> Self {
        Self {
            bus,
            key: key.to_string(),
            deck,
            subscription: None,
        }
    }

    /// Subscribe unless already subscribed.
    pub fn enable(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.bus.subscribe(&self.key, self.deck.clone()));
        }
    }

    pub fn disable(&mut self) {
        self.subscription = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
