//! Scenario tests driving whole pages the way a host would.

mod properties;
mod transitions;

use crate::deck::{Deck, DeckOptions};
use crate::identity::DeckId;
use crate::input::{Key, KeyInput};
use crate::page::Page;
use crate::storage::StorageHub;
use crate::surface::RecordingSurface;

const PAGE_PATH: &str = "/talk.html";

/// A page with one deck on it.
struct Fixture {
    hub: StorageHub,
    page: Page,
    id: DeckId,
    surface: RecordingSurface,
}

impl Fixture {
    fn new(slides: u32) -> Self {
        Self::with_options(DeckOptions::new(slides))
    }

    fn with_options(options: DeckOptions) -> Self {
        let hub = StorageHub::in_memory();
        Self::on_hub(hub, "", options)
    }

    fn on_hub(hub: StorageHub, fragment: &str, options: DeckOptions) -> Self {
        let mut page = Page::new(&hub, PAGE_PATH, fragment);
        let surface = RecordingSurface::new();
        let id = page.attach(options, surface.clone());
        Self {
            hub,
            page,
            id,
            surface,
        }
    }

    fn deck(&self) -> &Deck {
        self.page.deck(&self.id).expect("deck attached")
    }

    fn deck_mut(&mut self) -> &mut Deck {
        self.page.deck_mut(&self.id).expect("deck attached")
    }

    fn active(&self) -> Option<u32> {
        self.deck().active_slide()
    }

    fn saved(&self) -> Option<String> {
        self.hub.peek(&self.deck().keys().slide).unwrap()
    }

    fn press(&mut self, name: &str) -> crate::input::Routing {
        let scope = self.id.to_string();
        self.page.key_down(&scope, &KeyInput::new(Key::from_name(name)))
    }

    fn press_input(&mut self, input: KeyInput) -> crate::input::Routing {
        let scope = self.id.to_string();
        self.page.key_down(&scope, &input)
    }
}
