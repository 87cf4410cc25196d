//! One deck instance: navigation, persistence, follow mode and key handling
//! wired together.

use tracing::{debug, info, warn};

use crate::channels::{DurableStore, Location, LocatorChannel, SessionFlag, SessionPreference};
use crate::command::Command;
use crate::follow::{FollowBus, FollowSync};
use crate::identity::{DeckId, StorageKeys};
use crate::input::{KeyInput, RouterConfig, RouterState, Routing, Tier, route};
use crate::modes::{self, Effect, Modes, Transition, ViewMode, ViewSet};
use crate::nav::{NavigationState, parse_slide};
use crate::storage::{DurableHandle, SharedArea, StorageEvent};
use crate::surface::{Surface, SurfaceUpdate};

/// How a deck is set up when it attaches to a page.
///
/// `view`, `key_control` and `follow_active` are the values the host markup
/// carries; a session preference saved earlier takes precedence over them.
#[derive(Debug, Clone, Default)]
pub struct DeckOptions {
    /// Explicit id. Without one the id comes from the page path.
    pub id: Option<String>,
    pub slide_count: u32,
    pub views: ViewSet,
    pub view: Option<String>,
    pub key_control: bool,
    pub follow_active: bool,
    pub router: RouterConfig,
    /// Keyboard scope to register under. Defaults to the deck id.
    pub input_scope: Option<String>,
}

impl DeckOptions {
    pub fn new(slide_count: u32) -> Self {
        Self {
            slide_count,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_views(mut self, views: ViewSet) -> Self {
        self.views = views;
        self
    }

    pub fn with_view(mut self, view: &str) -> Self {
        self.view = Some(view.to_string());
        self
    }

    pub fn with_key_control(mut self, on: bool) -> Self {
        self.key_control = on;
        self
    }

    pub fn with_follow(mut self, on: bool) -> Self {
        self.follow_active = on;
        self
    }

    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }

    pub fn with_input_scope(mut self, scope: &str) -> Self {
        self.input_scope = Some(scope.to_string());
        self
    }
}

/// The pieces of a page a deck plugs into.
pub(crate) struct PageContext {
    pub location: Location,
    pub session: SharedArea,
    pub durable: DurableHandle,
    pub bus: FollowBus,
}

pub struct Deck {
    id: DeckId,
    keys: StorageKeys,
    nav: NavigationState,
    modes: Modes,
    views: ViewSet,
    router: RouterConfig,
    locator: LocatorChannel,
    durable: DurableStore,
    session: SessionPreference,
    follow: FollowSync,
    surface: Box<dyn Surface>,
    /// Keyboard scope the page delivers to this deck under.
    pub(crate) input_scope: Option<String>,
}

impl Deck {
    /// Build a deck, restore its modes and activate the slide the location
    /// points at.
    pub(crate) fn attach(
        id: DeckId,
        options: &DeckOptions,
        context: PageContext,
        surface: Box<dyn Surface>,
    ) -> Self {
        let keys = id.storage_keys();
        let initial = Modes::initial(&options.views);
        let mut deck = Self {
            locator: LocatorChannel::new(&id, context.location),
            durable: DurableStore::new(&keys, context.durable),
            session: SessionPreference::new(&keys, context.session),
            follow: FollowSync::new(context.bus, &keys.slide, id.clone()),
            nav: NavigationState::new(options.slide_count),
            modes: initial.clone(),
            views: options.views.clone(),
            router: options.router.clone(),
            keys,
            id,
            surface,
            input_scope: None,
        };

        let restored = Modes {
            view: deck
                .session
                .resolve_view(options.view.as_deref(), &options.views),
            key_control: deck
                .session
                .resolve_flag(SessionFlag::KeyControl, options.key_control),
            follow_active: deck
                .session
                .resolve_flag(SessionFlag::FollowActive, options.follow_active),
            ..initial.clone()
        };

        // A slide named by the location beats the saved one
        let linked = deck.go_to(None);
        deck.modes = restored;
        for effect in modes::effects_between(&initial, &deck.modes) {
            if linked && effect == Effect::GoToSaved {
                continue;
            }
            deck.run(effect);
        }
        deck.run(Effect::Reflect);

        info!(
            deck = %deck.id,
            slides = deck.nav.slide_count(),
            view = %deck.modes.view,
            key_control = deck.modes.key_control,
            follow = deck.modes.follow_active,
            "deck attached"
        );
        deck
    }

    pub fn id(&self) -> &DeckId {
        &self.id
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn active_slide(&self) -> Option<u32> {
        self.nav.active()
    }

    pub fn slide_count(&self) -> u32 {
        self.nav.slide_count()
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn router_config(&self) -> &RouterConfig {
        &self.router
    }

    pub fn locator(&self) -> &LocatorChannel {
        &self.locator
    }

    pub fn input_scope(&self) -> Option<&str> {
        self.input_scope.as_deref()
    }

    pub fn saved_slide(&self) -> Option<u32> {
        self.durable.saved()
    }

    /// Make `target` the active slide.
    ///
    /// `None` means "whatever the location names, else the current slide".
    /// Out-of-range targets are ignored. Returns whether a slide was activated.
    pub fn go_to(&mut self, target: Option<i64>) -> bool {
        let from_locator = self.locator.decode();
        let Some(target) = self.nav.resolve(target, from_locator) else {
            return false;
        };
        let previous = self.nav.active();
        let Some(slide) = self.nav.select(target) else {
            debug!(deck = %self.id, target, "slide out of range, ignored");
            return false;
        };

        match self.durable.set(Some(slide)) {
            Ok(()) => {
                if from_locator != Some(i64::from(slide)) {
                    self.locator.write(slide);
                }
            }
            Err(e) => {
                warn!(deck = %self.id, slide, error = %e, "could not save slide, locator left as is");
            }
        }

        self.surface.render(SurfaceUpdate::MarkCurrent {
            previous: previous.map(|p| self.id.slide_id(p)),
            current: self.id.slide_id(slide),
        });
        debug!(deck = %self.id, slide, "slide activated");
        true
    }

    /// Go to a slide typed or clicked as text. Text without a leading number
    /// does nothing.
    pub fn go_to_input(&mut self, text: &str) -> bool {
        match parse_slide(text) {
            Some(target) => self.go_to(Some(target)),
            None => false,
        }
    }

    pub fn move_by(&mut self, delta: i64) -> bool {
        let target = self.nav.offset(delta, self.locator.decode());
        self.go_to(Some(target))
    }

    pub fn next(&mut self) -> bool {
        self.move_by(1)
    }

    pub fn previous(&mut self) -> bool {
        self.move_by(-1)
    }

    pub fn first_slide(&mut self) -> bool {
        self.go_to(Some(1))
    }

    pub fn last_slide(&mut self) -> bool {
        self.go_to(Some(i64::from(self.nav.slide_count())))
    }

    /// Go to the slide saved in the durable store, or the first slide.
    pub fn go_to_saved(&mut self) -> bool {
        let saved = self.durable.get(1);
        self.go_to(Some(i64::from(saved)))
    }

    /// Forget the position: no active slide, the location points at the
    /// deck itself and the saved slide is removed.
    pub fn reset_active(&mut self) {
        let previous = self.nav.active();
        self.nav.clear();
        self.locator.reset();
        if let Err(e) = self.durable.set(None) {
            warn!(deck = %self.id, error = %e, "could not remove saved slide");
        }
        if previous.is_some() {
            self.surface.render(SurfaceUpdate::ClearCurrent);
        }
        debug!(deck = %self.id, "position reset");
    }

    /// Run a mode transition and its effects.
    pub fn apply(&mut self, event: Transition) {
        let (next, effects) = modes::transition(&self.modes, &event, &self.views);
        if next != self.modes {
            info!(
                deck = %self.id,
                transition = ?event,
                view = %next.view,
                key_control = next.key_control,
                follow = next.follow_active,
                "modes changed"
            );
        }
        self.modes = next;
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::GoToFirst => {
                self.first_slide();
            }
            Effect::GoToSaved => {
                self.go_to_saved();
            }
            Effect::ResetActive => self.reset_active(),
            Effect::Subscribe => self.follow.enable(),
            Effect::Unsubscribe => self.follow.disable(),
            Effect::PersistView => {
                if let Err(e) = self.session.set_view(&self.modes.view) {
                    warn!(deck = %self.id, error = %e, "could not save view");
                }
            }
            Effect::PersistKeyControl => {
                self.persist_flag(SessionFlag::KeyControl, self.modes.key_control);
            }
            Effect::PersistFollow => {
                self.persist_flag(SessionFlag::FollowActive, self.modes.follow_active);
            }
            Effect::ClearSession => {
                if let Err(e) = self.session.clear() {
                    warn!(deck = %self.id, error = %e, "could not clear session preferences");
                }
            }
            Effect::ScrollToActive => {
                if let Some(slide) = self.nav.active() {
                    self.surface
                        .render(SurfaceUpdate::ScrollIntoView(self.id.slide_id(slide)));
                }
            }
            Effect::FullScreen(on) => self.surface.render(SurfaceUpdate::FullScreen(on)),
            Effect::ShowBlank(color) => self.surface.render(SurfaceUpdate::ShowBlank(color)),
            Effect::HideBlank => self.surface.render(SurfaceUpdate::HideBlank),
            Effect::OpenPanel => self.surface.render(SurfaceUpdate::OpenPanel),
            Effect::ClosePanel => self.surface.render(SurfaceUpdate::ClosePanel),
            Effect::Reflect => self
                .surface
                .render(SurfaceUpdate::Controls(self.modes.clone())),
        }
    }

    fn persist_flag(&self, flag: SessionFlag, on: bool) {
        if let Err(e) = self.session.set_flag(flag, on) {
            warn!(deck = %self.id, ?flag, error = %e, "could not save session flag");
        }
    }

    /// Run a command. Returns whether the slide or any mode changed.
    pub fn invoke(&mut self, command: &Command) -> bool {
        let before = (self.nav.active(), self.modes.clone());
        match command {
            Command::GoTo(target) => {
                self.go_to(Some(*target));
            }
            Command::First => {
                self.first_slide();
            }
            Command::Last => {
                self.last_slide();
            }
            Command::Next => {
                self.next();
            }
            Command::Previous => {
                self.previous();
            }
            Command::GoToSaved => {
                self.go_to_saved();
            }
            Command::Blur => self.surface.render(SurfaceUpdate::Blur),
            other => {
                if let Some(event) = other.transition() {
                    self.apply(event);
                }
            }
        }
        before != (self.nav.active(), self.modes.clone())
    }

    /// Whether a control bound to `command` should look pressed.
    pub fn is_active(&self, command: &Command) -> bool {
        let modes = &self.modes;
        let joined = modes.key_control && modes.follow_active;
        match command {
            Command::GoTo(target) => self.nav.active().map(i64::from) == Some(*target),
            Command::First => self.nav.active() == Some(1),
            Command::Last => self.nav.active() == Some(self.nav.slide_count()),
            Command::Start | Command::Resume => {
                joined && &modes.view == self.views.presenting_view()
            }
            Command::Join => joined,
            Command::JoinWithNotes => {
                joined && Some(&modes.view) == self.views.notes_view()
            }
            Command::ToggleKeyControl => modes.key_control,
            Command::ToggleFollow => modes.follow_active,
            Command::ToggleFullScreen => modes.full_screen,
            Command::SetView(view) => modes.view == ViewMode::new(view),
            Command::Blank(color) => modes.blank == Some(*color),
            Command::TogglePanel => modes.panel_open,
            Command::Next
            | Command::Previous
            | Command::GoToSaved
            | Command::End
            | Command::Reset
            | Command::DismissBlank
            | Command::ClosePanel
            | Command::Blur => false,
        }
    }

    /// Route a key press and run whatever command it maps to.
    pub fn handle_key(&mut self, input: &KeyInput) -> Routing {
        let state = RouterState {
            panel_open: self.modes.panel_open,
            blank_showing: self.modes.blank.is_some(),
            key_control: self.modes.key_control,
        };
        let routing = route(&state, input, &self.router);
        // Escape on the open panel also drops focus from inside it
        if routing.tier == Some(Tier::Overlay) && routing.command == Some(Command::ClosePanel) {
            self.surface.render(SurfaceUpdate::Blur);
        }
        if let Some(command) = &routing.command {
            self.invoke(command);
        }
        routing
    }

    /// React to a durable value another viewer changed.
    pub fn on_storage_event(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.keys.slide || !self.follow.is_subscribed() {
            return false;
        }
        debug!(deck = %self.id, value = ?event.new_value, "following saved slide");
        self.go_to_saved()
    }

    /// Drop the follow subscription while detached.
    pub(crate) fn suspend(&mut self) {
        self.follow.disable();
    }

    pub(crate) fn resubscribe(&mut self) {
        if self.modes.follow_active {
            self.follow.enable();
        }
    }

    pub fn is_following(&self) -> bool {
        self.follow.is_subscribed()
    }
}

impl std::fmt::Debug for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("id", &self.id)
            .field("nav", &self.nav)
            .field("modes", &self.modes)
            .finish_non_exhaustive()
    }
}
