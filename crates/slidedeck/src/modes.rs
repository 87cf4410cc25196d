//! View and mode flags, and the transition table that changes them.
//!
//! Every mode change goes through [`transition`], a pure function from the
//! current [`Modes`] and a [`Transition`] to the next `Modes` plus the list of
//! [`Effect`]s the deck has to carry out, in order. Nothing reacts to flag
//! changes implicitly.

use std::fmt;

/// A view identifier out of a deck's [`ViewSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewMode(String);

impl ViewMode {
    pub fn new(name: &str) -> Self {
        Self(clean_name(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a user-facing name: trimmed, lower-case, spaces as dashes.
pub fn clean_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// The views a deck knows, and which of them play which role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSet {
    default: ViewMode,
    presenting: ViewMode,
    notes: Option<ViewMode>,
    extra: Vec<ViewMode>,
}

impl Default for ViewSet {
    fn default() -> Self {
        Self::new("grid", "presentation", Some("speaker"))
    }
}

impl ViewSet {
    pub fn new(default: &str, presenting: &str, notes: Option<&str>) -> Self {
        Self {
            default: ViewMode::new(default),
            presenting: ViewMode::new(presenting),
            notes: notes.map(ViewMode::new),
            extra: Vec::new(),
        }
    }

    /// Add a view with no special role.
    pub fn with_view(mut self, name: &str) -> Self {
        let view = ViewMode::new(name);
        if self.find(view.as_str()).is_none() {
            self.extra.push(view);
        }
        self
    }

    pub fn default_view(&self) -> &ViewMode {
        &self.default
    }

    pub fn presenting_view(&self) -> &ViewMode {
        &self.presenting
    }

    pub fn notes_view(&self) -> Option<&ViewMode> {
        self.notes.as_ref()
    }

    pub fn all(&self) -> Vec<&ViewMode> {
        let mut views = vec![&self.default];
        for view in std::iter::once(&self.presenting)
            .chain(self.notes.iter())
            .chain(self.extra.iter())
        {
            if !views.contains(&view) {
                views.push(view);
            }
        }
        views
    }

    pub fn find(&self, name: &str) -> Option<ViewMode> {
        let wanted = clean_name(name);
        self.all()
            .into_iter()
            .find(|view| view.as_str() == wanted)
            .cloned()
    }
}

/// Color of the blank cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blank {
    Black,
    White,
}

impl Blank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

/// Everything about a deck that is not the slide position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modes {
    pub view: ViewMode,
    pub key_control: bool,
    pub follow_active: bool,
    pub full_screen: bool,
    pub blank: Option<Blank>,
    pub panel_open: bool,
}

impl Modes {
    /// A deck before any preference is applied.
    pub fn initial(views: &ViewSet) -> Self {
        Self {
            view: views.default_view().clone(),
            key_control: false,
            follow_active: false,
            full_screen: false,
            blank: None,
            panel_open: false,
        }
    }

    fn join(&mut self) {
        self.key_control = true;
        self.follow_active = true;
    }

    fn present(&mut self, views: &ViewSet) {
        self.view = views.presenting_view().clone();
        self.join();
    }

    fn end(&mut self, views: &ViewSet) {
        self.view = views.default_view().clone();
        self.key_control = false;
        self.follow_active = false;
        self.full_screen = false;
        self.blank = None;
    }
}

/// A request to change modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Go to the first slide and start presenting.
    Start,
    /// Go to the saved slide and start presenting.
    Resume,
    /// Key control and follow mode, position and view untouched.
    Join,
    /// Join, in the notes view.
    JoinWithNotes,
    /// Leave presenting and forget the position.
    End,
    /// End, and also forget the session preferences.
    Reset,
    ToggleKeyControl,
    ToggleFollow,
    ToggleFullScreen,
    SetView(String),
    /// Show the cover in this color, or hide it if any cover is showing.
    ToggleBlank(Blank),
    DismissBlank,
    TogglePanel,
    ClosePanel,
}

/// Work the deck has to do after a transition, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    GoToFirst,
    GoToSaved,
    ResetActive,
    Subscribe,
    Unsubscribe,
    PersistView,
    PersistKeyControl,
    PersistFollow,
    ClearSession,
    ScrollToActive,
    FullScreen(bool),
    ShowBlank(Blank),
    HideBlank,
    OpenPanel,
    ClosePanel,
    /// Controls should re-read their pressed state.
    Reflect,
}

/// Apply `event` to `modes`.
///
/// The composite transitions always write every flag they own, so the
/// result never depends on which flags happened to be set before.
pub fn transition(modes: &Modes, event: &Transition, views: &ViewSet) -> (Modes, Vec<Effect>) {
    let mut next = modes.clone();
    let mut effects = Vec::new();

    match event {
        Transition::Start => {
            effects.push(Effect::GoToFirst);
            next.present(views);
        }
        Transition::Resume => {
            effects.push(Effect::GoToSaved);
            next.present(views);
        }
        Transition::Join => next.join(),
        Transition::JoinWithNotes => {
            next.join();
            if let Some(notes) = views.notes_view() {
                next.view = notes.clone();
            }
        }
        Transition::End | Transition::Reset => next.end(views),
        Transition::ToggleKeyControl => next.key_control = !next.key_control,
        Transition::ToggleFollow => next.follow_active = !next.follow_active,
        Transition::ToggleFullScreen => next.full_screen = !next.full_screen,
        Transition::SetView(name) => {
            if let Some(view) = views.find(name) {
                next.view = view;
            }
        }
        Transition::ToggleBlank(color) => {
            next.blank = match next.blank {
                Some(_) => None,
                None => Some(*color),
            };
        }
        Transition::DismissBlank => next.blank = None,
        Transition::TogglePanel => next.panel_open = !next.panel_open,
        Transition::ClosePanel => next.panel_open = false,
    }

    effects.extend(effects_between(modes, &next));

    match event {
        Transition::End => effects.push(Effect::ResetActive),
        Transition::Reset => {
            effects.retain(|effect| {
                !matches!(
                    effect,
                    Effect::PersistView | Effect::PersistKeyControl | Effect::PersistFollow
                )
            });
            effects.push(Effect::ResetActive);
            effects.push(Effect::ClearSession);
        }
        _ => {}
    }
    effects.push(Effect::Reflect);

    (next, dedupe_saved(effects))
}

/// Effects implied by the difference between two mode sets.
pub fn effects_between(old: &Modes, new: &Modes) -> Vec<Effect> {
    let mut effects = Vec::new();

    if old.key_control != new.key_control {
        effects.push(Effect::PersistKeyControl);
        if new.key_control {
            effects.push(Effect::GoToSaved);
        }
    }

    if old.follow_active != new.follow_active {
        effects.push(Effect::PersistFollow);
        if new.follow_active {
            effects.push(Effect::Subscribe);
            if !effects.contains(&Effect::GoToSaved) {
                effects.push(Effect::GoToSaved);
            }
        } else {
            effects.push(Effect::Unsubscribe);
        }
    }

    if old.view != new.view {
        effects.push(Effect::PersistView);
        effects.push(Effect::ScrollToActive);
    }

    if old.full_screen != new.full_screen {
        effects.push(Effect::FullScreen(new.full_screen));
    }

    if old.blank != new.blank {
        effects.push(match new.blank {
            Some(color) => Effect::ShowBlank(color),
            None => Effect::HideBlank,
        });
    }

    if old.panel_open != new.panel_open {
        effects.push(if new.panel_open {
            Effect::OpenPanel
        } else {
            Effect::ClosePanel
        });
    }

    effects
}

fn dedupe_saved(effects: Vec<Effect>) -> Vec<Effect> {
    let mut seen_saved = false;
    effects
        .into_iter()
        .filter(|effect| {
            if *effect != Effect::GoToSaved {
                return true;
            }
            !std::mem::replace(&mut seen_saved, true)
        })
        .collect()
}
