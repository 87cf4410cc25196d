//! Keyboard arbitration.
//!
//! A key press is offered to a fixed sequence of tiers. The first tier that
//! claims it decides the outcome and no later tier sees it:
//!
//! 1. [`Tier::Overlay`]: the control panel is open. Only its chord or Escape
//!    do anything; every other key is left to the page.
//! 2. [`Tier::Blank`]: a blank cover is showing. Any key that is not a
//!    Ctrl/Cmd chord dismisses it and is swallowed.
//! 3. [`Tier::Global`]: quick commands that work with or without key control.
//! 4. [`Tier::Escape`]: Escape blurs a focused element, or applies the
//!    configured [`EscapePolicy`] on the routing root.
//! 5. [`Tier::Navigation`]: the slide key table, only with key control on
//!    and only when the privacy filter lets the event through.

use tracing::trace;

use super::{FocusTarget, Key, KeyInput, Keymap};
use crate::command::Command;
use crate::modes::Blank;

/// What Escape on the routing root does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapePolicy {
    /// Nothing.
    #[default]
    Inert,
    /// End the presentation, while key control is on.
    EndPresentation,
}

/// Per-deck routing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
    pub keymap: Keymap,
    pub escape: EscapePolicy,
    /// Whether `-` ends the presentation.
    pub dash_ends: bool,
}

/// The slice of deck state the router needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterState {
    pub panel_open: bool,
    pub blank_showing: bool,
    pub key_control: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Overlay,
    Blank,
    Global,
    Escape,
    Navigation,
}

/// Outcome of routing one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    /// What the deck should run, if anything.
    pub command: Option<Command>,
    /// Whether the host should suppress the key's default action.
    pub prevent_default: bool,
    /// The tier that claimed the key; `None` when it fell through every tier.
    pub tier: Option<Tier>,
}

impl Routing {
    fn consume(tier: Tier, command: Command) -> Self {
        Self {
            command: Some(command),
            prevent_default: true,
            tier: Some(tier),
        }
    }

    fn stop(tier: Tier) -> Self {
        Self {
            command: None,
            prevent_default: false,
            tier: Some(tier),
        }
    }

    /// Nobody wanted the key.
    pub fn fall_through() -> Self {
        Self {
            command: None,
            prevent_default: false,
            tier: None,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.prevent_default
    }
}

pub fn route(state: &RouterState, input: &KeyInput, config: &RouterConfig) -> Routing {
    let routing = route_tiers(state, input, config);
    trace!(
        key = %input.key,
        tier = ?routing.tier,
        command = ?routing.command,
        "key routed"
    );
    routing
}

fn route_tiers(state: &RouterState, input: &KeyInput, config: &RouterConfig) -> Routing {
    let keymap = &config.keymap;
    let mods = input.modifiers;

    if state.panel_open {
        if keymap.panel.matches(input) {
            return Routing::consume(Tier::Overlay, Command::TogglePanel);
        }
        if input.key == Key::Escape {
            return Routing::consume(Tier::Overlay, Command::ClosePanel);
        }
        return Routing::stop(Tier::Overlay);
    }

    if state.blank_showing && !mods.command() {
        return Routing::consume(Tier::Blank, Command::DismissBlank);
    }

    if let Some(command) = global_command(input, keymap) {
        return Routing::consume(Tier::Global, command);
    }
    // A bare Enter belongs to whatever element has focus
    if input.key == Key::Enter {
        return Routing::stop(Tier::Global);
    }

    if input.key == Key::Escape && !mods.command() {
        if input.target != FocusTarget::Root {
            return Routing::consume(Tier::Escape, Command::Blur);
        }
        if config.escape == EscapePolicy::EndPresentation && state.key_control {
            return Routing::consume(Tier::Escape, Command::End);
        }
        return Routing::stop(Tier::Escape);
    }

    if !state.key_control || !privacy_allows(input) {
        return Routing::fall_through();
    }
    match navigation_command(input, config.dash_ends) {
        Some(command) => Routing::consume(Tier::Navigation, command),
        None => Routing::fall_through(),
    }
}

fn global_command(input: &KeyInput, keymap: &Keymap) -> Option<Command> {
    let bindings = [
        (&keymap.panel, Command::TogglePanel),
        (&keymap.start, Command::Start),
        (&keymap.resume, Command::Resume),
        (&keymap.join_notes, Command::JoinWithNotes),
        (&keymap.full_screen, Command::ToggleFullScreen),
        (&keymap.end, Command::End),
    ];
    bindings
        .into_iter()
        .find(|(chord, _)| chord.matches(input))
        .map(|(_, command)| command)
}

/// Whether a key press may drive slide navigation.
///
/// Keys aimed at text fields, selection controls, embedded documents and
/// natively scrolling elements stay with the page, as do Space and Enter on
/// anything but the routing root.
pub fn privacy_allows(input: &KeyInput) -> bool {
    match input.target {
        FocusTarget::Root => true,
        FocusTarget::TextEditing
        | FocusTarget::Selection
        | FocusTarget::EmbeddedDocument
        | FocusTarget::Scrollable => false,
        FocusTarget::Element => !input.key.is_activation(),
    }
}

/// The slide key table. Shift is tolerated; any other modifier disables it.
pub fn navigation_command(input: &KeyInput, dash_ends: bool) -> Option<Command> {
    let mods = input.modifiers;
    if mods.command() || mods.alt {
        return None;
    }

    let command = match &input.key {
        Key::Home => Command::First,
        Key::End => Command::Last,
        Key::ArrowRight | Key::ArrowDown | Key::PageDown | Key::Space => Command::Next,
        Key::ArrowLeft | Key::ArrowUp | Key::PageUp | Key::Delete => Command::Previous,
        Key::Char(c) => match c.to_ascii_lowercase() {
            'n' => Command::Next,
            'p' => Command::Previous,
            'b' | '.' => Command::Blank(Blank::Black),
            'w' | ',' => Command::Blank(Blank::White),
            '-' if dash_ends => Command::End,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn controlling() -> RouterState {
        RouterState {
            key_control: true,
            ..RouterState::default()
        }
    }

    fn key(name: &str) -> KeyInput {
        KeyInput::new(Key::from_name(name))
    }

    #[test]
    fn test_navigation_table() {
        let config = RouterConfig::default();
        let state = controlling();
        let cases = [
            ("Home", Command::First),
            ("End", Command::Last),
            ("ArrowRight", Command::Next),
            ("ArrowDown", Command::Next),
            ("PageDown", Command::Next),
            ("N", Command::Next),
            ("n", Command::Next),
            (" ", Command::Next),
            ("ArrowLeft", Command::Previous),
            ("ArrowUp", Command::Previous),
            ("PageUp", Command::Previous),
            ("P", Command::Previous),
            ("Delete", Command::Previous),
            ("B", Command::Blank(Blank::Black)),
            (".", Command::Blank(Blank::Black)),
            ("W", Command::Blank(Blank::White)),
            (",", Command::Blank(Blank::White)),
        ];
        for (name, expected) in cases {
            let routing = route(&state, &key(name), &config);
            assert_eq!(routing.command, Some(expected), "key {name:?}");
            assert_eq!(routing.tier, Some(Tier::Navigation));
            assert!(routing.prevent_default);
        }
    }

    #[test]
    fn test_unmapped_keys_fall_through() {
        let routing = route(&controlling(), &key("x"), &RouterConfig::default());
        assert_eq!(routing, Routing::fall_through());
        let routing = route(&controlling(), &key("-"), &RouterConfig::default());
        assert_eq!(routing.command, None);
    }

    #[test]
    fn test_dash_ends_when_enabled() {
        let config = RouterConfig {
            dash_ends: true,
            ..RouterConfig::default()
        };
        let routing = route(&controlling(), &key("-"), &config);
        assert_eq!(routing.command, Some(Command::End));
    }

    #[test]
    fn test_navigation_needs_key_control() {
        let routing = route(&RouterState::default(), &key("ArrowRight"), &RouterConfig::default());
        assert_eq!(routing.command, None);
        assert!(!routing.prevent_default);
    }

    #[test]
    fn test_modified_keys_do_not_navigate() {
        let input = key("ArrowRight").with(Modifiers::ALT);
        assert_eq!(route(&controlling(), &input, &RouterConfig::default()).command, None);
        let input = key("N").with(Modifiers::SHIFT);
        assert_eq!(
            route(&controlling(), &input, &RouterConfig::default()).command,
            Some(Command::Next)
        );
    }

    #[test]
    fn test_panel_open_only_closes() {
        let state = RouterState {
            panel_open: true,
            ..controlling()
        };
        let config = RouterConfig::default();

        let routing = route(&state, &key("ArrowRight"), &config);
        assert_eq!(routing, Routing::stop(Tier::Overlay));

        let routing = route(&state, &key("Escape"), &config);
        assert_eq!(routing.command, Some(Command::ClosePanel));

        let chord = key("k").with(Modifiers::CTRL);
        assert_eq!(route(&state, &chord, &config).command, Some(Command::TogglePanel));

        // Global chords are unreachable behind the panel
        let resume = key("Enter").with(Modifiers::CTRL);
        assert_eq!(route(&state, &resume, &config).command, None);
    }

    #[test]
    fn test_blank_swallows_plain_keys() {
        let state = RouterState {
            blank_showing: true,
            ..controlling()
        };
        let config = RouterConfig::default();
        for name in ["ArrowRight", "x", "B", "Escape"] {
            let routing = route(&state, &key(name), &config);
            assert_eq!(routing.command, Some(Command::DismissBlank), "key {name:?}");
            assert!(routing.prevent_default);
        }

        let chord = key("k").with(Modifiers::META);
        assert_eq!(route(&state, &chord, &config).command, Some(Command::TogglePanel));
    }

    #[test]
    fn test_global_commands_without_key_control() {
        let state = RouterState::default();
        let config = RouterConfig::default();
        let cases = [
            (key("k").with(Modifiers::CTRL), Command::TogglePanel),
            (key("Enter").with(Modifiers::CTRL), Command::Resume),
            (key("Enter").with(Modifiers::META.with_shift()), Command::Start),
            (key("Enter").with(Modifiers::ALT), Command::JoinWithNotes),
            (key("F").with(Modifiers::CTRL.with_shift()), Command::ToggleFullScreen),
            (key("E").with(Modifiers::CTRL.with_shift()), Command::End),
        ];
        for (input, expected) in cases {
            let routing = route(&state, &input, &config);
            assert_eq!(routing.command, Some(expected));
            assert_eq!(routing.tier, Some(Tier::Global));
        }
    }

    #[test]
    fn test_plain_enter_never_navigates() {
        let routing = route(&controlling(), &key("Enter"), &RouterConfig::default());
        assert_eq!(routing, Routing::stop(Tier::Global));
    }

    #[test]
    fn test_escape_blurs_focused_elements() {
        let input = key("Escape").on(FocusTarget::TextEditing);
        let routing = route(&RouterState::default(), &input, &RouterConfig::default());
        assert_eq!(routing.command, Some(Command::Blur));
    }

    #[test]
    fn test_escape_on_root_follows_policy() {
        let inert = RouterConfig::default();
        let routing = route(&controlling(), &key("Escape"), &inert);
        assert_eq!(routing.command, None);

        let ending = RouterConfig {
            escape: EscapePolicy::EndPresentation,
            ..RouterConfig::default()
        };
        let routing = route(&controlling(), &key("Escape"), &ending);
        assert_eq!(routing.command, Some(Command::End));

        let routing = route(&RouterState::default(), &key("Escape"), &ending);
        assert_eq!(routing.command, None);
    }

    #[test]
    fn test_privacy_filter() {
        let config = RouterConfig::default();
        let state = controlling();
        for target in [
            FocusTarget::TextEditing,
            FocusTarget::Selection,
            FocusTarget::EmbeddedDocument,
            FocusTarget::Scrollable,
        ] {
            for name in ["ArrowRight", " ", "N"] {
                let routing = route(&state, &key(name).on(target), &config);
                assert_eq!(routing.command, None, "{name:?} on {target:?}");
            }
        }

        let on_button = |name| route(&state, &key(name).on(FocusTarget::Element), &config);
        assert_eq!(on_button(" ").command, None);
        assert_eq!(on_button("ArrowRight").command, Some(Command::Next));
    }
}
