//! Keyboard input as the router sees it.
//!
//! Keys are named the way DOM `KeyboardEvent.key` names them, so a host can
//! forward events without translating them first.

pub mod keymap;
pub mod router;

use std::fmt;

pub use keymap::{Chord, Keymap};
pub use router::{EscapePolicy, RouterConfig, RouterState, Routing, Tier, route};

/// A key, independent of modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character. Letters are kept as typed.
    Char(char),
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Any other named key (`F5`, `Shift`, ...).
    Named(String),
}

impl Key {
    /// Parse a DOM key name: `ArrowRight`, `" "`, `n`, `PageDown`, ...
    ///
    /// Names are matched case-insensitively; a lone character is a [`Key::Char`].
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return if c == ' ' { Self::Space } else { Self::Char(c) };
        }

        match name.to_ascii_lowercase().as_str() {
            "space" | "spacebar" => Self::Space,
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "tab" => Self::Tab,
            "backspace" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "arrowup" | "up" => Self::ArrowUp,
            "arrowdown" | "down" => Self::ArrowDown,
            "arrowleft" | "left" => Self::ArrowLeft,
            "arrowright" | "right" => Self::ArrowRight,
            "period" | "dot" => Self::Char('.'),
            "comma" => Self::Char(','),
            "minus" | "dash" => Self::Char('-'),
            _ => Self::Named(name.to_string()),
        }
    }

    /// Same key, ignoring letter case.
    pub fn matches(&self, other: &Key) -> bool {
        match (self, other) {
            (Self::Char(a), Self::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
            (Self::Named(a), Self::Named(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }

    /// Space and Enter, which also activate whatever element has focus.
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Space | Self::Enter)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Space => f.write_str("Space"),
            Self::Enter => f.write_str("Enter"),
            Self::Escape => f.write_str("Escape"),
            Self::Tab => f.write_str("Tab"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Delete => f.write_str("Delete"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
            Self::ArrowUp => f.write_str("ArrowUp"),
            Self::ArrowDown => f.write_str("ArrowDown"),
            Self::ArrowLeft => f.write_str("ArrowLeft"),
            Self::ArrowRight => f.write_str("ArrowRight"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Cmd on macOS, the Windows key elsewhere.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Ctrl or Cmd, whichever the platform uses for shortcuts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    pub fn with_shift(self) -> Self {
        Self {
            shift: true,
            ..self
        }
    }
}

/// What kind of element had focus when a key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// The deck's routing root; nothing more specific has focus.
    #[default]
    Root,
    /// Text inputs, text areas, content-editable regions.
    TextEditing,
    /// Select boxes and other selection controls.
    Selection,
    /// An iframe, object or other embedded document.
    EmbeddedDocument,
    /// An element that scrolls natively and wants arrow keys for itself.
    Scrollable,
    /// Any other focusable element (buttons, links, ...).
    Element,
}

/// A key press delivered to a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    pub target: FocusTarget,
}

impl KeyInput {
    /// A bare key press on the routing root.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            target: FocusTarget::Root,
        }
    }

    pub fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn on(mut self, target: FocusTarget) -> Self {
        self.target = target;
        self
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}
