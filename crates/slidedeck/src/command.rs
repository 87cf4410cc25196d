//! The public operations of a deck, as controls and the keyboard name them.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::modes::{Blank, Transition, clean_name};
use crate::nav::parse_slide;

/// One operation a button, a key or a host can ask a deck for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GoTo(i64),
    First,
    Last,
    Next,
    Previous,
    GoToSaved,
    Start,
    Resume,
    Join,
    JoinWithNotes,
    End,
    Reset,
    ToggleKeyControl,
    ToggleFollow,
    ToggleFullScreen,
    SetView(String),
    Blank(Blank),
    DismissBlank,
    TogglePanel,
    ClosePanel,
    /// Drop focus from whatever element holds it.
    Blur,
}

impl Command {
    /// The mode transition behind this command, if it is one.
    pub fn transition(&self) -> Option<Transition> {
        let transition = match self {
            Self::Start => Transition::Start,
            Self::Resume => Transition::Resume,
            Self::Join => Transition::Join,
            Self::JoinWithNotes => Transition::JoinWithNotes,
            Self::End => Transition::End,
            Self::Reset => Transition::Reset,
            Self::ToggleKeyControl => Transition::ToggleKeyControl,
            Self::ToggleFollow => Transition::ToggleFollow,
            Self::ToggleFullScreen => Transition::ToggleFullScreen,
            Self::SetView(view) => Transition::SetView(view.clone()),
            Self::Blank(color) => Transition::ToggleBlank(*color),
            Self::DismissBlank => Transition::DismissBlank,
            Self::TogglePanel => Transition::TogglePanel,
            Self::ClosePanel => Transition::ClosePanel,
            Self::GoTo(_)
            | Self::First
            | Self::Last
            | Self::Next
            | Self::Previous
            | Self::GoToSaved
            | Self::Blur => return None,
        };
        Some(transition)
    }
}

impl FromStr for Command {
    type Err = Error;

    /// Parse a control's value, e.g. `start`, `Join as speaker`, `to-slide:3`
    /// or `view:grid`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        if let Some(target) = lowered.strip_prefix("to-slide:") {
            return parse_slide(target.trim())
                .map(Self::GoTo)
                .ok_or_else(|| Error::UnknownCommand(value.to_string()));
        }
        if let Some(view) = lowered.strip_prefix("view:") {
            return Ok(Self::SetView(clean_name(view)));
        }

        let name = clean_name(value);

        let command = match name.as_str() {
            "start" | "start-presentation" => Self::Start,
            "resume" => Self::Resume,
            "join" => Self::Join,
            "join-as-speaker" | "join-with-notes" => Self::JoinWithNotes,
            "end" | "end-presentation" => Self::End,
            "reset" => Self::Reset,
            "key-control" | "toggle-control" => Self::ToggleKeyControl,
            "follow-active" | "toggle-follow" => Self::ToggleFollow,
            "full-screen" | "toggle-fullscreen" => Self::ToggleFullScreen,
            "blank-slide" | "black-out" => Self::Blank(Blank::Black),
            "white-out" => Self::Blank(Blank::White),
            "control-panel" => Self::TogglePanel,
            "close-panel" => Self::ClosePanel,
            "next" => Self::Next,
            "previous" | "prev" => Self::Previous,
            "first" => Self::First,
            "last" => Self::Last,
            "to-saved" => Self::GoToSaved,
            _ => return Err(Error::UnknownCommand(value.to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoTo(slide) => write!(f, "to-slide:{slide}"),
            Self::SetView(view) => write!(f, "view:{view}"),
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
            Self::Next => f.write_str("next"),
            Self::Previous => f.write_str("previous"),
            Self::GoToSaved => f.write_str("to-saved"),
            Self::Start => f.write_str("start"),
            Self::Resume => f.write_str("resume"),
            Self::Join => f.write_str("join"),
            Self::JoinWithNotes => f.write_str("join-with-notes"),
            Self::End => f.write_str("end"),
            Self::Reset => f.write_str("reset"),
            Self::ToggleKeyControl => f.write_str("key-control"),
            Self::ToggleFollow => f.write_str("follow-active"),
            Self::ToggleFullScreen => f.write_str("full-screen"),
            Self::Blank(Blank::Black) => f.write_str("black-out"),
            Self::Blank(Blank::White) => f.write_str("white-out"),
            Self::DismissBlank => f.write_str("dismiss-blank"),
            Self::TogglePanel => f.write_str("control-panel"),
            Self::ClosePanel => f.write_str("close-panel"),
            Self::Blur => f.write_str("blur"),
        }
    }
}
