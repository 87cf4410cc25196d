//! Property tests for the navigation and routing invariants.

use proptest::prelude::*;

use super::*;
use crate::command::Command;
use crate::input::{FocusTarget, Modifiers};
use crate::modes::{Blank, Modes, Transition, ViewSet, transition};

fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::ArrowRight),
        Just(Key::ArrowLeft),
        Just(Key::ArrowUp),
        Just(Key::ArrowDown),
        Just(Key::PageUp),
        Just(Key::PageDown),
        Just(Key::Home),
        Just(Key::End),
        Just(Key::Space),
        Just(Key::Enter),
        Just(Key::Escape),
        Just(Key::Delete),
        proptest::char::range('a', 'z').prop_map(Key::Char),
        proptest::char::range('A', 'Z').prop_map(Key::Char),
        prop_oneof![Just('.'), Just(','), Just('-')].prop_map(Key::Char),
    ]
}

fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(ctrl, shift, alt, meta)| Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        },
    )
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (-3i64..12).prop_map(Command::GoTo),
        Just(Command::First),
        Just(Command::Last),
        Just(Command::Next),
        Just(Command::Previous),
        Just(Command::GoToSaved),
        Just(Command::Start),
        Just(Command::Resume),
        Just(Command::Join),
        Just(Command::JoinWithNotes),
        Just(Command::End),
        Just(Command::Reset),
        Just(Command::ToggleKeyControl),
        Just(Command::ToggleFollow),
        Just(Command::Blank(Blank::Black)),
        Just(Command::DismissBlank),
        Just(Command::TogglePanel),
        Just(Command::SetView("speaker".to_string())),
    ]
}

fn transition_strategy() -> impl Strategy<Value = Transition> {
    command_strategy().prop_filter_map("mode transitions only", |c| c.transition())
}

proptest! {
    #[test]
    fn go_to_in_range_updates_every_channel(count in 1u32..40, pick in any::<prop::sample::Index>()) {
        let n = pick.index(count as usize) as u32 + 1;
        let mut fx = Fixture::new(count);
        prop_assert!(fx.deck_mut().go_to(Some(i64::from(n))));
        prop_assert_eq!(fx.active(), Some(n));
        prop_assert_eq!(fx.saved(), Some(n.to_string()));
        prop_assert_eq!(fx.deck().locator().decode(), Some(i64::from(n)));
    }

    #[test]
    fn go_to_out_of_range_changes_nothing(count in 0u32..40, start in 1u32..40, target in any::<i64>()) {
        prop_assume!(target < 1 || target > i64::from(count));
        let mut fx = Fixture::new(count);
        fx.deck_mut().go_to(Some(i64::from(start)));
        let before = (fx.active(), fx.saved(), fx.page.location().fragment());

        prop_assert!(!fx.deck_mut().go_to(Some(target)));
        prop_assert_eq!((fx.active(), fx.saved(), fx.page.location().fragment()), before);
    }

    #[test]
    fn non_numeric_input_changes_nothing(text in "[a-zA-Z ]*") {
        let mut fx = Fixture::new(5);
        fx.deck_mut().go_to(Some(2));
        prop_assert!(!fx.deck_mut().go_to_input(&text));
        prop_assert_eq!(fx.active(), Some(2));
    }

    #[test]
    fn move_forward_is_bounded(count in 1u32..30, k in 1u32..30) {
        prop_assume!(k <= count);
        let mut fx = Fixture::new(count);
        fx.deck_mut().go_to(Some(i64::from(k)));
        let moved = fx.deck_mut().move_by(1);
        if k < count {
            prop_assert!(moved);
            prop_assert_eq!(fx.active(), Some(k + 1));
        } else {
            prop_assert!(!moved);
            prop_assert_eq!(fx.active(), Some(count));
        }
    }

    #[test]
    fn channels_agree_after_any_commands(commands in prop::collection::vec(command_strategy(), 0..40)) {
        let mut fx = Fixture::new(7);
        for command in &commands {
            fx.page.invoke(&fx.id, command);
            let active = fx.active();
            prop_assert!(active.is_none_or(|n| (1..=7).contains(&n)));
            prop_assert_eq!(fx.deck().locator().decode(), active.map(i64::from));
            prop_assert_eq!(fx.saved(), active.map(|n| n.to_string()));
        }
    }

    #[test]
    fn keys_never_navigate_without_key_control(
        keys in prop::collection::vec((key_strategy(), modifiers_strategy()), 0..40)
    ) {
        let mut fx = Fixture::new(6);
        fx.deck_mut().go_to(Some(3));
        for (key, modifiers) in keys {
            // Global chords switch key control on; only plain keys are under test
            if modifiers.command() || modifiers.alt {
                continue;
            }
            fx.press_input(KeyInput::new(key).with(modifiers));
            prop_assert!(!fx.deck().modes().key_control);
            prop_assert_eq!(fx.active(), Some(3));
        }
    }

    #[test]
    fn keys_never_navigate_from_text_fields(
        keys in prop::collection::vec((key_strategy(), modifiers_strategy()), 0..40)
    ) {
        let mut fx = Fixture::new(6);
        fx.page.invoke(&fx.id, &Command::Join);
        fx.deck_mut().go_to(Some(3));
        for (key, modifiers) in keys {
            if modifiers.command() || modifiers.alt {
                continue;
            }
            fx.press_input(KeyInput::new(key).with(modifiers).on(FocusTarget::TextEditing));
            prop_assert_eq!(fx.active(), Some(3));
        }
    }

    #[test]
    fn open_panel_freezes_position(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let mut fx = Fixture::new(6);
        fx.page.invoke(&fx.id, &Command::Start);
        fx.page.invoke(&fx.id, &Command::TogglePanel);
        for key in keys {
            if key == Key::Escape {
                continue;
            }
            fx.press_input(KeyInput::new(key));
            prop_assert!(fx.deck().modes().panel_open);
            prop_assert_eq!(fx.active(), Some(1));
        }
    }

    #[test]
    fn end_always_lands_idle(steps in prop::collection::vec(transition_strategy(), 0..20)) {
        let views = ViewSet::default();
        let mut modes = Modes::initial(&views);
        for step in &steps {
            modes = transition(&modes, step, &views).0;
        }
        let (ended, effects) = transition(&modes, &Transition::End, &views);
        let idle = Modes {
            panel_open: modes.panel_open,
            ..Modes::initial(&views)
        };
        prop_assert_eq!(ended, idle);
        prop_assert_eq!(effects.last(), Some(&crate::modes::Effect::Reflect));
    }
}
