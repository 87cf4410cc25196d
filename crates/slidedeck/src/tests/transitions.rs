use super::*;
use crate::command::Command;
use crate::modes::{Blank, ViewSet};
use crate::storage::{MemoryArea, shared};
use crate::surface::{NullSurface, SurfaceUpdate};

#[test]
fn test_start_then_walk_the_deck() {
    let mut fx = Fixture::new(5);
    fx.page.invoke(&fx.id, &Command::Start);

    let modes = fx.deck().modes().clone();
    assert_eq!(fx.active(), Some(1));
    assert!(modes.key_control);
    assert!(modes.follow_active);
    assert_eq!(modes.view.as_str(), "presentation");

    assert!(!fx.deck_mut().move_by(-1));
    assert_eq!(fx.active(), Some(1));
    for _ in 0..4 {
        assert!(fx.deck_mut().move_by(1));
    }
    assert_eq!(fx.active(), Some(5));
    assert!(!fx.deck_mut().move_by(1));
    assert_eq!(fx.active(), Some(5));
}

#[test]
fn test_start_ignores_saved_position() {
    let mut fx = Fixture::new(5);
    fx.page.durable().set("talk.slide", "4").unwrap();
    fx.page.invoke(&fx.id, &Command::Start);
    assert_eq!(fx.active(), Some(1));
    assert_eq!(fx.saved().as_deref(), Some("1"));
}

#[test]
fn test_resume_picks_up_saved_position() {
    let mut fx = Fixture::new(5);
    fx.page.durable().set("talk.slide", "4").unwrap();
    fx.page.invoke(&fx.id, &Command::Resume);
    assert_eq!(fx.active(), Some(4));
    assert_eq!(fx.deck().modes().view.as_str(), "presentation");
}

#[test]
fn test_join_keeps_view_and_position() {
    let mut fx = Fixture::new(5);
    fx.page.durable().set("talk.slide", "2").unwrap();
    fx.page.invoke(&fx.id, &Command::Join);
    assert_eq!(fx.active(), Some(2));
    assert_eq!(fx.deck().modes().view.as_str(), "grid");
    assert!(fx.deck().is_active(&Command::Join));
    assert!(!fx.deck().is_active(&Command::Start));

    fx.page.invoke(&fx.id, &Command::JoinWithNotes);
    assert_eq!(fx.deck().modes().view.as_str(), "speaker");
    assert!(fx.deck().is_active(&Command::JoinWithNotes));
}

#[test]
fn test_end_restores_idle_state() {
    let mut fx = Fixture::new(5);
    fx.page.invoke(&fx.id, &Command::Start);
    fx.page.invoke(&fx.id, &Command::ToggleFullScreen);
    fx.page.invoke(&fx.id, &Command::Blank(Blank::White));
    fx.page.invoke(&fx.id, &Command::Next);
    fx.surface.drain();

    fx.page.invoke(&fx.id, &Command::End);
    let modes = fx.deck().modes();
    assert!(!modes.key_control && !modes.follow_active && !modes.full_screen);
    assert_eq!(modes.blank, None);
    assert_eq!(modes.view.as_str(), "grid");
    assert_eq!(fx.active(), None);
    assert_eq!(fx.saved(), None);
    assert_eq!(fx.page.location().fragment(), "#talk");
    assert!(fx.page.follow_bus().is_empty());

    let updates = fx.surface.drain();
    assert!(updates.contains(&SurfaceUpdate::FullScreen(false)));
    assert!(updates.contains(&SurfaceUpdate::HideBlank));
    assert!(updates.contains(&SurfaceUpdate::ClearCurrent));
    assert!(matches!(updates.last(), Some(SurfaceUpdate::Controls(_))));
}

#[test]
fn test_session_preferences_survive_reload() {
    let hub = StorageHub::in_memory();
    let session = shared(MemoryArea::new());

    let mut first = Page::with_session(&hub, PAGE_PATH, "", session.clone());
    let id = first.attach(DeckOptions::new(5), NullSurface);
    first.invoke(&id, &Command::Start);
    first.invoke(&id, &Command::Next);
    first.invoke(&id, &Command::SetView("speaker".into()));
    drop(first);

    let mut reloaded = Page::with_session(&hub, PAGE_PATH, "", session);
    let id = reloaded.attach(DeckOptions::new(5).with_view("grid"), NullSurface);
    let deck = reloaded.deck(&id).unwrap();
    assert_eq!(deck.modes().view.as_str(), "speaker");
    assert!(deck.modes().key_control);
    assert!(deck.is_following());
    assert_eq!(deck.active_slide(), Some(2));
    assert!(!deck.modes().full_screen);
}

#[test]
fn test_new_session_uses_attributes() {
    let hub = StorageHub::in_memory();
    let mut page = Page::new(&hub, PAGE_PATH, "");
    let id = page.attach(
        DeckOptions::new(5).with_view("Speaker").with_key_control(true),
        NullSurface,
    );
    let deck = page.deck(&id).unwrap();
    assert_eq!(deck.modes().view.as_str(), "speaker");
    assert!(deck.modes().key_control);
    assert!(!deck.is_following());
    assert_eq!(deck.active_slide(), Some(1));
}

#[test]
fn test_reset_forgets_session_preferences() {
    let hub = StorageHub::in_memory();
    let session = shared(MemoryArea::new());

    let mut first = Page::with_session(&hub, PAGE_PATH, "", session.clone());
    let id = first.attach(DeckOptions::new(5), NullSurface);
    first.invoke(&id, &Command::Start);
    first.invoke(&id, &Command::Reset);
    assert_eq!(first.deck(&id).unwrap().active_slide(), None);
    drop(first);
    assert_eq!(session.borrow().get("talk.view").unwrap(), None);
    assert_eq!(session.borrow().get("talk.control").unwrap(), None);

    let mut reloaded = Page::with_session(&hub, PAGE_PATH, "", session);
    let id = reloaded.attach(DeckOptions::new(5).with_view("speaker"), NullSurface);
    let deck = reloaded.deck(&id).unwrap();
    assert_eq!(deck.modes().view.as_str(), "speaker");
    assert!(!deck.modes().key_control);
}

#[test]
fn test_end_remembers_idle_preferences() {
    let hub = StorageHub::in_memory();
    let session = shared(MemoryArea::new());
    let mut page = Page::with_session(&hub, PAGE_PATH, "", session.clone());
    let id = page.attach(DeckOptions::new(5), NullSurface);
    page.invoke(&id, &Command::Start);
    page.invoke(&id, &Command::End);
    assert_eq!(session.borrow().get("talk.view").unwrap().as_deref(), Some("grid"));
    assert_eq!(session.borrow().get("talk.follow").unwrap().as_deref(), Some("false"));
}

#[test]
fn test_deep_link_beats_restored_follow() {
    let hub = StorageHub::in_memory();
    hub.connect().set("talk.slide", "4").unwrap();
    let fx = Fixture::on_hub(hub, "#slide_talk-2", DeckOptions::new(5).with_follow(true));
    assert_eq!(fx.active(), Some(2));
    assert!(fx.deck().is_following());
}

#[test]
fn test_set_view_scrolls_active_slide_into_view() {
    let mut fx = Fixture::new(5);
    fx.deck_mut().go_to(Some(3));
    fx.surface.drain();

    assert!(fx.page.invoke(&fx.id, &Command::SetView("presentation".into())));
    assert!(fx
        .surface
        .updates()
        .contains(&SurfaceUpdate::ScrollIntoView("slide_talk-3".into())));
    assert!(fx.deck().is_active(&Command::SetView("Presentation".into())));

    assert!(!fx.page.invoke(&fx.id, &Command::SetView("unknown".into())));
    assert_eq!(fx.deck().modes().view.as_str(), "presentation");
}

#[test]
fn test_custom_view_set() {
    let views = ViewSet::new("document", "slideshow", None).with_view("outline");
    let mut fx = Fixture::with_options(DeckOptions::new(3).with_views(views));
    assert_eq!(fx.deck().modes().view.as_str(), "document");

    fx.page.invoke(&fx.id, &Command::JoinWithNotes);
    assert_eq!(fx.deck().modes().view.as_str(), "document");
    fx.page.invoke(&fx.id, &Command::SetView("outline".into()));
    assert_eq!(fx.deck().modes().view.as_str(), "outline");
    fx.page.invoke(&fx.id, &Command::Start);
    assert_eq!(fx.deck().modes().view.as_str(), "slideshow");
}

#[test]
fn test_is_active_reflects_toggles() {
    let mut fx = Fixture::new(4);
    let deck = fx.deck_mut();
    assert!(!deck.is_active(&Command::ToggleKeyControl));
    deck.invoke(&Command::ToggleKeyControl);
    assert!(deck.is_active(&Command::ToggleKeyControl));
    deck.invoke(&Command::Blank(Blank::Black));
    assert!(deck.is_active(&Command::Blank(Blank::Black)));
    assert!(!deck.is_active(&Command::Blank(Blank::White)));
    deck.invoke(&Command::Last);
    assert!(deck.is_active(&Command::Last));
    assert!(deck.is_active(&Command::GoTo(4)));
    assert!(!deck.is_active(&Command::First));
    deck.invoke(&Command::TogglePanel);
    assert!(deck.is_active(&Command::TogglePanel));
}

#[test]
fn test_parsed_button_values_drive_the_deck() {
    let mut fx = Fixture::new(5);
    for value in ["Start", "next", "to-slide:4", "view:speaker", "previous"] {
        let command: Command = value.parse().unwrap();
        fx.page.invoke(&fx.id, &command);
    }
    assert_eq!(fx.active(), Some(3));
    assert_eq!(fx.deck().modes().view.as_str(), "speaker");
}
