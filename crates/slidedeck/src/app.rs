//! Console presenter: one terminal is one viewer of a deck.
//!
//! Lines typed on stdin become commands or key presses. Changes other
//! terminals make to the shared store arrive through a file watcher.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tracing::{debug, warn};

use slidedeck::{
    Blank, Chord, Command, DeckId, DeckOptions, DeckRegistry, FileArea, FocusTarget, KeyInput,
    Modes, Modifiers, Page, StorageHub, Surface, SurfaceUpdate,
};

use crate::cli::PresentArgs;
use crate::config::Config;
use crate::outline::{self, Outline};

const WATCH_DEBOUNCE: Duration = Duration::from_millis(150);

enum Event {
    Line(String),
    StoreChanged,
    InputClosed,
}

/// What one line of input asks for.
#[derive(Debug, PartialEq)]
enum Action {
    Quit,
    Help,
    Status,
    GoTo(String),
    Key(KeyInput),
    Command(Command),
}

pub fn run(file: &Path, args: PresentArgs) -> Result<()> {
    let config = Config::load_or_default();
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let outline = outline::parse(&content)?;
    if outline.slide_count() == 0 {
        anyhow::bail!("{} has no slides", file.display());
    }

    let store_path = match args.store.clone() {
        Some(path) => path,
        None => config.store_path()?,
    };
    if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let area = FileArea::open(&store_path)
        .with_context(|| format!("Failed to open store {}", store_path.display()))?;
    let hub = StorageHub::new(area);

    let page_path = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string());
    let explicit = args.id.clone().or_else(|| outline.meta.id.clone());
    let fragment = match args.slide {
        Some(slide) => {
            let id = DeckRegistry::new().claim(explicit.as_deref(), &page_path);
            format!("#{}", id.slide_id(slide))
        }
        None => String::new(),
    };

    let mut page = Page::new(&hub, &page_path, &fragment);
    let mut options = DeckOptions::new(outline.slide_count())
        .with_views(config.views())
        .with_router(config.router()?)
        .with_follow(args.follow);
    if let Some(id) = &explicit {
        options = options.with_id(id);
    }
    if let Some(view) = args.view.as_deref().or(outline.meta.view.as_deref()) {
        options = options.with_view(view);
    }

    print_banner(&outline, file, &store_path);
    let id = page.attach(options, TerminalSurface::new(outline));

    let (tx, rx) = mpsc::channel();
    let _watcher = watch_store(&store_path, tx.clone())?;
    spawn_stdin_reader(tx);

    for event in rx {
        match event {
            Event::Line(line) => {
                if !handle_line(&mut page, &id, &line) {
                    break;
                }
            }
            Event::StoreChanged => match hub.refresh() {
                Ok(0) => {}
                Ok(changed) => {
                    debug!(changed, "store changed on disk");
                    page.pump_storage_events();
                }
                Err(e) => warn!(error = %e, "failed to reload store"),
            },
            Event::InputClosed => break,
        }
    }
    Ok(())
}

fn watch_store(store: &Path, tx: mpsc::Sender<Event>) -> Result<Debouncer<RecommendedWatcher>> {
    // The store is replaced by rename, so watch its directory
    let dir = match store.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from("."),
    };
    let mut debouncer = new_debouncer(WATCH_DEBOUNCE, move |result: DebounceEventResult| {
        if result.is_ok() {
            let _ = tx.send(Event::StoreChanged);
        }
    })
    .context("Failed to start file watcher")?;
    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    Ok(debouncer)
}

fn spawn_stdin_reader(tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::InputClosed);
    });
}

/// Run one line of input. Returns false when the presenter should stop.
fn handle_line(page: &mut Page, id: &DeckId, line: &str) -> bool {
    let action = match parse_line(line) {
        Ok(action) => action,
        Err(message) => {
            eprintln!("{}", message.yellow());
            return true;
        }
    };

    match action {
        Action::Quit => return false,
        Action::Help => print_help(),
        Action::Status => {
            if let Some(deck) = page.deck(id) {
                print_status(deck.active_slide(), deck.slide_count(), deck.modes());
            }
        }
        Action::GoTo(target) => {
            let moved = page.deck_mut(id).is_some_and(|deck| deck.go_to_input(&target));
            if !moved {
                eprintln!("{}", format!("No slide '{target}'").yellow());
            }
        }
        Action::Key(input) => {
            let routing = page.key_down(id.as_str(), &input);
            if !routing.is_consumed() {
                println!("{}", format!("{} does nothing here", input.key).dimmed());
            }
        }
        Action::Command(command) => {
            page.invoke(id, &command);
        }
    }
    true
}

/// Read a line: `quit`, `help`, `status`, `goto N`, `key CHORD [in TARGET]`
/// or any command name. An empty line presses the right arrow.
fn parse_line(line: &str) -> Result<Action, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Action::Key(KeyInput::new(slidedeck::Key::ArrowRight)));
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));
    match word.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Ok(Action::Quit),
        "?" | "help" => Ok(Action::Help),
        "status" => Ok(Action::Status),
        "goto" | "go" | "g" => {
            if rest.is_empty() {
                Err("Usage: goto N".to_string())
            } else {
                Ok(Action::GoTo(rest.to_string()))
            }
        }
        "key" | "k" => parse_key(rest).map(Action::Key),
        _ => line
            .parse::<Command>()
            .map(Action::Command)
            .map_err(|e| format!("{e} (type `help` for the list)")),
    }
}

fn parse_key(text: &str) -> Result<KeyInput, String> {
    let (chord, target) = match text.split_once(" in ") {
        Some((chord, target)) => (chord.trim(), Some(target.trim())),
        None => (text.trim(), None),
    };
    if chord.is_empty() {
        return Err("Usage: key CHORD [in text|select|embed|scroll|element]".to_string());
    }

    let chord: Chord = chord.parse().map_err(|e: slidedeck::Error| e.to_string())?;
    let modifiers = Modifiers {
        ctrl: chord.command,
        shift: chord.shift,
        alt: chord.alt,
        meta: false,
    };
    let target = match target {
        None => FocusTarget::Root,
        Some("text") => FocusTarget::TextEditing,
        Some("select") => FocusTarget::Selection,
        Some("embed") => FocusTarget::EmbeddedDocument,
        Some("scroll") => FocusTarget::Scrollable,
        Some("element") => FocusTarget::Element,
        Some(other) => return Err(format!("Unknown focus target: {other}")),
    };
    Ok(KeyInput::new(chord.key).with(modifiers).on(target))
}

fn print_banner(outline: &Outline, file: &Path, store: &Path) {
    let title = outline
        .meta
        .title
        .clone()
        .unwrap_or_else(|| file.display().to_string());
    println!("{}", title.bold());
    println!(
        "{}",
        format!(
            "{} slides, store {}. Type `help` for commands.",
            outline.slide_count(),
            store.display()
        )
        .dimmed()
    );
}

fn print_help() {
    println!("{}", "Commands".bold());
    println!("  start, resume, join, join-with-notes, end, reset");
    println!("  next, previous, first, last, to-saved, goto N");
    println!("  key-control, follow-active, full-screen, view:NAME");
    println!("  black-out, white-out, control-panel, close-panel");
    println!("  key CHORD [in text|select|embed|scroll|element]");
    println!("  status, help, quit");
    println!("{}", "An empty line presses the right arrow.".dimmed());
}

fn print_status(active: Option<u32>, count: u32, modes: &Modes) {
    let slide = active.map_or_else(|| "none".to_string(), |n| format!("{n}/{count}"));
    println!("slide {} | {}", slide.bold(), mode_line(modes));
}

fn mode_line(modes: &Modes) -> String {
    let flag = |on: bool| if on { "on".green() } else { "off".dimmed() };
    format!(
        "view {} | keys {} | follow {} | full screen {}",
        modes.view.as_str().cyan(),
        flag(modes.key_control),
        flag(modes.follow_active),
        flag(modes.full_screen),
    )
}

/// Prints the deck as the engine changes it.
struct TerminalSurface {
    outline: Outline,
    modes: Option<Modes>,
}

impl TerminalSurface {
    fn new(outline: Outline) -> Self {
        Self {
            outline,
            modes: None,
        }
    }

    fn print_slide(&self, slide_id: &str) {
        let Some(ordinal) = ordinal_of(slide_id) else {
            return;
        };
        let Some(slide) = self.outline.slide(ordinal) else {
            return;
        };
        let rule = format!("── {ordinal}/{} ", self.outline.slide_count());
        println!();
        println!("{}{}", rule.dimmed(), slide.title.bold());
        for line in slide.body.lines() {
            println!("  {line}");
        }
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, update: SurfaceUpdate) {
        match update {
            SurfaceUpdate::MarkCurrent { current, .. } => self.print_slide(&current),
            SurfaceUpdate::ClearCurrent => println!("{}", "(no active slide)".dimmed()),
            SurfaceUpdate::ScrollIntoView(_) => {}
            SurfaceUpdate::FullScreen(on) => {
                let state = if on { "full screen" } else { "windowed" };
                println!("{}", state.dimmed());
            }
            SurfaceUpdate::ShowBlank(Blank::Black) => println!("{}", "■ black".on_black()),
            SurfaceUpdate::ShowBlank(Blank::White) => {
                println!("{}", "□ white".black().on_white())
            }
            SurfaceUpdate::HideBlank => println!("{}", "(blank dismissed)".dimmed()),
            SurfaceUpdate::OpenPanel => println!("{}", "[control panel open]".cyan()),
            SurfaceUpdate::ClosePanel => println!("{}", "[control panel closed]".dimmed()),
            SurfaceUpdate::Blur => {}
            SurfaceUpdate::Controls(modes) => {
                if self.modes.as_ref() != Some(&modes) {
                    println!("{}", mode_line(&modes));
                    self.modes = Some(modes);
                }
            }
        }
    }
}

/// Ordinal from a slide id, `slide_<deck>-<n>`.
fn ordinal_of(slide_id: &str) -> Option<u32> {
    slide_id.rsplit_once('-')?.1.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidedeck::Key;

    #[test]
    fn test_parse_control_words() {
        assert_eq!(parse_line("quit"), Ok(Action::Quit));
        assert_eq!(parse_line("  Help "), Ok(Action::Help));
        assert_eq!(parse_line("goto 4"), Ok(Action::GoTo("4".to_string())));
        assert!(parse_line("goto").is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("start"), Ok(Action::Command(Command::Start)));
        assert_eq!(
            parse_line("view:speaker"),
            Ok(Action::Command(Command::SetView("speaker".to_string())))
        );
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn test_empty_line_presses_right_arrow() {
        assert_eq!(parse_line(""), Ok(Action::Key(KeyInput::new(Key::ArrowRight))));
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            parse_line("key ctrl+shift+enter"),
            Ok(Action::Key(
                KeyInput::new(Key::Enter).with(Modifiers::CTRL.with_shift())
            ))
        );
        assert_eq!(
            parse_line("key ArrowLeft in text"),
            Ok(Action::Key(
                KeyInput::new(Key::ArrowLeft).on(FocusTarget::TextEditing)
            ))
        );
        assert!(parse_line("key").is_err());
        assert!(parse_line("key n in sidebar").is_err());
        assert!(parse_line("key hyper+n").is_err());
    }

    #[test]
    fn test_ordinal_of_slide_id() {
        assert_eq!(ordinal_of("slide_talk-3"), Some(3));
        assert_eq!(ordinal_of("slide_my-talk-12"), Some(12));
        assert_eq!(ordinal_of("slide_talk"), None);
    }

    #[test]
    fn test_lines_drive_a_deck() {
        let hub = StorageHub::in_memory();
        let mut page = Page::new(&hub, "talk.md", "");
        let id = page.attach(DeckOptions::new(3), slidedeck::NullSurface);

        assert!(handle_line(&mut page, &id, "start"));
        assert!(handle_line(&mut page, &id, ""));
        assert_eq!(page.deck(&id).and_then(|d| d.active_slide()), Some(2));
        assert!(handle_line(&mut page, &id, "goto 3"));
        assert_eq!(page.deck(&id).and_then(|d| d.active_slide()), Some(3));
        assert!(handle_line(&mut page, &id, "goto 9"));
        assert_eq!(page.deck(&id).and_then(|d| d.active_slide()), Some(3));
        assert!(!handle_line(&mut page, &id, "quit"));
    }
}
