use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let views = config.views();
    let router = config.router()?;

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "  (not created yet, showing defaults)".dimmed());
    }
    println!();

    println!("{}", "Views".bold());
    println!("  default:     {}", views.default_view());
    println!("  presenting:  {}", views.presenting_view());
    match views.notes_view() {
        Some(view) => println!("  notes:       {view}"),
        None => println!("  notes:       {}", "none".dimmed()),
    }
    println!();

    println!("{}", "Keys".bold());
    let keymap = &router.keymap;
    println!("  panel:       {}", keymap.panel);
    println!("  resume:      {}", keymap.resume);
    println!("  start:       {}", keymap.start);
    println!("  join_notes:  {}", keymap.join_notes);
    println!("  full_screen: {}", keymap.full_screen);
    println!("  end:         {}", keymap.end);
    println!(
        "  escape:      {}",
        match router.escape {
            slidedeck::EscapePolicy::Inert => "inert",
            slidedeck::EscapePolicy::EndPresentation => "end",
        }
    );
    println!("  dash_ends:   {}", router.dash_ends);
    println!();

    println!("{}", "Storage".bold());
    println!("  path:        {}", config.store_path()?.display());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
