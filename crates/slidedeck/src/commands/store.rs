use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use slidedeck::{DeckRegistry, DurableStore, FileArea, StorageHub};

use crate::config::Config;

fn open(store: Option<PathBuf>) -> Result<(PathBuf, StorageHub)> {
    let path = match store {
        Some(path) => path,
        None => Config::load_or_default().store_path()?,
    };
    let area =
        FileArea::open(&path).with_context(|| format!("Failed to open store {}", path.display()))?;
    Ok((path, StorageHub::new(area)))
}

fn durable(id: &str, hub: &StorageHub) -> DurableStore {
    let id = DeckRegistry::new().claim(Some(id), "/");
    DurableStore::new(&id.storage_keys(), hub.connect())
}

/// Print the saved slide of deck `id`.
pub fn status(id: &str, store: Option<PathBuf>) -> Result<()> {
    let (path, hub) = open(store)?;
    let store = durable(id, &hub);
    match store.saved() {
        Some(slide) => println!("{} is on slide {}", id.bold(), slide.to_string().green()),
        None => println!("{} has no saved slide", id.bold()),
    }
    println!("{}", format!("store: {}", path.display()).dimmed());
    Ok(())
}

/// Remove the saved slide of deck `id`.
pub fn clear(id: &str, store: Option<PathBuf>) -> Result<()> {
    let (path, hub) = open(store)?;
    let store = durable(id, &hub);
    if store.saved().is_none() {
        println!("{} has no saved slide", id.bold());
        return Ok(());
    }
    store
        .set(None)
        .with_context(|| format!("Failed to update {}", path.display()))?;
    println!("{} saved slide of {}", "Cleared".green().bold(), id.bold());
    Ok(())
}
