use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use slidedeck::{Chord, EscapePolicy, Keymap, RouterConfig, ViewSet};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "slidedeck";
const STORE_FILENAME: &str = "store.json";

const VALID_KEYS: &str = "defaults.view, defaults.presenting_view, defaults.notes_view, \
    defaults.escape, defaults.dash_ends, keys.panel, keys.resume, keys.start, \
    keys.join_notes, keys.full_screen, keys.end, storage.path";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeysConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// View shown while not presenting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenting_view: Option<String>,

    /// View used by "join with notes"; `none` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_view: Option<String>,

    /// What Escape does on the deck itself: `inert` or `end`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_ends: Option<bool>,
}

/// Chords for the global quick commands, e.g. `ctrl+shift+enter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_screen: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Durable store file. Defaults to `<data dir>/slidedeck/store.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `slidedeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# slidedeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.view" | "defaults.presenting_view" | "defaults.notes_view" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid view: a view name cannot be empty.");
                }
                let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
                let slot = match key {
                    "defaults.view" => &mut defaults.view,
                    "defaults.presenting_view" => &mut defaults.presenting_view,
                    _ => &mut defaults.notes_view,
                };
                *slot = Some(value.trim().to_string());
            }
            "defaults.escape" => {
                parse_escape(value)?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .escape = Some(value.to_string());
            }
            "defaults.dash_ends" => {
                let Ok(on) = value.parse::<bool>() else {
                    anyhow::bail!("Invalid dash_ends: {value}. Must be 'true' or 'false'.");
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .dash_ends = Some(on);
            }
            "keys.panel" | "keys.resume" | "keys.start" | "keys.join_notes"
            | "keys.full_screen" | "keys.end" => {
                let chord: Chord = value.parse()?;
                let keys = self.keys.get_or_insert_with(KeysConfig::default);
                let slot = match key {
                    "keys.panel" => &mut keys.panel,
                    "keys.resume" => &mut keys.resume,
                    "keys.start" => &mut keys.start,
                    "keys.join_notes" => &mut keys.join_notes,
                    "keys.full_screen" => &mut keys.full_screen,
                    _ => &mut keys.end,
                };
                *slot = Some(chord.to_string());
            }
            "storage.path" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid storage path: cannot be empty.");
                }
                self.storage
                    .get_or_insert_with(StorageConfig::default)
                    .path = Some(PathBuf::from(value));
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }

    /// The deck's views, with the configured names filled in.
    pub fn views(&self) -> ViewSet {
        let fallback = ViewSet::default();
        let defaults = self.defaults.clone().unwrap_or_default();
        let default_view = defaults
            .view
            .unwrap_or_else(|| fallback.default_view().to_string());
        let presenting = defaults
            .presenting_view
            .unwrap_or_else(|| fallback.presenting_view().to_string());
        let notes = match defaults.notes_view.as_deref() {
            Some("none") => None,
            Some(view) => Some(view.to_string()),
            None => fallback.notes_view().map(ToString::to_string),
        };
        ViewSet::new(&default_view, &presenting, notes.as_deref())
    }

    /// Keyboard routing settings, with configured chords over the defaults.
    pub fn router(&self) -> Result<RouterConfig> {
        let defaults = self.defaults.clone().unwrap_or_default();
        let keys = self.keys.clone().unwrap_or_default();
        let mut keymap = Keymap::default();
        let overrides = [
            (keys.panel, &mut keymap.panel),
            (keys.resume, &mut keymap.resume),
            (keys.start, &mut keymap.start),
            (keys.join_notes, &mut keymap.join_notes),
            (keys.full_screen, &mut keymap.full_screen),
            (keys.end, &mut keymap.end),
        ];
        for (chord, slot) in overrides {
            if let Some(chord) = chord {
                *slot = chord.parse()?;
            }
        }

        let escape = match defaults.escape.as_deref() {
            Some(value) => parse_escape(value)?,
            None => EscapePolicy::default(),
        };
        Ok(RouterConfig {
            keymap,
            escape,
            dash_ends: defaults.dash_ends.unwrap_or(false),
        })
    }

    /// Where the durable store lives.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.storage.as_ref().and_then(|s| s.path.clone()) {
            return Ok(path);
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR).join(STORE_FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }
}

fn parse_escape(value: &str) -> Result<EscapePolicy> {
    match value {
        "inert" => Ok(EscapePolicy::Inert),
        "end" => Ok(EscapePolicy::EndPresentation),
        _ => anyhow::bail!("Invalid escape: {value}. Must be 'inert' or 'end'."),
    }
}
