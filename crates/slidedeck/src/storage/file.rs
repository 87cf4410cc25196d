use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::Area;
use crate::error::{Error, Result};

/// Storage area persisted as a JSON object in a file.
///
/// Every read goes to disk so writes from other processes are seen. The
/// snapshot remembers what this process last saw, which lets
/// [`refresh`](Area::refresh) name the keys someone else changed.
///
/// Each write re-reads the file, changes one key and replaces the whole file.
/// There is no lock around that, so two processes writing at the same moment
/// can drop each other's change, even to different keys. Writes that do not
/// overlap keep every key. Give concurrent presenters separate store files
/// if that matters.
#[derive(Debug)]
pub struct FileArea {
    path: PathBuf,
    snapshot: BTreeMap<String, String>,
}

impl FileArea {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = read_entries(&path)?;
        Ok(Self { path, snapshot })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entries(&mut self, entries: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| Error::StoreIo {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&entries).map_err(|source| Error::StoreFormat {
            path: self.path.clone(),
            source,
        })?;

        // Write beside the target and rename so readers never see half a file
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        std::fs::write(&tmp, json).map_err(|source| Error::StoreIo {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| Error::StoreIo {
            path: self.path.clone(),
            source,
        })?;

        trace!(path = %self.path.display(), entries = entries.len(), "store written");
        self.snapshot = entries;
        Ok(())
    }
}

impl Area for FileArea {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = read_entries(&self.path)?;
        Ok(entries.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = read_entries(&self.path)?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = read_entries(&self.path)?;
        if entries.remove(key).is_none() {
            self.snapshot = entries;
            return Ok(());
        }
        self.write_entries(entries)
    }

    fn refresh(&mut self) -> Result<Vec<String>> {
        let current = read_entries(&self.path)?;
        let mut changed: Vec<String> = current
            .iter()
            .filter(|(key, value)| self.snapshot.get(*key) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            self.snapshot
                .keys()
                .filter(|key| !current.contains_key(*key))
                .cloned(),
        );
        changed.sort();
        self.snapshot = current;
        Ok(changed)
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(Error::StoreIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&contents).map_err(|source| Error::StoreFormat {
        path: path.to_path_buf(),
        source,
    })
}
