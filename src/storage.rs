// ABOUTME: Session storage for the slideforge application
// ABOUTME: Injectable key/value slot plus the session store that persists deck and panel layout

use crate::errors::{ForgeError, Result};
use crate::model::Presentation;
use crate::utils;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PRESENTATION_KEY: &str = "presentation";
pub const LEFT_PANEL_COLLAPSED_KEY: &str = "leftPanelCollapsed";
pub const RIGHT_PANEL_COLLAPSED_KEY: &str = "rightPanelCollapsed";
pub const LEFT_PANEL_WIDTH_KEY: &str = "leftPanelWidth";
pub const RIGHT_PANEL_WIDTH_KEY: &str = "rightPanelWidth";

pub const DEFAULT_LEFT_PANEL_WIDTH: u32 = 280;
pub const DEFAULT_RIGHT_PANEL_WIDTH: u32 = 320;

/// A local, non-networked key/value slot.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-process storage, used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON file holding every key.
///
/// The file is read once when opened and rewritten wholesale on each change.
/// A file that does not parse is moved aside to `<name>.bak` and the slot
/// starts empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            debug!("Reading storage slot {:?}", path);
            let raw = fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                match serde_json::from_str(&raw) {
                    Ok(entries) => entries,
                    Err(e) => {
                        let backup = sibling_path(path, "bak");
                        warn!(
                            "Unreadable storage file {:?} ({}), moving it to {:?}",
                            path, e, backup
                        );
                        fs::rename(path, &backup)?;
                        BTreeMap::new()
                    }
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        utils::ensure_parent_directory_exists(&self.path)?;
        let raw = serde_json::to_string_pretty(entries)?;
        let staging = sibling_path(&self.path, "tmp");
        fs::write(&staging, raw)?;
        fs::rename(&staging, &self.path).map_err(|e| {
            ForgeError::StorageError(format!("Failed to replace {:?}: {}", self.path, e))
        })?;
        Ok(())
    }
}

/// `session.json` -> `session.json.<suffix>`, in the same directory.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Presentational state of the editor's two side panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub left_collapsed: bool,
    pub right_collapsed: bool,
    pub left_width: u32,
    pub right_width: u32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            left_collapsed: false,
            right_collapsed: false,
            left_width: DEFAULT_LEFT_PANEL_WIDTH,
            right_width: DEFAULT_RIGHT_PANEL_WIDTH,
        }
    }
}

/// Session state with a read-at-start, write-on-mutation lifecycle.
pub struct SessionStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the stored deck, if any.
    pub fn load_presentation(&self) -> Result<Option<Presentation>> {
        match self.storage.get(PRESENTATION_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_presentation(&self, presentation: &Presentation) -> Result<()> {
        let raw = serde_json::to_string(presentation)?;
        self.storage.set(PRESENTATION_KEY, &raw)?;
        debug!(
            "Persisted presentation {} ({} slides)",
            presentation.id,
            presentation.slides.len()
        );
        Ok(())
    }

    pub fn clear_presentation(&self) -> Result<()> {
        info!("Clearing stored presentation");
        self.storage.remove(PRESENTATION_KEY)
    }

    /// Read the panel layout; missing or unparsable values fall back to defaults.
    pub fn load_layout(&self) -> Result<PanelLayout> {
        let defaults = PanelLayout::default();
        Ok(PanelLayout {
            left_collapsed: self
                .read_parsed(LEFT_PANEL_COLLAPSED_KEY)?
                .unwrap_or(defaults.left_collapsed),
            right_collapsed: self
                .read_parsed(RIGHT_PANEL_COLLAPSED_KEY)?
                .unwrap_or(defaults.right_collapsed),
            left_width: self
                .read_parsed(LEFT_PANEL_WIDTH_KEY)?
                .unwrap_or(defaults.left_width),
            right_width: self
                .read_parsed(RIGHT_PANEL_WIDTH_KEY)?
                .unwrap_or(defaults.right_width),
        })
    }

    pub fn save_layout(&self, layout: &PanelLayout) -> Result<()> {
        self.storage
            .set(LEFT_PANEL_COLLAPSED_KEY, &layout.left_collapsed.to_string())?;
        self.storage
            .set(RIGHT_PANEL_COLLAPSED_KEY, &layout.right_collapsed.to_string())?;
        self.storage
            .set(LEFT_PANEL_WIDTH_KEY, &layout.left_width.to_string())?;
        self.storage
            .set(RIGHT_PANEL_WIDTH_KEY, &layout.right_width.to_string())?;
        Ok(())
    }

    fn read_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.storage.get(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    warn!("Ignoring unparsable value for {}: {:?}", key, raw);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Slide;
    use tempfile::TempDir;

    fn sample_deck() -> Presentation {
        Presentation::new(
            "Space",
            "astral-core",
            "dark",
            vec![
                Slide::new("One", vec!["a".to_string()]),
                Slide::new("Two", vec!["b".to_string(), "c".to_string()]),
            ],
        )
    }

    #[test]
    fn presentation_round_trips_through_memory_storage() {
        let store = SessionStore::new(MemoryStorage::new());
        assert!(store.load_presentation().unwrap().is_none());

        let deck = sample_deck();
        store.save_presentation(&deck).unwrap();
        assert_eq!(store.load_presentation().unwrap(), Some(deck));

        store.clear_presentation().unwrap();
        assert!(store.load_presentation().unwrap().is_none());
    }

    #[test]
    fn layout_defaults_when_absent_or_garbage() {
        let storage = MemoryStorage::new();
        storage.set(LEFT_PANEL_WIDTH_KEY, "wide").unwrap();
        let store = SessionStore::new(storage);
        assert_eq!(store.load_layout().unwrap(), PanelLayout::default());
    }

    #[test]
    fn layout_round_trips() {
        let store = SessionStore::new(MemoryStorage::new());
        let layout = PanelLayout {
            left_collapsed: true,
            right_collapsed: false,
            left_width: 200,
            right_width: 410,
        };
        store.save_layout(&layout).unwrap();
        assert_eq!(store.load_layout().unwrap(), layout);
    }

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("slot.json");

        let deck = sample_deck();
        {
            let store = SessionStore::new(FileStorage::open(&path).unwrap());
            store.save_presentation(&deck).unwrap();
        }

        let reopened = SessionStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(reopened.load_presentation().unwrap(), Some(deck));
    }

    #[test]
    fn corrupt_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slot.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(FileStorage::open(&path).unwrap());
        assert!(store.load_presentation().unwrap().is_none());
        assert_eq!(
            fs::read_to_string(dir.path().join("slot.json.bak")).unwrap(),
            "{not json"
        );

        let deck = sample_deck();
        store.save_presentation(&deck).unwrap();
        let reopened = SessionStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(reopened.load_presentation().unwrap(), Some(deck));
    }

    #[test]
    fn flush_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slot.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set("k", "v").unwrap();
        storage.set("k", "w").unwrap();

        assert!(!dir.path().join("slot.json.tmp").exists());
        let raw = fs::read_to_string(&path).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.get("k").map(String::as_str), Some("w"));
    }
}
