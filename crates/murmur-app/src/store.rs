//! Preference persistence.
//!
//! Two values survive restarts: the chosen display name and the dark-mode
//! flag. They are stored as a small JSON document whose keys match what the
//! browser client keeps in local storage.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

/// Persisted user preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Last joined display name. `None` after leaving.
    #[serde(rename = "chatUsername", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Dark theme selected.
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,
}

/// Preference storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("preference file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The file does not hold valid preferences.
    #[error("invalid preference file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where preferences live.
pub trait PreferenceStore {
    /// Load preferences. A store that was never written yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if existing data cannot be read or parsed.
    fn load(&self) -> Result<Preferences, StoreError>;

    /// Replace the stored preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be written.
    fn save(&self, preferences: &Preferences) -> Result<(), StoreError>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/murmur/preferences.json`, if the platform has a config
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("murmur").join("preferences.json"))
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Preferences, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, text)?;
        tracing::debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}

/// In-memory store for tests and simulation.
///
/// Clones share the same contents, so a test can keep one and inspect what
/// the runtime saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Preferences>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with preferences.
    pub fn with(preferences: Preferences) -> Self {
        Self { inner: Arc::new(Mutex::new(preferences)) }
    }

    /// Current contents.
    pub fn snapshot(&self) -> Preferences {
        self.inner.lock().map(|prefs| prefs.clone()).unwrap_or_default()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Preferences, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, preferences: &Preferences) -> Result<(), StoreError> {
        if let Ok(mut stored) = self.inner.lock() {
            *stored = preferences.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn save_creates_parent_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("murmur").join("preferences.json"));
        let prefs = Preferences { display_name: Some("alice".into()), dark_mode: true };

        store.save(&prefs).unwrap();
        assert_eq!(store.load().unwrap(), prefs);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"chatUsername\": \"alice\""));
        assert!(text.contains("\"darkMode\": true"));
    }

    #[test]
    fn partial_document_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"darkMode":true}"#).unwrap();

        let prefs = FileStore::new(&path).load().unwrap();
        assert_eq!(prefs, Preferences { display_name: None, dark_mode: true });
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileStore::new(&path).load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let observer = store.clone();
        store.save(&Preferences { display_name: Some("bob".into()), dark_mode: false }).unwrap();
        assert_eq!(observer.snapshot().display_name.as_deref(), Some("bob"));
    }
}
