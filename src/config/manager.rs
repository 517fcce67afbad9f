//! File-backed configuration manager.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use super::ConfigDocument;
use crate::error::ConfigError;

/// Loads and caches TOML config documents under a data directory.
///
/// The directory is injected at construction; the manager never consults
/// ambient process state. Loaded documents are cached until `reload` or
/// `unload`, and a missing file is created empty on first load so hosts
/// get a file to edit.
#[derive(Clone)]
pub struct ConfigManager {
    data_dir: PathBuf,
    documents: Arc<DashMap<String, ConfigDocument>>,
}

impl ConfigManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            documents: Arc::new(DashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Load a config by name ("settings" and "settings.toml" are the same
    /// document), creating an empty file if none exists.
    ///
    /// Repeated loads return the cached document.
    pub fn load(&self, name: &str) -> Result<ConfigDocument, ConfigError> {
        let normalized = normalize_name(name)?;

        if let Some(cached) = self.documents.get(&normalized) {
            return Ok(cached.value().clone());
        }

        let path = self.data_dir.join(&normalized);
        if !path.exists() {
            debug!("Creating empty config file: {}", path.display());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    name: normalized.clone(),
                    source,
                })?;
            }
            fs::write(&path, "").map_err(|source| ConfigError::Io {
                name: normalized.clone(),
                source,
            })?;

            let document = ConfigDocument::empty();
            self.documents.insert(normalized, document.clone());
            return Ok(document);
        }

        let document = self.read_document(&normalized)?;
        self.documents.insert(normalized, document.clone());
        Ok(document)
    }

    /// The cached document for a previously loaded config.
    pub fn get(&self, name: &str) -> Option<ConfigDocument> {
        let normalized = normalize_name(name).ok()?;
        self.documents.get(&normalized).map(|d| d.value().clone())
    }

    /// Re-read a loaded config from disk.
    ///
    /// Returns `false` (with a warning) if the config was never loaded,
    /// the file is gone, or it no longer parses; the previous snapshot
    /// stays cached in the failure cases.
    pub fn reload(&self, name: &str) -> bool {
        let Ok(normalized) = normalize_name(name) else {
            warn!("Cannot reload config with empty name");
            return false;
        };

        if !self.documents.contains_key(&normalized) {
            warn!("Cannot reload config that hasn't been loaded: {}", normalized);
            return false;
        }

        match self.read_document(&normalized) {
            Ok(document) => {
                self.documents.insert(normalized, document);
                true
            }
            Err(e) => {
                warn!("Failed to reload config: {:#}", e);
                false
            }
        }
    }

    /// Re-read every loaded config.
    pub fn reload_all(&self) {
        let names: Vec<String> = self.documents.iter().map(|d| d.key().clone()).collect();
        for name in names {
            self.reload(&name);
        }
    }

    /// Drop a config from the cache. Returns `false` if it wasn't loaded.
    pub fn unload(&self, name: &str) -> bool {
        match normalize_name(name) {
            Ok(normalized) => self.documents.remove(&normalized).is_some(),
            Err(_) => false,
        }
    }

    /// Drop all cached configs.
    pub fn unload_all(&self) {
        self.documents.clear();
    }

    /// Number of loaded configs.
    pub fn loaded_count(&self) -> usize {
        self.documents.len()
    }

    fn read_document(&self, normalized: &str) -> Result<ConfigDocument, ConfigError> {
        let path = self.data_dir.join(normalized);
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            name: normalized.to_string(),
            source,
        })?;
        let root: toml::Value = text.parse().map_err(|source| ConfigError::Parse {
            name: normalized.to_string(),
            source,
        })?;
        Ok(ConfigDocument::new(root))
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("data_dir", &self.data_dir)
            .field("loaded", &self.documents.len())
            .finish()
    }
}

fn normalize_name(name: &str) -> Result<String, ConfigError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidName(
            "config name cannot be empty".into(),
        ));
    }

    if name.ends_with(".toml") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.toml", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn manager() -> (ConfigManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (ConfigManager::new(dir.path()), dir)
    }

    #[test]
    fn load_parses_an_existing_file() {
        let (manager, dir) = manager();
        fs::write(
            dir.path().join("settings.toml"),
            "[settings]\ndebug = true\n",
        )
        .unwrap();

        let doc = manager.load("settings").unwrap();
        assert!(doc.get_bool_or("settings.debug", false));
        assert_eq!(manager.loaded_count(), 1);
    }

    #[test]
    fn name_normalization_shares_the_document() {
        let (manager, dir) = manager();
        fs::write(dir.path().join("settings.toml"), "x = 1\n").unwrap();

        manager.load("settings").unwrap();
        let doc = manager.get("settings.toml").unwrap();
        assert_eq!(doc.get_i64("x"), Some(1));
        assert_eq!(manager.loaded_count(), 1);
    }

    #[test]
    fn missing_file_is_created_empty() {
        let (manager, dir) = manager();

        let doc = manager.load("fresh").unwrap();
        assert!(!doc.contains("anything"));
        assert!(dir.path().join("fresh.toml").exists());
    }

    #[test]
    fn empty_name_is_invalid() {
        let (manager, _dir) = manager();
        assert!(matches!(
            manager.load("  "),
            Err(ConfigError::InvalidName(_))
        ));
    }

    #[test]
    fn parse_error_is_reported() {
        let (manager, dir) = manager();
        fs::write(dir.path().join("broken.toml"), "not [valid toml").unwrap();

        assert!(matches!(
            manager.load("broken"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let (manager, dir) = manager();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "limit = 1\n").unwrap();

        manager.load("settings").unwrap();

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "limit = 2").unwrap();
        drop(file);

        assert!(manager.reload("settings"));
        assert_eq!(manager.get("settings").unwrap().get_i64("limit"), Some(2));
    }

    #[test]
    fn reload_requires_a_prior_load() {
        let (manager, _dir) = manager();
        assert!(!manager.reload("never-loaded"));
    }

    #[test]
    fn reload_failure_keeps_previous_snapshot() {
        let (manager, dir) = manager();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "limit = 1\n").unwrap();
        manager.load("settings").unwrap();

        fs::write(&path, "not [valid toml").unwrap();
        assert!(!manager.reload("settings"));
        assert_eq!(manager.get("settings").unwrap().get_i64("limit"), Some(1));
    }

    #[test]
    fn unload_drops_the_cache_entry() {
        let (manager, dir) = manager();
        fs::write(dir.path().join("a.toml"), "x = 1\n").unwrap();
        manager.load("a").unwrap();

        assert!(manager.unload("a"));
        assert!(manager.get("a").is_none());
        assert!(!manager.unload("a"));
    }
}
