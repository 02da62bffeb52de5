use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::model::{now_iso, KnowledgeBase, SyncConfig, VersionEntry, VersionSnapshot};

pub const CURRENT_FILE: &str = "current_knowledge.json";
pub const VERSIONS_FILE: &str = "versions.json";
pub const SYNC_CONFIG_FILE: &str = "sync_config.json";
pub const SYNC_LOG_FILE: &str = "sync_log.txt";

/// Versioned knowledge base kept as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    dir: PathBuf,
}

impl KnowledgeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Like [`KnowledgeStore::new`] but creates the directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        fs::create_dir_all(&store.dir).map_err(|e| StoreError::io(&store.dir, e))?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn exists(&self) -> bool { self.dir.is_dir() }

    fn path(&self, name: &str) -> PathBuf { self.dir.join(name) }

    /// Current knowledge base, or an empty one at version 1.0.0.
    pub fn load(&self) -> Result<KnowledgeBase> {
        Ok(read_json_opt(&self.path(CURRENT_FILE))?.unwrap_or_default())
    }

    /// Snapshot `kb` as a new version and make it current.
    ///
    /// The hash covers `kb` as passed in, before `version` and
    /// `last_updated` are stamped. Returns the new version string.
    pub fn save(&self, kb: &mut KnowledgeBase, commit_message: &str) -> Result<String> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let hash = kb.content_hash()?;
        let mut versions = self.versions()?;
        let number = versions.len() + 1;
        let version = format!("{number}.0.0");
        let timestamp = now_iso();

        let file = self.path(&format!("version_{number}_{hash}.json"));
        let snapshot = VersionSnapshot {
            version: version.clone(),
            hash: hash.clone(),
            timestamp: timestamp.clone(),
            commit_message: commit_message.to_string(),
            data: kb.clone(),
        };
        write_json(&file, &snapshot)?;

        versions.push(VersionEntry {
            version: version.clone(),
            hash,
            timestamp,
            commit_message: commit_message.to_string(),
            file: file.to_string_lossy().into_owned(),
        });
        write_json(&self.path(VERSIONS_FILE), &versions)?;

        kb.last_updated = Some(now_iso());
        kb.version = version.clone();
        write_json(&self.path(CURRENT_FILE), &*kb)?;
        info!(%version, sections = kb.sections.len(), "saved knowledge base");
        Ok(version)
    }

    /// Overwrite the current file without creating a version.
    pub fn save_current(&self, kb: &KnowledgeBase) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        write_json(&self.path(CURRENT_FILE), kb)
    }

    pub fn versions(&self) -> Result<Vec<VersionEntry>> {
        Ok(read_json_opt(&self.path(VERSIONS_FILE))?.unwrap_or_default())
    }

    /// Make the snapshot of `version` current and return it.
    pub fn restore(&self, version: &str) -> Result<KnowledgeBase> {
        let entry = self
            .versions()?
            .into_iter()
            .find(|v| v.version == version)
            .ok_or_else(|| StoreError::VersionNotFound(version.to_string()))?;
        let snapshot: VersionSnapshot = read_json(&self.snapshot_path(&entry))?;
        write_json(&self.path(CURRENT_FILE), &snapshot.data)?;
        info!(version, "restored knowledge base");
        Ok(snapshot.data)
    }

    /// Recorded paths may be relative to another working directory; fall back
    /// to the file name inside this store.
    fn snapshot_path(&self, entry: &VersionEntry) -> PathBuf {
        let recorded = PathBuf::from(&entry.file);
        if recorded.is_file() {
            return recorded;
        }
        match recorded.file_name() {
            Some(name) => self.dir.join(name),
            None => recorded,
        }
    }

    pub fn load_sync_config(&self) -> Result<SyncConfig> {
        Ok(read_json_opt(&self.path(SYNC_CONFIG_FILE))?.unwrap_or_default())
    }

    pub fn save_sync_config(&self, config: &SyncConfig) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        write_json(&self.path(SYNC_CONFIG_FILE), config)
    }

    /// Append `[YYYY-mm-dd HH:MM:SS] message` to the sync log.
    pub fn append_log(&self, message: &str) -> Result<()> {
        let path = self.path(SYNC_LOG_FILE);
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        writeln!(file, "[{stamp}] {message}").map_err(|e| StoreError::io(&path, e))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| StoreError::json(path, e))
}

fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "not found, using defaults");
        return Ok(None);
    }
    read_json(path).map(Some)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;
    fs::write(path, body).map_err(|e| StoreError::io(path, e))
}
