//! JSON shapes of the knowledge base directory.
//!
//! Timestamps are kept as the ISO-8601 strings found on disk so files written
//! by other tools load unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

pub const INITIAL_VERSION: &str = "1.0.0";

/// Local time as `YYYY-mm-ddTHH:MM:SS.ffffff`.
pub fn now_iso() -> String {
    chrono::Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_synced: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(b: &bool) -> bool { !*b }

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            created_at: Some(now_iso()),
            updated_at: None,
            synced_at: None,
            source_url: None,
            auto_synced: false,
            extra: Map::new(),
        }
    }

    /// Section mirroring the page at `url`.
    pub fn synced(url: &str, content: impl Into<String>) -> Self {
        Self {
            title: format!("Auto-Synced from {url}"),
            content: content.into(),
            created_at: None,
            updated_at: None,
            synced_at: Some(now_iso()),
            source_url: Some(url.to_string()),
            auto_synced: true,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default = "initial_version")]
    pub version: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn initial_version() -> String { INITIAL_VERSION.to_string() }

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self { sections: Vec::new(), version: initial_version(), last_updated: None, extra: Map::new() }
    }
}

impl KnowledgeBase {
    pub fn find_section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Append a section; titles are unique.
    pub fn add_section(&mut self, section: Section) -> Result<()> {
        if self.find_section(&section.title).is_some() {
            return Err(StoreError::DuplicateSection(section.title));
        }
        self.sections.push(section);
        Ok(())
    }

    /// Replace the content of the section titled `title` and stamp `updated_at`.
    pub fn update_section(&mut self, title: &str, content: impl Into<String>) -> Result<&Section> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.title == title)
            .ok_or_else(|| StoreError::SectionNotFound(title.to_string()))?;
        section.content = content.into();
        section.updated_at = Some(now_iso());
        Ok(section)
    }

    pub fn remove_section(&mut self, title: &str) -> Result<Section> {
        let idx = self
            .sections
            .iter()
            .position(|s| s.title == title)
            .ok_or_else(|| StoreError::SectionNotFound(title.to_string()))?;
        Ok(self.sections.remove(idx))
    }

    /// Replace the auto-synced section for `section.source_url`, or append it.
    /// Returns `true` when an existing section was replaced.
    pub fn upsert_synced(&mut self, section: Section) -> bool {
        let existing = self
            .sections
            .iter()
            .position(|s| s.auto_synced && s.source_url.is_some() && s.source_url == section.source_url);
        match existing {
            Some(idx) => {
                self.sections[idx] = section;
                true
            }
            None => {
                self.sections.push(section);
                false
            }
        }
    }

    /// First 8 hex chars of a blake3 digest over key-sorted JSON.
    pub fn content_hash(&self) -> Result<String> {
        let canonical = serde_json::to_value(self)
            .and_then(|v| serde_json::to_string(&v))
            .map_err(|e| StoreError::json("<memory>", e))?;
        let digest = blake3::hash(canonical.as_bytes()).to_hex();
        Ok(digest.as_str()[..8].to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub hash: String,
    pub timestamp: String,
    #[serde(default)]
    pub commit_message: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version: String,
    pub hash: String,
    pub timestamp: String,
    #[serde(default)]
    pub commit_message: String,
    pub data: KnowledgeBase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(default = "daily")]
    pub sync_interval: String,
}

fn daily() -> String { "daily".to_string() }

impl Default for SyncConfig {
    fn default() -> Self {
        Self { enabled: false, urls: Vec::new(), last_sync: None, sync_interval: daily() }
    }
}
