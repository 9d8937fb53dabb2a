//! Config store backed by a local TOML or JSON file.
//!
//! ```toml
//! [[entries]]
//! name = "/switchyard/tools/echo"
//! value = '{"name": "echo", "description": "Echo input"}'
//!
//! [[entries]]
//! name = "/switchyard/resources/guide"
//! value = { name = "guide", uri = "doc://guide", content = "Read me" }
//! ```
//!
//! A `value` may be the raw JSON string or a structured table; tables are
//! serialized to JSON. All matching entries are served as a single page.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use switchyard_core::{ConfigEntry, ConfigPage, ConfigStore};

#[derive(Debug, Deserialize)]
struct EntryFile {
    #[serde(default)]
    entries: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    name: String,
    value: Value,
}

impl FileEntry {
    fn into_entry(self) -> ConfigEntry {
        let value = match self.value {
            Value::String(raw) => raw,
            structured => structured.to_string(),
        };
        ConfigEntry::new(self.name, value)
    }
}

/// In-process config store loaded once from disk.
#[derive(Clone, Debug, Default)]
pub struct FileConfigStore {
    entries: Vec<ConfigEntry>,
}

impl FileConfigStore {
    /// Load entries from a `.toml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        let file: EntryFile = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            other => return Err(Error::UnsupportedFormat(other.unwrap_or("").to_string())),
        };

        log::debug!(
            "Loaded {} entr(ies) from {}",
            file.entries.len(),
            path.display()
        );
        Ok(Self::from_entries(
            file.entries.into_iter().map(FileEntry::into_entry).collect(),
        ))
    }

    /// Wrap an in-memory list of entries.
    pub fn from_entries(entries: Vec<ConfigEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the file held no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn list_entries(
        &self,
        namespace: &str,
        _next_token: Option<&str>,
    ) -> switchyard_core::Result<ConfigPage> {
        Ok(ConfigPage {
            entries: self
                .entries
                .iter()
                .filter(|e| e.name.starts_with(namespace))
                .cloned()
                .collect(),
            next_token: None,
        })
    }
}
