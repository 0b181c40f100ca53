//! Embedded-JSON storage variant — a single JSON file shaped like a
//! TinyDB table: `{"_default": {"<id>": <document>, ...}}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use super::{Backend, BackendId};
use crate::error::StashError;
use crate::record::Document;

pub struct EmbeddedJsonStorage {
    path: PathBuf,
}

impl EmbeddedJsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the table keyed by numeric id. A `BTreeMap<u64, _>` keeps
    /// natural insertion order regardless of how the JSON file's string
    /// keys happen to serialize on disk.
    fn read_table(&self) -> Result<BTreeMap<u64, Document>, StashError> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read stash file {}", self.path.display()))
            .map_err(StashError::BackendFailure)?;

        let root: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("stash file {} is not valid JSON", self.path.display()))
            .map_err(StashError::BackendFailure)?;

        let table = root
            .get("_default")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let mut map = BTreeMap::new();
        for (key, value) in table {
            let id: u64 = key
                .parse()
                .map_err(|_| StashError::BackendFailure(anyhow::anyhow!("non-numeric record id '{key}'")))?;
            let doc: Document = serde_json::from_value(value)
                .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("malformed record {key}: {e}")))?;
            map.insert(id, doc);
        }
        Ok(map)
    }

    fn write_table(&self, table: &BTreeMap<u64, Document>) -> Result<(), StashError> {
        let mut obj = serde_json::Map::new();
        for (id, doc) in table {
            let value = serde_json::to_value(doc)
                .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to serialise record: {e}")))?;
            obj.insert(id.to_string(), value);
        }
        let root = serde_json::json!({ "_default": obj });
        let text = serde_json::to_string_pretty(&root)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to serialise stash file: {e}")))?;

        fs::write(&self.path, text)
            .with_context(|| format!("failed to write stash file {}", self.path.display()))
            .map_err(StashError::BackendFailure)
    }
}

impl Backend for EmbeddedJsonStorage {
    fn init(&self) -> Result<(), StashError> {
        if self.path.exists() {
            return Err(StashError::AlreadyInitialized(self.path.display().to_string()));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))
                    .map_err(StashError::BackendFailure)?;
            }
        }
        self.write_table(&BTreeMap::new())
    }

    fn put(&self, doc: &Document) -> Result<BackendId, StashError> {
        let mut table = self.read_table()?;
        let next_id = table.keys().next_back().copied().unwrap_or(0) + 1;

        // `put` also serves as overwrite-in-place for `modify`: replace
        // the existing row for this name (if any) rather than appending
        // a second one under a fresh id.
        if let Some(existing_id) = table
            .iter()
            .find(|(_, existing)| existing.name == doc.name)
            .map(|(id, _)| *id)
        {
            table.insert(existing_id, doc.clone());
            self.write_table(&table)?;
            return Ok(existing_id.to_string());
        }

        table.insert(next_id, doc.clone());
        self.write_table(&table)?;
        Ok(next_id.to_string())
    }

    fn get(&self, name: &str) -> Result<Option<Document>, StashError> {
        let table = self.read_table()?;
        Ok(table.values().find(|doc| doc.name == name).cloned())
    }

    fn list(&self) -> Result<Vec<Document>, StashError> {
        let table = self.read_table()?;
        Ok(table.into_values().collect())
    }

    fn delete(&self, name: &str) -> Result<bool, StashError> {
        let mut table = self.read_table()?;
        let id = table
            .iter()
            .find(|(_, doc)| doc.name == name)
            .map(|(id, _)| *id);

        match id {
            Some(id) => {
                table.remove(&id);
                self.write_table(&table)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
