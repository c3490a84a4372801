//! Saved inbox views: named filter presets.
//!
//! Stores are passed in by the caller; nothing here reaches for global state.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{HubError, Result};
use crate::filter::MessageFilters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub name: String,
    #[serde(default)]
    pub filters: MessageFilters,
    pub created_at: DateTime<Utc>,
}

impl SavedView {
    pub fn new(name: &str, filters: MessageFilters) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HubError::InvalidViewName);
        }

        Ok(SavedView {
            name: name.to_string(),
            filters,
            created_at: Utc::now(),
        })
    }
}

pub trait ViewStore {
    fn list(&self) -> Result<Vec<SavedView>>;

    fn get(&self, name: &str) -> Result<Option<SavedView>> {
        let name = name.trim();
        Ok(self.list()?.into_iter().find(|view| view.name == name))
    }

    /// Insert, or replace the view with the same name in place.
    fn save(&mut self, view: SavedView) -> Result<()>;

    /// Returns whether a view was removed.
    fn delete(&mut self, name: &str) -> Result<bool>;

    /// Like [`ViewStore::get`], but a missing view is an error.
    fn require(&self, name: &str) -> Result<SavedView> {
        self.get(name)?
            .ok_or_else(|| HubError::UnknownView(name.trim().to_string()))
    }
}

fn upsert(views: &mut Vec<SavedView>, view: SavedView) {
    match views.iter_mut().find(|existing| existing.name == view.name) {
        Some(existing) => *existing = view,
        None => views.push(view),
    }
}

fn remove(views: &mut Vec<SavedView>, name: &str) -> bool {
    let name = name.trim();
    let before = views.len();
    views.retain(|view| view.name != name);
    views.len() != before
}

#[derive(Debug, Clone, Default)]
pub struct MemoryViewStore {
    views: Vec<SavedView>,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewStore for MemoryViewStore {
    fn list(&self) -> Result<Vec<SavedView>> {
        Ok(self.views.clone())
    }

    fn save(&mut self, view: SavedView) -> Result<()> {
        upsert(&mut self.views, view);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        Ok(remove(&mut self.views, name))
    }
}

/// Views persisted as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileViewStore {
    path: PathBuf,
}

impl JsonFileViewStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileViewStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, views: &[SavedView]) -> Result<()> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory).map_err(|e| HubError::io(&directory, e))?;

        let json = serde_json::to_string_pretty(views)?;
        let mut staged =
            NamedTempFile::new_in(&directory).map_err(|e| HubError::io(&directory, e))?;
        staged
            .write_all(json.as_bytes())
            .map_err(|e| HubError::io(staged.path(), e))?;
        staged
            .persist(&self.path)
            .map_err(|e| HubError::io(&self.path, e.error))?;

        log::debug!("wrote {} saved views to {}", views.len(), self.path.display());
        Ok(())
    }
}

impl ViewStore for JsonFileViewStore {
    fn list(&self) -> Result<Vec<SavedView>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(HubError::io(&self.path, e)),
        }
    }

    fn save(&mut self, view: SavedView) -> Result<()> {
        let mut views = self.list()?;
        log::info!("saving view '{}'", view.name);
        upsert(&mut views, view);
        self.write_all(&views)
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let mut views = self.list()?;
        if !remove(&mut views, name) {
            return Ok(false);
        }
        log::info!("deleted view '{}'", name.trim());
        self.write_all(&views)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommunicationType, Priority};
    use tempfile::TempDir;

    #[test]
    fn test_rejects_blank_names() {
        assert!(matches!(
            SavedView::new("   ", MessageFilters::default()),
            Err(HubError::InvalidViewName)
        ));
        assert_eq!(
            SavedView::new("  urgent ", MessageFilters::default()).unwrap().name,
            "urgent"
        );
    }

    #[test]
    fn test_memory_store_replaces_in_place() {
        let mut store = MemoryViewStore::new();
        store
            .save(SavedView::new("a", MessageFilters::default()).unwrap())
            .unwrap();
        store
            .save(SavedView::new("b", MessageFilters::default()).unwrap())
            .unwrap();
        store
            .save(SavedView::new("a", MessageFilters::new().with_search("tax")).unwrap())
            .unwrap();

        let views = store.list().unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "a");
        assert_eq!(views[0].filters.search, "tax");

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(matches!(store.require("a"), Err(HubError::UnknownView(name)) if name == "a"));
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("views.json");

        let mut store = JsonFileViewStore::new(&path);
        assert!(store.list().unwrap().is_empty());

        let filters = MessageFilters::new()
            .with_type(CommunicationType::Sms)
            .with_priority(Priority::Urgent);
        store
            .save(SavedView::new("urgent texts", filters.clone()).unwrap())
            .unwrap();

        let reopened = JsonFileViewStore::new(&path);
        let view = reopened.require("urgent texts").unwrap();
        assert_eq!(view.filters, filters);

        let mut reopened = reopened;
        assert!(reopened.delete("urgent texts").unwrap());
        assert!(JsonFileViewStore::new(&path).list().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_reports_corrupt_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("views.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileViewStore::new(&path);
        assert!(matches!(store.list(), Err(HubError::Json(_))));
    }
}
