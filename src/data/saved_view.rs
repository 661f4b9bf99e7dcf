/// Saved views - field order persisted outside the grid
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::reorder::commit::MoveDescription;
use crate::reorder::traits::ReorderListener;
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub name: String,
    pub field_order: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl SavedView {
    pub fn new(name: impl Into<String>, field_order: Vec<String>) -> Self {
        Self {
            name: name.into(),
            field_order,
            updated_at: Utc::now(),
        }
    }

    /// Replay a committed move by field name. Returns false when the view
    /// does not know every moved field.
    pub fn apply_move(&mut self, update: &MoveDescription) -> bool {
        let positions: Option<Vec<usize>> = update
            .field_names
            .iter()
            .map(|name| self.field_order.iter().position(|f| f == name))
            .collect();
        let Some(positions) = positions else {
            return false;
        };
        if positions.is_empty() {
            return false;
        }

        let moved: Vec<String> = update.field_names.clone();
        self.field_order.retain(|f| !moved.contains(f));
        let at = update.to.min(self.field_order.len());
        self.field_order.splice(at..at, moved);
        self.updated_at = Utc::now();
        true
    }
}

/// JSON-file backed saved view, kept in step with drag commits
pub struct SavedViewStore {
    dir: PathBuf,
    view: SavedView,
}

impl SavedViewStore {
    /// Open `name` in `dir`, starting from `default_order` when no file exists
    pub fn open(dir: impl Into<PathBuf>, name: &str, default_order: Vec<String>) -> Result<Self> {
        let dir = dir.into();
        let path = Self::path_in(&dir, name);
        let view = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!("No saved view at {}, starting fresh", path.display());
            SavedView::new(name, default_order)
        };
        Ok(Self { dir, view })
    }

    /// Open `name` under the platform data directory
    pub fn open_default(name: &str, default_order: Vec<String>) -> Result<Self> {
        Self::open(AppPaths::views_dir()?, name, default_order)
    }

    pub fn view(&self) -> &SavedView {
        &self.view
    }

    pub fn path(&self) -> PathBuf {
        Self::path_in(&self.dir, &self.view.name)
    }

    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path();
        let json = serde_json::to_string_pretty(&self.view)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Names of every view stored in `dir`
    pub fn list_views(dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !dir.exists() {
            return Ok(names);
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_in(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.json", name))
    }

    fn load_from(path: &Path) -> Result<SavedView> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let view = serde_json::from_str(&content)
            .with_context(|| format!("Malformed saved view {}", path.display()))?;
        Ok(view)
    }
}

impl ReorderListener for SavedViewStore {
    fn persist_field_order(&mut self, description: &MoveDescription) {
        if !self.view.apply_move(description) {
            warn!("Saved view '{}' does not contain {:?}", self.view.name, description.field_names);
            return;
        }
        if let Err(e) = self.save() {
            warn!("Failed to persist saved view '{}': {}", self.view.name, e);
        }
    }

    fn name(&self) -> &str {
        "SavedViewStore"
    }
}
