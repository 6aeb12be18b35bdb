// Session snapshot persistence.
// Restores the navigational position across launches. A missing or corrupt
// file is treated as a first run, never as an error.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::paths;
use crate::error::Result;

/// Which view the session was in when last persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    BrowsingGroups,
    ViewingPinned,
    ViewingRunOutput,
}

/// Persisted navigational position. Written at mutation boundaries and on
/// quit, not on every keystroke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub view_state: ViewMode,
    /// Group ids from root to the current position.
    pub group_path: Vec<String>,
    pub selected_workflow: Option<String>,
    /// Whether the workflow was entered via the pinned shortcut list; back
    /// navigation returns there.
    pub from_pinned_view: bool,
    pub list_index: usize,
    pub pinned_list_index: usize,
}

/// Where snapshots live and whether persistence is enabled at all.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Store at the default platform location.
    pub fn new() -> Self {
        Self {
            path: paths::session_state_path(),
        }
    }

    /// Store at an explicit path (--state-file).
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Persistence disabled (--no-state): load yields defaults, save is a
    /// no-op.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Load the last snapshot. Missing or malformed files silently reset to
    /// the default state.
    pub fn load(&self) -> Snapshot {
        let Some(path) = &self.path else {
            return Snapshot::default();
        };
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Snapshot::default(),
        }
    }

    /// Persist a snapshot atomically via temp-file rename.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let temp = path.with_extension("tmp");
        let mut file = fs::File::create(&temp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp, path)?;
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::at(dir.path().join("absent.json"));
        assert_eq!(store.load(), Snapshot::default());
    }

    #[test]
    fn test_corrupt_file_yields_defaults_without_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json at all").unwrap();

        let snapshot = SnapshotStore::at(path).load();
        assert_eq!(snapshot.view_state, ViewMode::BrowsingGroups);
        assert!(snapshot.group_path.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::at(dir.path().join("nested").join("session.json"));

        let snapshot = Snapshot {
            view_state: ViewMode::ViewingRunOutput,
            group_path: vec!["services".into(), "backend".into()],
            selected_workflow: Some("deploy.yml".into()),
            from_pinned_view: true,
            list_index: 3,
            pinned_list_index: 1,
        };
        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn test_disabled_store_is_inert() {
        let store = SnapshotStore::disabled();
        store.save(&Snapshot::default()).unwrap();
        assert_eq!(store.load(), Snapshot::default());
    }
}
