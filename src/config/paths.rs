// Configuration and state file locations.
// Tier documents are discovered relative to the working directory and the
// platform config directory; session state lives in the local data dir.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Repository-shared config file, checked into the repo.
pub const REPO_CONFIG_FILE: &str = ".surge.yml";

/// Project-local user overrides, never committed.
pub const LOCAL_CONFIG_FILE: &str = ".surge.local.yml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "surge")
}

/// Repository-shared tier, resolved against the working directory.
pub fn repo_config_path() -> PathBuf {
    PathBuf::from(REPO_CONFIG_FILE)
}

/// User-global tier (~/.config/surge/config.yml on Linux).
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.yml"))
}

/// Project-local tier, resolved against the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG_FILE)
}

/// Base directory for session state and logs.
pub fn state_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
}

/// Default location of the session snapshot.
pub fn session_state_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("session.json"))
}

/// Debug log file written when --verbose is active.
pub fn log_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("surge.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_paths() {
        assert_eq!(repo_config_path(), PathBuf::from(".surge.yml"));
        assert_eq!(local_config_path(), PathBuf::from(".surge.local.yml"));
    }

    #[test]
    fn test_state_paths_share_a_directory() {
        if let (Some(state), Some(log)) = (session_state_path(), log_path()) {
            assert_eq!(state.parent(), log.parent());
            assert!(state.ends_with("session.json"));
        }
    }
}
