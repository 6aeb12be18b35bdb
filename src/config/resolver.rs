// Layered configuration loading.
// Discovers tier documents, merges them lowest to highest precedence,
// applies environment overrides, validates the result, and writes pin
// changes back to the owning document.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Result, SurgeError};

use super::paths;
use super::types::{Config, ConfigSource, ConfigTier, Group, Preferences};

pub const ENV_REPOSITORY: &str = "SURGE_REPOSITORY";
pub const ENV_REFRESH_INTERVAL: &str = "SURGE_REFRESH_INTERVAL";
pub const ENV_THEME: &str = "SURGE_THEME";
pub const ENV_KEYBINDINGS: &str = "SURGE_KEYBINDINGS";

/// Load the configuration. An explicit path is the sole source; otherwise
/// the tier chain is discovered and merged. Environment overrides always win
/// over file-sourced values.
pub fn resolve(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => load_document(path, ConfigTier::Explicit)?,
        None => merge_tiers(&discover_tiers())?,
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Tier chain in precedence order, lowest first.
fn discover_tiers() -> Vec<(PathBuf, ConfigTier)> {
    let mut tiers = vec![(paths::repo_config_path(), ConfigTier::Repository)];
    if let Some(user) = paths::user_config_path() {
        tiers.push((user, ConfigTier::User));
    }
    tiers.push((paths::local_config_path(), ConfigTier::Local));
    tiers
}

/// Merge discovered documents lowest to highest precedence. A tier that
/// fails to parse is skipped with a warning; only an empty chain is fatal.
fn merge_tiers(tiers: &[(PathBuf, ConfigTier)]) -> Result<Config> {
    let mut merged: Option<Config> = None;
    for (path, tier) in tiers {
        if !path.exists() {
            continue;
        }
        match load_document(path, *tier) {
            Ok(overlay) => {
                tracing::debug!(tier = tier.label(), path = %path.display(), "loaded config tier");
                merged = Some(match merged.take() {
                    Some(base) => merge(base, overlay),
                    None => overlay,
                });
            }
            Err(err) => {
                tracing::warn!(
                    tier = tier.label(),
                    path = %path.display(),
                    "skipping unreadable config tier: {err}"
                );
            }
        }
    }
    merged.ok_or(SurgeError::NoConfig)
}

fn load_document(path: &Path, tier: ConfigTier) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let mut config: Config = serde_yaml::from_str(&contents)?;
    config.source = ConfigSource {
        tier,
        path: Some(path.to_path_buf()),
    };
    Ok(config)
}

/// Right-biased merge of one overlay onto a base. Repository and groups
/// replace wholesale when the overlay sets them; preferences merge field by
/// field so an overlay that only sets one key leaves the rest intact.
pub fn merge(mut base: Config, overlay: Config) -> Config {
    if !overlay.repository.is_empty() {
        base.repository = overlay.repository;
    }
    merge_preferences(&mut base.preferences, overlay.preferences);
    if !overlay.groups.is_empty() {
        // The tier that defines the group tree also owns pin write-back.
        base.groups = overlay.groups;
        base.source = overlay.source;
    }
    base
}

fn merge_preferences(base: &mut Preferences, overlay: Preferences) {
    if overlay.refresh_interval != 0 {
        base.refresh_interval = overlay.refresh_interval;
    }
    if !overlay.theme.is_empty() {
        base.theme = overlay.theme;
    }
    if !overlay.keybindings.is_empty() {
        base.keybindings = overlay.keybindings;
    }
    for (key, value) in overlay.custom_settings {
        base.custom_settings.insert(key, value);
    }
}

/// Apply environment-variable overrides; these always beat file values.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(repo) = lookup(ENV_REPOSITORY).filter(|v| !v.is_empty()) {
        config.repository = repo;
    }
    if let Some(interval) = lookup(ENV_REFRESH_INTERVAL) {
        match interval.parse::<u64>() {
            Ok(secs) => config.preferences.refresh_interval = secs,
            Err(_) => tracing::warn!("ignoring non-numeric {ENV_REFRESH_INTERVAL}={interval:?}"),
        }
    }
    if let Some(theme) = lookup(ENV_THEME).filter(|v| !v.is_empty()) {
        config.preferences.theme = theme;
    }
    if let Some(keys) = lookup(ENV_KEYBINDINGS).filter(|v| !v.is_empty()) {
        config.preferences.keybindings = keys;
    }
}

/// Validate a resolved configuration before the session starts. Runs once at
/// load time; failures here keep the process out of the interactive loop.
pub fn validate(config: &Config) -> Result<()> {
    if config.repository.is_empty() {
        return Err(SurgeError::InvalidConfig("repository is required".into()));
    }
    if config.groups.is_empty() {
        return Err(SurgeError::InvalidConfig(
            "at least one group is required".into(),
        ));
    }
    validate_groups(&config.groups)
}

fn validate_groups(groups: &[Group]) -> Result<()> {
    let mut sibling_ids = HashSet::new();
    for group in groups {
        if group.id.is_empty() {
            return Err(SurgeError::InvalidConfig(format!(
                "group {:?} has an empty id",
                group.name
            )));
        }
        if group.name.is_empty() {
            return Err(SurgeError::InvalidConfig(format!(
                "group {:?} has an empty name",
                group.id
            )));
        }
        if !sibling_ids.insert(group.id.as_str()) {
            return Err(SurgeError::InvalidConfig(format!(
                "duplicate sibling group id {:?}",
                group.id
            )));
        }
        for pattern in group.workflow_patterns.iter().chain(group.jobs.iter()) {
            Regex::new(pattern).map_err(|err| {
                SurgeError::InvalidConfig(format!(
                    "invalid pattern {:?} in group {:?}: {err}",
                    pattern, group.id
                ))
            })?;
        }
        validate_groups(&group.groups)?;
    }
    Ok(())
}

/// Persist a configuration back to its origin document (pin write-back).
/// Atomic via temp-file rename.
pub fn save(config: &Config) -> Result<()> {
    let path = config
        .source
        .path
        .as_ref()
        .ok_or_else(|| SurgeError::Other("configuration has no backing file".into()))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let yaml = serde_yaml::to_string(config)?;
    let temp = path.with_extension("tmp");
    let mut file = fs::File::create(&temp)?;
    file.write_all(yaml.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn group(id: &str) -> Group {
        Group {
            id: id.into(),
            name: id.to_uppercase(),
            ..Group::default()
        }
    }

    fn base_config() -> Config {
        Config {
            repository: "acme/base".into(),
            preferences: Preferences {
                refresh_interval: 30,
                theme: "dark".into(),
                keybindings: String::new(),
                custom_settings: [("editor".to_string(), "vi".to_string())].into(),
            },
            groups: vec![group("services")],
            ..Config::default()
        }
    }

    #[test]
    fn test_merge_preferences_is_field_level() {
        let mut overlay = Config::default();
        overlay.preferences.theme = "light".into();

        let merged = merge(base_config(), overlay);
        // Only theme overridden; the unset interval does not clobber.
        assert_eq!(merged.preferences.theme, "light");
        assert_eq!(merged.preferences.refresh_interval, 30);
        assert_eq!(merged.repository, "acme/base");
    }

    #[test]
    fn test_merge_custom_settings_adds_keys() {
        let mut overlay = Config::default();
        overlay
            .preferences
            .custom_settings
            .insert("pager".into(), "less".into());

        let merged = merge(base_config(), overlay);
        assert_eq!(merged.preferences.custom_settings.len(), 2);
        assert_eq!(
            merged.preferences.custom_settings.get("editor"),
            Some(&"vi".to_string())
        );
        assert_eq!(
            merged.preferences.custom_settings.get("pager"),
            Some(&"less".to_string())
        );
    }

    #[test]
    fn test_merge_groups_replace_wholesale() {
        let mut overlay = Config::default();
        overlay.groups = vec![group("infra"), group("tools")];
        overlay.source.path = Some(PathBuf::from("overlay.yml"));

        let merged = merge(base_config(), overlay);
        assert_eq!(merged.groups.len(), 2);
        assert_eq!(merged.groups[0].id, "infra");
        // Group ownership moves to the overriding document.
        assert_eq!(merged.source.path.as_deref(), Some(Path::new("overlay.yml")));
    }

    #[test]
    fn test_merge_without_groups_keeps_base_tree() {
        let mut overlay = Config::default();
        overlay.repository = "acme/fork".into();

        let merged = merge(base_config(), overlay);
        assert_eq!(merged.repository, "acme/fork");
        assert_eq!(merged.groups.len(), 1);
        assert_eq!(merged.groups[0].id, "services");
    }

    #[test]
    fn test_env_overrides_beat_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_REPOSITORY, "acme/override"),
            (ENV_REFRESH_INTERVAL, "5"),
            (ENV_THEME, "light"),
        ]
        .into();

        let mut config = base_config();
        apply_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.repository, "acme/override");
        assert_eq!(config.preferences.refresh_interval, 5);
        assert_eq!(config.preferences.theme, "light");
        // Untouched by the environment.
        assert_eq!(
            config.preferences.custom_settings.get("editor"),
            Some(&"vi".to_string())
        );
    }

    #[test]
    fn test_env_bad_interval_ignored() {
        let mut config = base_config();
        apply_overrides(&mut config, |key| {
            (key == ENV_REFRESH_INTERVAL).then(|| "soon".to_string())
        });
        assert_eq!(config.preferences.refresh_interval, 30);
    }

    #[test]
    fn test_merge_tiers_skips_unparsable_document() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("base.yml");
        let bad = dir.path().join("broken.yml");
        fs::write(&good, "repository: acme/base\ngroups:\n  - id: g\n    name: G\n").unwrap();
        fs::write(&bad, "repository: [unterminated").unwrap();

        let merged = merge_tiers(&[
            (good.clone(), ConfigTier::Repository),
            (bad, ConfigTier::Local),
        ])
        .unwrap();
        assert_eq!(merged.repository, "acme/base");
        assert_eq!(merged.source.path.as_deref(), Some(good.as_path()));
    }

    #[test]
    fn test_merge_tiers_empty_chain_is_no_config() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yml");
        let err = merge_tiers(&[(missing, ConfigTier::Repository)]).unwrap_err();
        assert!(matches!(err, SurgeError::NoConfig));
    }

    #[test]
    fn test_explicit_path_is_sole_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("explicit.yml");
        fs::write(&path, "repository: acme/solo\ngroups:\n  - id: g\n    name: G\n").unwrap();

        let config = load_document(&path, ConfigTier::Explicit).unwrap();
        assert_eq!(config.repository, "acme/solo");
        assert_eq!(config.source.tier, ConfigTier::Explicit);
    }

    #[test]
    fn test_validate_rejects_missing_repository() {
        let mut config = base_config();
        config.repository.clear();
        assert!(matches!(
            validate(&config),
            Err(SurgeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_groups() {
        let mut config = base_config();
        config.groups.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_nested_empty_id() {
        let mut config = base_config();
        config.groups[0].groups.push(Group {
            name: "Nameless".into(),
            ..Group::default()
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_sibling_ids() {
        let mut config = base_config();
        config.groups.push(group("services"));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = base_config();
        config.groups[0].workflow_patterns.push("deploy-(".into());
        assert!(validate(&config).is_err());

        let mut config = base_config();
        config.groups[0].jobs.push("build-[".into());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_save_round_trips_pins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");

        let mut config = base_config();
        config.source.path = Some(path.clone());
        config.groups[0].workflows.push("deploy.yml".into());
        config.groups[0].pinned_workflows.push("deploy.yml".into());
        save(&config).unwrap();

        let reloaded = load_document(&path, ConfigTier::Repository).unwrap();
        assert_eq!(reloaded.groups[0].pinned_workflows, vec!["deploy.yml"]);
        // No stray temp file left behind.
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_save_without_origin_fails() {
        let config = base_config();
        assert!(save(&config).is_err());
    }
}
