// Configuration document types.
// Defines the group catalog tree and user preferences as loaded from YAML.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which tier a configuration document came from. Provenance only; merge
/// behavior never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigTier {
    /// Repository-shared default checked into the repo (.surge.yml).
    #[default]
    Repository,
    /// User-global file in the platform config directory.
    User,
    /// Project-local user overrides (.surge.local.yml).
    Local,
    /// Explicit path given on the command line.
    Explicit,
}

impl ConfigTier {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigTier::Repository => "repository",
            ConfigTier::User => "user",
            ConfigTier::Local => "local",
            ConfigTier::Explicit => "explicit",
        }
    }
}

/// Where a configuration (and in particular its group tree) was loaded from.
/// Pin toggles are written back to `path`.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub tier: ConfigTier,
    pub path: Option<PathBuf>,
}

/// User preferences. Zero/empty fields are "unset" for merge purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Auto-refresh interval in seconds. Zero disables auto-refresh.
    pub refresh_interval: u64,
    pub theme: String,
    pub keybindings: String,
    pub custom_settings: BTreeMap<String, String>,
}

/// Workflow reference with an optional display name override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDef {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A node in the group tree. A group may hold workflows and child groups at
/// the same time; there is no depth limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    /// Unique among siblings, immutable once loaded.
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Bare workflow filenames.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workflows: Vec<String>,
    /// Workflow references carrying a display name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workflow_defs: Vec<WorkflowDef>,
    /// Regex patterns matching workflow files.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workflow_patterns: Vec<String>,
    /// Regex patterns selecting jobs of interest within matched runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    /// Subset of this group's workflow references promoted to the shortcut
    /// list.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pinned_workflows: Vec<String>,
}

/// Root configuration. Created once at startup by the resolver, mutated in
/// place on pin toggles, never destroyed during a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Repository identifier in owner/name form.
    pub repository: String,
    pub preferences: Preferences,
    pub groups: Vec<Group>,
    #[serde(skip)]
    pub source: ConfigSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let yaml = r#"
repository: acme/platform
preferences:
  refreshInterval: 30
  theme: dark
groups:
  - id: services
    name: Services
    groups:
      - id: backend
        name: Backend
        workflows: [deploy.yml]
        workflowDefs:
          - file: ci.yml
            name: CI
        pinnedWorkflows: [deploy.yml]
  - id: infra
    name: Infra
    workflows: [terraform.yml]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.repository, "acme/platform");
        assert_eq!(config.preferences.refresh_interval, 30);
        assert_eq!(config.groups.len(), 2);

        let backend = &config.groups[0].groups[0];
        assert_eq!(backend.id, "backend");
        assert_eq!(backend.workflows, vec!["deploy.yml"]);
        assert_eq!(backend.workflow_defs[0].name.as_deref(), Some("CI"));
        assert_eq!(backend.pinned_workflows, vec!["deploy.yml"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let config: Config = serde_yaml::from_str("repository: a/b").unwrap();
        assert!(config.groups.is_empty());
        assert_eq!(config.preferences, Preferences::default());
        assert!(config.source.path.is_none());
    }

    #[test]
    fn test_serialize_skips_empty_collections() {
        let config = Config {
            repository: "a/b".into(),
            groups: vec![Group {
                id: "g".into(),
                name: "G".into(),
                ..Group::default()
            }],
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("pinnedWorkflows"));
        assert!(!yaml.contains("workflowPatterns"));
        assert!(!yaml.contains("source"));
    }
}
