// Group catalog navigation.
// Resolves id paths against the live tree, derives visible rows, and
// manages pin membership. Paths are ids re-resolved on every use, never
// cached references into the tree.

use crate::config::{Config, Group};
use crate::error::{Result, SurgeError};

/// A workflow reference within a group, de-duplicated by file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRef {
    pub file: String,
    pub display: String,
    pub pinned: bool,
}

/// One visible row in the group browser. Tagged so every consumer switches
/// on the kind instead of downcasting an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRow {
    GroupRef { id: String, name: String },
    WorkflowRef { file: String, display: String, pinned: bool },
}

impl ListRow {
    /// Text the panel filter matches against.
    pub fn label(&self) -> &str {
        match self {
            ListRow::GroupRef { name, .. } => name,
            ListRow::WorkflowRef { display, .. } => display,
        }
    }
}

/// A pinned workflow flattened out of the tree, with its breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedEntry {
    /// Group names from root to the owning group.
    pub breadcrumb: Vec<String>,
    /// Group ids from root to the owning group.
    pub group_path: Vec<String>,
    pub file: String,
    pub display: String,
}

/// Result of resolving an id path against the catalog. `complete` is false
/// when some id failed to resolve; `groups` then holds the matched prefix.
#[derive(Debug, Clone)]
pub struct ResolvedPath<'a> {
    pub groups: Vec<&'a Group>,
    pub complete: bool,
}

impl<'a> ResolvedPath<'a> {
    /// The innermost resolved group, if any.
    pub fn last(&self) -> Option<&'a Group> {
        self.groups.last().copied()
    }

    /// Ids of the resolved prefix, suitable for persistence.
    pub fn ids(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.id.clone()).collect()
    }

    /// Names of the resolved prefix, for breadcrumb display.
    pub fn names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }
}

/// Walk an id path down from the roots. Stops at the first id with no
/// sibling match.
pub fn resolve_group_path<'a>(roots: &'a [Group], ids: &[String]) -> ResolvedPath<'a> {
    let mut groups = Vec::with_capacity(ids.len());
    let mut level = roots;
    for id in ids {
        match level.iter().find(|g| g.id == *id) {
            Some(group) => {
                groups.push(group);
                level = &group.groups;
            }
            None => return ResolvedPath {
                groups,
                complete: false,
            },
        }
    }
    ResolvedPath {
        groups,
        complete: true,
    }
}

/// Mutable lookup of the group at an id path. None unless the whole path
/// resolves.
pub fn group_at_path_mut<'a>(roots: &'a mut [Group], ids: &[String]) -> Option<&'a mut Group> {
    let (first, rest) = ids.split_first()?;
    let group = roots.iter_mut().find(|g| g.id == *first)?;
    if rest.is_empty() {
        Some(group)
    } else {
        group_at_path_mut(&mut group.groups, rest)
    }
}

/// Distinct workflow references of a group. A bare filename and a def for
/// the same file collapse into one entry, the def's display name winning.
pub fn workflow_refs(group: &Group) -> Vec<WorkflowRef> {
    let mut refs: Vec<WorkflowRef> = Vec::new();
    for def in &group.workflow_defs {
        if refs.iter().any(|r| r.file == def.file) {
            continue;
        }
        refs.push(WorkflowRef {
            file: def.file.clone(),
            display: def.name.clone().unwrap_or_else(|| def.file.clone()),
            pinned: group.pinned_workflows.contains(&def.file),
        });
    }
    for file in &group.workflows {
        if refs.iter().any(|r| r.file == *file) {
            continue;
        }
        refs.push(WorkflowRef {
            file: file.clone(),
            display: file.clone(),
            pinned: group.pinned_workflows.contains(file),
        });
    }
    refs
}

/// Visible rows for a group: pinned workflows, then unpinned, then
/// subgroups. Display-ordering policy only; the tree itself is untouched.
pub fn group_rows(group: &Group) -> Vec<ListRow> {
    let refs = workflow_refs(group);
    let workflow_row = |r: &WorkflowRef| ListRow::WorkflowRef {
        file: r.file.clone(),
        display: r.display.clone(),
        pinned: r.pinned,
    };

    let mut rows: Vec<ListRow> = refs.iter().filter(|r| r.pinned).map(workflow_row).collect();
    rows.extend(refs.iter().filter(|r| !r.pinned).map(workflow_row));
    rows.extend(group.groups.iter().map(|g| ListRow::GroupRef {
        id: g.id.clone(),
        name: g.name.clone(),
    }));
    rows
}

/// Rows for the root level: the root groups themselves.
pub fn root_rows(config: &Config) -> Vec<ListRow> {
    config
        .groups
        .iter()
        .map(|g| ListRow::GroupRef {
            id: g.id.clone(),
            name: g.name.clone(),
        })
        .collect()
}

/// Flip pin membership of a workflow in the group at `ids`. Returns the new
/// pinned state.
pub fn toggle_pin(config: &mut Config, ids: &[String], file: &str) -> Result<bool> {
    let group = group_at_path_mut(&mut config.groups, ids)
        .ok_or_else(|| SurgeError::NotFound(format!("group path {ids:?}")))?;
    if let Some(pos) = group.pinned_workflows.iter().position(|w| w == file) {
        group.pinned_workflows.remove(pos);
        Ok(false)
    } else {
        group.pinned_workflows.push(file.to_string());
        Ok(true)
    }
}

/// All pinned workflows in depth-first order, each with the breadcrumb of
/// its owning group.
pub fn list_pinned(config: &Config) -> Vec<PinnedEntry> {
    let mut entries = Vec::new();
    let mut names = Vec::new();
    let mut ids = Vec::new();
    for group in &config.groups {
        collect_pinned(group, &mut names, &mut ids, &mut entries);
    }
    entries
}

fn collect_pinned(
    group: &Group,
    names: &mut Vec<String>,
    ids: &mut Vec<String>,
    entries: &mut Vec<PinnedEntry>,
) {
    names.push(group.name.clone());
    ids.push(group.id.clone());

    let refs = workflow_refs(group);
    for file in &group.pinned_workflows {
        let display = refs
            .iter()
            .find(|r| r.file == *file)
            .map(|r| r.display.clone())
            .unwrap_or_else(|| file.clone());
        entries.push(PinnedEntry {
            breadcrumb: names.clone(),
            group_path: ids.clone(),
            file: file.clone(),
            display,
        });
    }
    for child in &group.groups {
        collect_pinned(child, names, ids, entries);
    }

    names.pop();
    ids.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkflowDef;

    fn sample_config() -> Config {
        Config {
            repository: "acme/platform".into(),
            groups: vec![
                Group {
                    id: "services".into(),
                    name: "Services".into(),
                    groups: vec![Group {
                        id: "backend".into(),
                        name: "Backend".into(),
                        workflows: vec!["deploy.yml".into()],
                        ..Group::default()
                    }],
                    ..Group::default()
                },
                Group {
                    id: "infra".into(),
                    name: "Infra".into(),
                    workflows: vec!["terraform.yml".into()],
                    ..Group::default()
                },
            ],
            ..Config::default()
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_resolve_full_path() {
        let config = sample_config();
        let resolved = resolve_group_path(&config.groups, &ids(&["services", "backend"]));
        assert!(resolved.complete);
        assert_eq!(resolved.names(), vec!["Services", "Backend"]);
        assert_eq!(resolved.last().unwrap().id, "backend");
    }

    #[test]
    fn test_resolve_partial_path_flags_not_found() {
        let config = sample_config();
        let resolved = resolve_group_path(&config.groups, &ids(&["services", "nope"]));
        assert!(!resolved.complete);
        assert_eq!(resolved.ids(), vec!["services"]);
    }

    #[test]
    fn test_resolve_round_trips_through_ids() {
        let config = sample_config();
        let first = resolve_group_path(&config.groups, &ids(&["services", "backend"]));
        let again = resolve_group_path(&config.groups, &first.ids());
        assert!(again.complete);
        assert_eq!(again.ids(), first.ids());
    }

    #[test]
    fn test_workflow_refs_dedup_prefers_display_name() {
        let group = Group {
            id: "g".into(),
            name: "G".into(),
            workflows: vec!["ci.yml".into(), "release.yml".into()],
            workflow_defs: vec![WorkflowDef {
                file: "ci.yml".into(),
                name: Some("Continuous Integration".into()),
            }],
            ..Group::default()
        };
        let refs = workflow_refs(&group);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].display, "Continuous Integration");
        assert_eq!(refs[1].file, "release.yml");
    }

    #[test]
    fn test_group_rows_order_pinned_unpinned_subgroups() {
        let group = Group {
            id: "g".into(),
            name: "G".into(),
            workflows: vec!["a.yml".into(), "b.yml".into()],
            pinned_workflows: vec!["b.yml".into()],
            groups: vec![Group {
                id: "child".into(),
                name: "Child".into(),
                ..Group::default()
            }],
            ..Group::default()
        };
        let rows = group_rows(&group);
        assert_eq!(rows.len(), 3);
        assert!(matches!(&rows[0], ListRow::WorkflowRef { file, pinned: true, .. } if file == "b.yml"));
        assert!(matches!(&rows[1], ListRow::WorkflowRef { file, pinned: false, .. } if file == "a.yml"));
        assert!(matches!(&rows[2], ListRow::GroupRef { id, .. } if id == "child"));
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut config = sample_config();
        let path = ids(&["services", "backend"]);
        let original = config.groups[0].groups[0].pinned_workflows.clone();

        assert!(toggle_pin(&mut config, &path, "deploy.yml").unwrap());
        assert!(!toggle_pin(&mut config, &path, "deploy.yml").unwrap());
        assert_eq!(config.groups[0].groups[0].pinned_workflows, original);
    }

    #[test]
    fn test_toggle_pin_unresolved_path_fails() {
        let mut config = sample_config();
        assert!(toggle_pin(&mut config, &ids(&["services", "nope"]), "x.yml").is_err());
    }

    #[test]
    fn test_list_pinned_breadcrumb_uses_names() {
        let mut config = sample_config();
        toggle_pin(&mut config, &ids(&["services", "backend"]), "deploy.yml").unwrap();

        let pinned = list_pinned(&config);
        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].breadcrumb, vec!["Services", "Backend"]);
        assert_eq!(pinned[0].group_path, vec!["services", "backend"]);
        assert_eq!(pinned[0].file, "deploy.yml");
    }
}
