// Fuzzy search over the group catalog.
// Flattens groups and workflows into a corpus and ranks free-text queries
// against it.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::catalog;
use crate::config::{Config, Group};

/// What a search hit points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Group,
    Workflow,
}

/// A ranked search hit. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub kind: ResultKind,
    pub name: String,
    pub description: Option<String>,
    /// Group names for display. For a group hit this is the parent chain;
    /// for a workflow hit it includes the owning group.
    pub breadcrumb: Vec<String>,
    /// Group ids to resolve on commit. For a group hit the target group is
    /// the last element; for a workflow hit this is the owning group's path.
    pub group_path: Vec<String>,
    /// Workflow file for workflow hits.
    pub workflow: Option<String>,
    pub score: i64,
}

struct CorpusEntry {
    kind: ResultKind,
    name: String,
    description: Option<String>,
    breadcrumb: Vec<String>,
    group_path: Vec<String>,
    workflow: Option<String>,
    haystack: String,
}

/// Searchable flattening of the catalog. Rebuilt whenever the group set
/// changes; pin toggles do not invalidate it.
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    matcher: SkimMatcherV2,
}

impl Corpus {
    /// Depth-first index of all root groups and their workflows.
    pub fn index(config: &Config) -> Self {
        let mut entries = Vec::new();
        let mut names = Vec::new();
        let mut ids = Vec::new();
        for group in &config.groups {
            walk(group, &mut names, &mut ids, &mut entries);
        }
        Self {
            entries,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank the corpus against a query. An empty query yields nothing; ties
    /// keep corpus (depth-first) order via the stable sort.
    pub fn query(&self, text: &str) -> Vec<SearchResult> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(i64, &CorpusEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                self.matcher
                    .fuzzy_match(&entry.haystack, &needle)
                    .map(|score| (score, entry))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .map(|(score, entry)| SearchResult {
                kind: entry.kind,
                name: entry.name.clone(),
                description: entry.description.clone(),
                breadcrumb: entry.breadcrumb.clone(),
                group_path: entry.group_path.clone(),
                workflow: entry.workflow.clone(),
                score,
            })
            .collect()
    }
}

fn walk(
    group: &Group,
    names: &mut Vec<String>,
    ids: &mut Vec<String>,
    entries: &mut Vec<CorpusEntry>,
) {
    // The group entry's breadcrumb stops at its parent: selecting it means
    // "navigate into this group".
    let mut haystack = group.name.to_lowercase();
    if let Some(desc) = &group.description {
        haystack.push(' ');
        haystack.push_str(&desc.to_lowercase());
    }
    let mut target_path = ids.clone();
    target_path.push(group.id.clone());
    entries.push(CorpusEntry {
        kind: ResultKind::Group,
        name: group.name.clone(),
        description: group.description.clone(),
        breadcrumb: names.clone(),
        group_path: target_path,
        workflow: None,
        haystack,
    });

    names.push(group.name.clone());
    ids.push(group.id.clone());

    for wf in catalog::workflow_refs(group) {
        let mut haystack = wf.display.to_lowercase();
        if wf.file != wf.display {
            haystack.push(' ');
            haystack.push_str(&wf.file.to_lowercase());
        }
        entries.push(CorpusEntry {
            kind: ResultKind::Workflow,
            name: wf.display,
            description: None,
            breadcrumb: names.clone(),
            group_path: ids.clone(),
            workflow: Some(wf.file),
            haystack,
        });
    }
    for child in &group.groups {
        walk(child, names, ids, entries);
    }

    names.pop();
    ids.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Group, WorkflowDef};

    fn sample_config() -> Config {
        Config {
            repository: "acme/platform".into(),
            groups: vec![
                Group {
                    id: "services".into(),
                    name: "Services".into(),
                    description: Some("Deployable services".into()),
                    groups: vec![Group {
                        id: "backend".into(),
                        name: "Backend".into(),
                        workflows: vec!["deploy.yml".into()],
                        workflow_defs: vec![WorkflowDef {
                            file: "ci.yml".into(),
                            name: Some("Backend CI".into()),
                        }],
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

    #[test]
    fn test_empty_query_returns_nothing() {
        let corpus = Corpus::index(&sample_config());
        assert!(corpus.query("").is_empty());
        assert!(corpus.query("   ").is_empty());
        assert!(!corpus.is_empty());
        // Three groups plus three distinct workflows.
        assert_eq!(corpus.len(), 6);
    }

    #[test]
    fn test_subsequence_matches_workflow_filename() {
        let corpus = Corpus::index(&sample_config());
        // "tfrm" is a case-insensitive subsequence of "terraform.yml".
        let results = corpus.query("TFRM");
        assert!(results
            .iter()
            .any(|r| r.workflow.as_deref() == Some("terraform.yml")));
    }

    #[test]
    fn test_group_breadcrumb_excludes_itself() {
        let corpus = Corpus::index(&sample_config());
        let results = corpus.query("backend");
        let group_hit = results
            .iter()
            .find(|r| r.kind == ResultKind::Group && r.name == "Backend")
            .unwrap();
        assert_eq!(group_hit.breadcrumb, vec!["Services"]);
        assert_eq!(group_hit.group_path, vec!["services", "backend"]);
    }

    #[test]
    fn test_workflow_breadcrumb_includes_owner() {
        let corpus = Corpus::index(&sample_config());
        let results = corpus.query("deploy");
        let wf_hit = results
            .iter()
            .find(|r| r.workflow.as_deref() == Some("deploy.yml"))
            .unwrap();
        assert_eq!(wf_hit.breadcrumb, vec!["Services", "Backend"]);
        assert_eq!(wf_hit.group_path, vec!["services", "backend"]);
    }

    #[test]
    fn test_display_name_is_searchable() {
        let corpus = Corpus::index(&sample_config());
        let results = corpus.query("backend ci");
        assert!(results
            .iter()
            .any(|r| r.workflow.as_deref() == Some("ci.yml")));
    }

    #[test]
    fn test_group_description_is_searchable() {
        let corpus = Corpus::index(&sample_config());
        let results = corpus.query("deployable");
        assert!(results
            .iter()
            .any(|r| r.kind == ResultKind::Group && r.name == "Services"));
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let config = Config {
            repository: "acme/x".into(),
            groups: vec![
                Group {
                    id: "alpha".into(),
                    name: "Same".into(),
                    ..Group::default()
                },
                Group {
                    id: "beta".into(),
                    name: "Same".into(),
                    ..Group::default()
                },
            ],
            ..Config::default()
        };
        let corpus = Corpus::index(&config);
        let results = corpus.query("same");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].group_path, vec!["alpha"]);
        assert_eq!(results[1].group_path, vec!["beta"]);
    }
}
