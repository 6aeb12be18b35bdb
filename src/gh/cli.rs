// gh subprocess data source.
// Shells out to the gh CLI with time-bounded calls and typed JSON parsing.
// Authentication is entirely gh's concern.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{Result, SurgeError};

use super::types::{Run, sort_runs};

/// Default time bound for a single gh invocation.
pub const GH_TIMEOUT: Duration = Duration::from_secs(20);

/// JSON fields requested from `gh run list`.
const RUN_FIELDS: &str = "databaseId,displayTitle,number,status,conclusion,headBranch,event,createdAt,url";

/// What `open_in_browser` should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseTarget {
    Workflow(String),
    Run(u64),
}

/// Supplier of run records and repository metadata. The session controller
/// only sees this trait, so tests can substitute a canned source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Recent runs of a workflow, newest first, ties broken by higher id.
    async fn list_runs(&self, workflow: &str, limit: u32) -> Result<Vec<Run>>;

    /// Open a workflow or run in the browser. Side-effecting; success or
    /// failure is all the caller learns.
    async fn open_in_browser(&self, target: &BrowseTarget) -> Result<()>;

    /// Whether a repository exists (and is visible to the gh user).
    async fn repository_exists(&self, repo: &str) -> Result<bool>;

    /// Workflow files defined in a repository, as bare filenames.
    async fn list_workflow_files(&self, repo: &str) -> Result<Vec<String>>;
}

/// Data source backed by the gh command-line tool.
pub struct GhCli {
    repo: String,
    timeout: Duration,
}

impl GhCli {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            timeout: GH_TIMEOUT,
        }
    }

    /// Run gh with the given arguments, returning stdout.
    async fn run_gh(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(?args, "invoking gh");
        run_command("gh", args, self.timeout).await
    }
}

/// Run a subprocess with a time bound, returning stdout. A timeout is
/// reported distinctly from a not-found result.
async fn run_command(program: &str, args: &[&str], bound: Duration) -> Result<String> {
    let output = timeout(bound, Command::new(program).args(args).output())
        .await
        .map_err(|_| SurgeError::Timeout(bound.as_secs()))?
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SurgeError::Gh(format!("{program} executable not found on PATH"))
            } else {
                SurgeError::Io(err)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_not_found(&stderr) {
            return Err(SurgeError::NotFound(stderr));
        }
        return Err(SurgeError::Gh(stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// gh reports missing resources with an HTTP 404 or a "could not resolve"
/// message depending on the subcommand.
fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("http 404") || lower.contains("could not resolve") || lower.contains("not found")
}

#[derive(Deserialize)]
struct WorkflowFileEntry {
    path: String,
}

#[async_trait]
impl DataSource for GhCli {
    async fn list_runs(&self, workflow: &str, limit: u32) -> Result<Vec<Run>> {
        let limit = limit.to_string();
        let stdout = self
            .run_gh(&[
                "run",
                "list",
                "--repo",
                &self.repo,
                "--workflow",
                workflow,
                "--limit",
                &limit,
                "--json",
                RUN_FIELDS,
            ])
            .await?;
        let mut runs: Vec<Run> = serde_json::from_str(&stdout)?;
        sort_runs(&mut runs);
        Ok(runs)
    }

    async fn open_in_browser(&self, target: &BrowseTarget) -> Result<()> {
        match target {
            BrowseTarget::Workflow(file) => {
                self.run_gh(&["workflow", "view", file, "--repo", &self.repo, "--web"])
                    .await?;
            }
            BrowseTarget::Run(id) => {
                let id = id.to_string();
                self.run_gh(&["run", "view", &id, "--repo", &self.repo, "--web"])
                    .await?;
            }
        }
        Ok(())
    }

    async fn repository_exists(&self, repo: &str) -> Result<bool> {
        match self.run_gh(&["repo", "view", repo, "--json", "name"]).await {
            Ok(_) => Ok(true),
            Err(SurgeError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn list_workflow_files(&self, repo: &str) -> Result<Vec<String>> {
        let stdout = self
            .run_gh(&["workflow", "list", "--repo", repo, "--json", "path"])
            .await?;
        let entries: Vec<WorkflowFileEntry> = serde_json::from_str(&stdout)?;
        Ok(entries
            .into_iter()
            .map(|e| {
                e.path
                    .rsplit('/')
                    .next()
                    .unwrap_or(e.path.as_str())
                    .to_string()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found("GraphQL: Could not resolve to a Repository"));
        assert!(is_not_found("HTTP 404: Not Found (https://api.github.com)"));
        assert!(!is_not_found("HTTP 500: oops"));
    }

    #[test]
    fn test_workflow_file_entry_strips_directory() {
        let payload = r#"[{"path": ".github/workflows/deploy.yml"}, {"path": "ci.yml"}]"#;
        let entries: Vec<WorkflowFileEntry> = serde_json::from_str(payload).unwrap();
        let files: Vec<String> = entries
            .into_iter()
            .map(|e| {
                e.path
                    .rsplit('/')
                    .next()
                    .unwrap_or(e.path.as_str())
                    .to_string()
            })
            .collect();
        assert_eq!(files, vec!["deploy.yml", "ci.yml"]);
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_error() {
        let err = run_command("sleep", &["5"], Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, SurgeError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_executable_is_reported() {
        let err = run_command("surge-no-such-binary", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SurgeError::Gh(_)));
    }
}
