// Run records returned by the gh command-line tool.
// Mirrors the --json payload shape of `gh run list`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

/// Workflow run conclusion. gh reports an empty string while a run is still
/// in progress; that lands on Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

/// One historical execution of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    #[serde(rename = "databaseId")]
    pub id: u64,
    pub display_title: String,
    pub number: u64,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Sort runs newest first; equal timestamps break toward the higher id.
pub fn sort_runs(runs: &mut [Run]) {
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run(id: u64, secs: i64) -> Run {
        Run {
            id,
            display_title: format!("run {id}"),
            number: id,
            status: RunStatus::Completed,
            conclusion: Some(RunConclusion::Success),
            head_branch: Some("main".into()),
            event: Some("push".into()),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            url: None,
        }
    }

    #[test]
    fn test_parse_gh_run_list_payload() {
        let payload = r#"[
            {
                "databaseId": 42,
                "displayTitle": "Fix login flow",
                "number": 107,
                "status": "completed",
                "conclusion": "failure",
                "headBranch": "fix/login",
                "event": "pull_request",
                "createdAt": "2026-08-01T12:30:00Z",
                "url": "https://github.com/acme/platform/actions/runs/42"
            }
        ]"#;
        let runs: Vec<Run> = serde_json::from_str(payload).unwrap();
        assert_eq!(runs[0].id, 42);
        assert_eq!(runs[0].number, 107);
        assert_eq!(runs[0].status, RunStatus::Completed);
        assert_eq!(runs[0].conclusion, Some(RunConclusion::Failure));
        assert_eq!(runs[0].head_branch.as_deref(), Some("fix/login"));
    }

    #[test]
    fn test_unknown_status_variants_do_not_fail() {
        let payload = r#"[{
            "databaseId": 1,
            "displayTitle": "t",
            "number": 1,
            "status": "some_future_status",
            "conclusion": "",
            "createdAt": "2026-08-01T00:00:00Z"
        }]"#;
        let runs: Vec<Run> = serde_json::from_str(payload).unwrap();
        assert_eq!(runs[0].status, RunStatus::Unknown);
        assert_eq!(runs[0].conclusion, Some(RunConclusion::Unknown));
    }

    #[test]
    fn test_sort_runs_newest_first_id_tiebreak() {
        let mut runs = vec![run(3, 100), run(5, 200), run(4, 200)];
        sort_runs(&mut runs);
        let order: Vec<u64> = runs.iter().map(|r| r.id).collect();
        // Same timestamp: higher id first.
        assert_eq!(order, vec![5, 4, 3]);
    }
}
