#![forbid(unsafe_code)]

//! Read-only view of the issue tracker. Lookups are best-effort: the dashboard renders
//! without live states when the tracker is unreachable.

use eb_core::model::{IssueState, IssueStates, IssueStatus};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_ISSUE_REPO: &str = "mbrt26/indunnova-dashboard";

/// Unauthenticated listing; only the first page is consulted.
const PER_PAGE: u32 = 100;

#[derive(Clone, Debug)]
pub struct IssueTracker {
    client: Client,
    api_base: String,
    repo: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    state: IssueStatus,
    #[serde(default)]
    closed_at: Option<String>,
    #[serde(default)]
    title: String,
}

impl IssueTracker {
    pub fn new(client: Client, api_base: &str, repo: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo: repo.trim_matches('/').to_string(),
        }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/issues?state=all&per_page={PER_PAGE}",
            self.api_base, self.repo
        )
    }

    /// Never fails. Transport, status and decode problems are logged and yield an empty map.
    pub async fn fetch_states(&self) -> IssueStates {
        let url = self.issues_url();
        debug!(%url, "fetching issue states");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "issue tracker unreachable");
                return IssueStates::new();
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), "issue tracker returned an error");
            return IssueStates::new();
        }
        match response.bytes().await {
            Ok(body) => parse_issue_states(&body),
            Err(err) => {
                warn!(error = %err, "issue tracker response truncated");
                IssueStates::new()
            }
        }
    }
}

/// Issue listing JSON to `number -> state`. Anything that is not a list of issues yields an
/// empty map; individual malformed entries are skipped.
pub fn parse_issue_states(body: &[u8]) -> IssueStates {
    let entries: Vec<serde_json::Value> = match serde_json::from_slice(body) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(error = %err, "issue tracker response is not a list");
            return IssueStates::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawIssue>(entry).ok())
        .map(|issue| {
            (
                issue.number,
                IssueState {
                    state: issue.state,
                    closed_at: issue.closed_at,
                    title: issue.title,
                },
            )
        })
        .collect()
}
