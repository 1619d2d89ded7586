#![forbid(unsafe_code)]

//! Snapshot records as emitted by the data pipeline.
//!
//! Every optional field defaults on decode so that a record with gaps still loads; display code
//! substitutes neutral values (`--`, `0`, empty list) instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const HEALTHY_STATUS: &str = "True";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub repo_name: Option<String>,
    #[serde(default)]
    pub errors: Option<ErrorSummary>,
    #[serde(default)]
    pub deployments: Option<DeploymentSummary>,
    #[serde(default)]
    pub interactions: Option<Interactions>,
    #[serde(default)]
    pub metrics: Option<RequestMetrics>,
}

impl ServiceRecord {
    /// `"True"` is the only healthy signal; an absent status is unhealthy.
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some(HEALTHY_STATUS)
    }

    pub fn errors_7d(&self) -> u64 {
        self.errors.as_ref().map(|e| e.last7d).unwrap_or(0)
    }

    pub fn errors_24h(&self) -> u64 {
        self.errors.as_ref().map(|e| e.last24h).unwrap_or(0)
    }

    pub fn deployments_7d(&self) -> u64 {
        self.deployments.as_ref().map(|d| d.last7d).unwrap_or(0)
    }

    pub fn deployments_24h(&self) -> u64 {
        self.deployments.as_ref().map(|d| d.last24h).unwrap_or(0)
    }

    pub fn last_deployment(&self) -> Option<&str> {
        self.deployments
            .as_ref()
            .and_then(|d| d.last_deployment.as_deref())
    }

    pub fn recent_deployments(&self) -> &[DeploymentRecord] {
        self.deployments
            .as_ref()
            .map(|d| d.recent_deployments.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorSummary {
    pub total: u64,
    pub last24h: u64,
    pub last7d: u64,
    pub recent_errors: Vec<RecentError>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentError {
    pub timestamp: String,
    pub message: String,
    pub severity: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSummary {
    pub total: u64,
    pub last24h: u64,
    pub last7d: u64,
    pub last_deployment: Option<String>,
    pub recent_deployments: Vec<DeploymentRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentRecord {
    pub revision: String,
    pub timestamp: String,
    pub status: String,
}

impl DeploymentRecord {
    pub fn is_ready(&self) -> bool {
        self.status == HEALTHY_STATUS
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Interactions {
    pub requests7d: u64,
    pub requests30d: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestMetrics {
    pub errors5xx: u64,
    pub errors4xx: u64,
    pub avg_latency_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub cloud_run_service: Option<String>,
}

/// Aggregate counters computed upstream. Any counter may be missing; see
/// [`crate::summary::OverviewSummary::resolve`] for the fallback.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaSummary {
    pub last_update: Option<String>,
    pub project: Option<String>,
    pub total_services: Option<u64>,
    pub total_repos: Option<u64>,
    pub healthy_services: Option<u64>,
    pub unhealthy_services: Option<u64>,
    pub total_errors24h: Option<u64>,
    pub total_errors7d: Option<u64>,
    pub total_deployments24h: Option<u64>,
    pub total_deployments7d: Option<u64>,
    pub services_with_errors: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawErrorEvent {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub http_request: Option<HttpRequestInfo>,
    #[serde(default)]
    pub trace: Option<String>,
    #[serde(default)]
    pub span_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpRequestInfo {
    pub method: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub latency: Option<String>,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidatedErrorGroup {
    pub error_type: Option<String>,
    pub sample_message: String,
    pub count: u64,
    pub services: Vec<String>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    pub occurrences: Vec<Occurrence>,
    pub revisions: Option<Vec<String>>,
    pub sample_http: Option<HttpRequestInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Occurrence {
    pub timestamp: String,
    pub service: String,
    pub revision: Option<String>,
    pub http_status: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorAnalysis {
    pub analysis: String,
    pub analyzed_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub hash: String,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Closed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Closed => "closed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IssueState {
    pub state: IssueStatus,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub title: String,
}

/// Fingerprint hash -> group. The hash is opaque and stable across pipeline runs.
pub type ConsolidatedErrors = BTreeMap<String, ConsolidatedErrorGroup>;
pub type ErrorAnalyses = BTreeMap<String, ErrorAnalysis>;
/// Issue number -> live tracker state.
pub type IssueStates = BTreeMap<u64, IssueState>;
