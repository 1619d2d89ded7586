#![forbid(unsafe_code)]

use crate::error::LoadError;
use crate::resource::{Page, Resource};
use crate::source::DataSource;
use crate::tracker::IssueTracker;
use eb_core::model::{
    ConsolidatedErrors, CreatedIssue, ErrorAnalyses, IssueStates, MetaSummary, RawErrorEvent,
    RepoRecord, ServiceRecord,
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// One load's raw collections. Never patched in place; a reload builds a new one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub page: Option<Page>,
    pub services: Vec<ServiceRecord>,
    pub repos: Vec<RepoRecord>,
    pub meta: MetaSummary,
    pub errors: Vec<RawErrorEvent>,
    pub consolidated: ConsolidatedErrors,
    pub analyses: ErrorAnalyses,
    pub created_issues: Vec<CreatedIssue>,
    pub issue_states: IssueStates,
    /// Optional documents that failed and were replaced by empty data.
    pub degraded: Vec<Resource>,
}

impl Snapshot {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

async fn fetch_for<T: DeserializeOwned + Default>(
    source: &DataSource,
    page: Page,
    resource: Resource,
) -> Result<T, LoadError> {
    if !page.uses(resource) {
        return Ok(T::default());
    }
    source.fetch(resource).await
}

fn settle<T: Default>(
    page: Page,
    resource: Resource,
    outcome: Result<T, LoadError>,
    degraded: &mut Vec<Resource>,
) -> Result<T, LoadError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(err) if page.is_required(resource) => Err(err),
        Err(err) => {
            warn!(%resource, error = %err, "optional resource unavailable; using empty data");
            degraded.push(resource);
            Ok(T::default())
        }
    }
}

/// Fetches every document `page` uses concurrently. The first required failure (in
/// declaration order) is returned; optional failures only mark the snapshot degraded.
pub async fn load_snapshot(
    source: &DataSource,
    page: Page,
    tracker: Option<&IssueTracker>,
) -> Result<Snapshot, LoadError> {
    let states = async {
        match tracker {
            Some(tracker) if page.wants_issue_states() => tracker.fetch_states().await,
            _ => IssueStates::new(),
        }
    };
    let (services, repos, meta, errors, consolidated, analyses, created_issues, issue_states) = tokio::join!(
        fetch_for::<Vec<ServiceRecord>>(source, page, Resource::Services),
        fetch_for::<Vec<RepoRecord>>(source, page, Resource::Repos),
        fetch_for::<MetaSummary>(source, page, Resource::Meta),
        fetch_for::<Vec<RawErrorEvent>>(source, page, Resource::Errors),
        fetch_for::<ConsolidatedErrors>(source, page, Resource::ConsolidatedErrors),
        fetch_for::<ErrorAnalyses>(source, page, Resource::ErrorAnalyses),
        fetch_for::<Vec<CreatedIssue>>(source, page, Resource::CreatedIssues),
        states,
    );

    let mut degraded = Vec::new();
    let snapshot = Snapshot {
        page: Some(page),
        services: settle(page, Resource::Services, services, &mut degraded)?,
        repos: settle(page, Resource::Repos, repos, &mut degraded)?,
        meta: settle(page, Resource::Meta, meta, &mut degraded)?,
        errors: settle(page, Resource::Errors, errors, &mut degraded)?,
        consolidated: settle(page, Resource::ConsolidatedErrors, consolidated, &mut degraded)?,
        analyses: settle(page, Resource::ErrorAnalyses, analyses, &mut degraded)?,
        created_issues: settle(page, Resource::CreatedIssues, created_issues, &mut degraded)?,
        issue_states,
        degraded,
    };
    info!(
        source = %source.describe(),
        ?page,
        services = snapshot.services.len(),
        groups = snapshot.consolidated.len(),
        events = snapshot.errors.len(),
        degraded = snapshot.degraded.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
