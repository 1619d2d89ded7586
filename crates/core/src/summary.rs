#![forbid(unsafe_code)]

//! Headline counters and grouped views derived from a snapshot.

use crate::model::{
    ConsolidatedErrors, CreatedIssue, DeploymentRecord, ErrorAnalyses, MetaSummary,
    RawErrorEvent, RepoRecord, ServiceRecord,
};
use crate::priority::{PriorityBucket, PriorityLevel};
use crate::reconcile::ReconciledGroup;
use crate::sort::{compare_names, sort_deployments};
use crate::timeutil::parse_optional;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

pub const RECENT_DEPLOYMENTS_LIMIT: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OverviewSummary {
    pub total_services: u64,
    pub healthy_services: u64,
    pub unhealthy_services: u64,
    pub total_repos: u64,
    pub total_errors_24h: u64,
    pub total_errors_7d: u64,
    pub total_deployments_24h: u64,
    pub total_deployments_7d: u64,
    pub services_with_errors: u64,
}

impl OverviewSummary {
    /// Counts straight from the collections.
    pub fn compute(services: &[ServiceRecord], repos: &[RepoRecord]) -> Self {
        let healthy = services.iter().filter(|s| s.is_healthy()).count() as u64;
        Self {
            total_services: services.len() as u64,
            healthy_services: healthy,
            unhealthy_services: services.len() as u64 - healthy,
            total_repos: repos.len() as u64,
            total_errors_24h: services.iter().map(ServiceRecord::errors_24h).sum(),
            total_errors_7d: services.iter().map(ServiceRecord::errors_7d).sum(),
            total_deployments_24h: services.iter().map(ServiceRecord::deployments_24h).sum(),
            total_deployments_7d: services.iter().map(ServiceRecord::deployments_7d).sum(),
            services_with_errors: services.iter().filter(|s| s.errors_7d() > 0).count() as u64,
        }
    }

    /// Upstream counters win when present and non-zero; anything else falls back to
    /// [`OverviewSummary::compute`].
    pub fn resolve(
        meta: Option<&MetaSummary>,
        services: &[ServiceRecord],
        repos: &[RepoRecord],
    ) -> Self {
        let local = Self::compute(services, repos);
        let Some(meta) = meta else {
            return local;
        };
        let pick = |upstream: Option<u64>, fallback: u64| {
            upstream.filter(|v| *v > 0).unwrap_or(fallback)
        };
        Self {
            total_services: pick(meta.total_services, local.total_services),
            healthy_services: pick(meta.healthy_services, local.healthy_services),
            unhealthy_services: pick(meta.unhealthy_services, local.unhealthy_services),
            total_repos: pick(meta.total_repos, local.total_repos),
            total_errors_24h: pick(meta.total_errors24h, local.total_errors_24h),
            total_errors_7d: pick(meta.total_errors7d, local.total_errors_7d),
            total_deployments_24h: pick(meta.total_deployments24h, local.total_deployments_24h),
            total_deployments_7d: pick(meta.total_deployments7d, local.total_deployments_7d),
            services_with_errors: pick(meta.services_with_errors, local.services_with_errors),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorsSummary {
    pub total_errors: u64,
    pub total_groups: usize,
    pub affected_services: usize,
    pub top_service: Option<String>,
}

impl ErrorsSummary {
    pub fn from_groups(groups: &ConsolidatedErrors) -> Self {
        let mut per_service: BTreeMap<&str, u64> = BTreeMap::new();
        for group in groups.values() {
            for service in &group.services {
                *per_service.entry(service.as_str()).or_default() += group.count;
            }
        }
        // Ties go to the alphabetically first service.
        let top_service = per_service
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.to_string());
        Self {
            total_errors: groups.values().map(|g| g.count).sum(),
            total_groups: groups.len(),
            affected_services: per_service.len(),
            top_service,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IssuesSummary {
    pub total_groups: usize,
    pub high_priority: usize,
    pub issues_created: usize,
    pub analyzed: usize,
}

impl IssuesSummary {
    pub fn compute(
        groups: &ConsolidatedErrors,
        created: &[CreatedIssue],
        analyses: &ErrorAnalyses,
    ) -> Self {
        Self {
            total_groups: groups.len(),
            high_priority: groups
                .values()
                .filter(|g| PriorityBucket::High.contains(g.count))
                .count(),
            issues_created: created.len(),
            analyzed: analyses.len(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceBundle<'g, 'a> {
    pub service: String,
    pub total_count: u64,
    pub critical: usize,
    pub groups: Vec<&'g ReconciledGroup<'a>>,
}

/// A group shows up under every service it touches. Bundles are ordered by total count,
/// groups inside a bundle by their own count.
pub fn group_by_service<'g, 'a>(groups: &[&'g ReconciledGroup<'a>]) -> Vec<ServiceBundle<'g, 'a>> {
    let mut by_service: BTreeMap<&str, ServiceBundle<'g, 'a>> = BTreeMap::new();
    for group in groups {
        for service in &group.group.services {
            let bundle = by_service
                .entry(service.as_str())
                .or_insert_with(|| ServiceBundle {
                    service: service.clone(),
                    total_count: 0,
                    critical: 0,
                    groups: Vec::new(),
                });
            bundle.total_count += group.group.count;
            if PriorityLevel::from_score(group.score) == PriorityLevel::Critical {
                bundle.critical += 1;
            }
            bundle.groups.push(*group);
        }
    }
    let mut out: Vec<_> = by_service.into_values().collect();
    for bundle in &mut out {
        bundle
            .groups
            .sort_by(|a, b| b.group.count.cmp(&a.group.count));
    }
    out.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    out
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecentDeployments<'a> {
    pub service: &'a ServiceRecord,
    pub deployments: Vec<DeploymentRecord>,
    pub has_errors: bool,
}

/// Services with deployment history, most recently deployed first.
pub fn recent_deployments(services: &[ServiceRecord], limit: usize) -> Vec<RecentDeployments<'_>> {
    let mut with_history: Vec<&ServiceRecord> = services
        .iter()
        .filter(|s| !s.recent_deployments().is_empty())
        .collect();
    with_history.sort_by_key(|s| {
        let last = parse_optional(s.last_deployment()).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        std::cmp::Reverse(last)
    });
    with_history
        .into_iter()
        .take(limit)
        .map(|service| {
            let mut deployments = service.recent_deployments().to_vec();
            sort_deployments(&mut deployments);
            RecentDeployments {
                service,
                deployments,
                has_errors: service.errors_7d() > 0,
            }
        })
        .collect()
}

/// Distinct, sorted, non-empty service names for the service selector.
pub fn service_options_from_events(events: &[RawErrorEvent]) -> Vec<String> {
    sorted_names(events.iter().map(|e| e.service.as_str()))
}

pub fn service_options_from_groups(groups: &ConsolidatedErrors) -> Vec<String> {
    sorted_names(
        groups
            .values()
            .flat_map(|g| g.services.iter().map(String::as_str)),
    )
}

fn sorted_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let unique: BTreeSet<&str> = names.filter(|n| !n.trim().is_empty()).collect();
    let mut out: Vec<String> = unique.into_iter().map(str::to_string).collect();
    out.sort_by(|a, b| compare_names(a, b));
    out
}
