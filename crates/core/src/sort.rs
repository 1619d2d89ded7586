#![forbid(unsafe_code)]

//! Orderings for filtered views. All sorts are stable, so ties keep their input order.

use crate::filter::FilterParseError;
use crate::model::{DeploymentRecord, RawErrorEvent, ServiceRecord};
use crate::reconcile::ReconciledGroup;
use crate::timeutil::parse_optional;
use std::cmp::Ordering;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ServiceSortKey {
    #[default]
    Name,
    Errors,
    Deployments,
    Recent,
}

impl FromStr for ServiceSortKey {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "name" | "" => Ok(Self::Name),
            "errors" => Ok(Self::Errors),
            "deployments" => Ok(Self::Deployments),
            "recent" => Ok(Self::Recent),
            other => Err(FilterParseError::unknown("sort", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupSortKey {
    #[default]
    Count,
    Recent,
    Services,
    Priority,
    /// Keep the collection order.
    None,
}

impl FromStr for GroupSortKey {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "count" | "errors" => Ok(Self::Count),
            "recent" | "timestamp" => Ok(Self::Recent),
            "services" => Ok(Self::Services),
            "priority" => Ok(Self::Priority),
            "none" | "" => Ok(Self::None),
            other => Err(FilterParseError::unknown("sort", other)),
        }
    }
}

/// Missing or unparseable dates sort as the epoch, i.e. last in descending order.
fn date_or_epoch(raw: Option<&str>) -> OffsetDateTime {
    parse_optional(raw).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Case-folded comparison with a raw tiebreak; stands in for a locale collator.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_services(services: &mut [&ServiceRecord], key: ServiceSortKey) {
    match key {
        ServiceSortKey::Name => services.sort_by(|a, b| compare_names(&a.name, &b.name)),
        ServiceSortKey::Errors => services.sort_by(|a, b| b.errors_7d().cmp(&a.errors_7d())),
        ServiceSortKey::Deployments => {
            services.sort_by(|a, b| b.deployments_7d().cmp(&a.deployments_7d()))
        }
        ServiceSortKey::Recent => {
            services.sort_by_key(|s| std::cmp::Reverse(date_or_epoch(s.last_deployment())))
        }
    }
}

pub fn sort_groups(groups: &mut [&ReconciledGroup<'_>], key: GroupSortKey) {
    match key {
        GroupSortKey::Count => groups.sort_by(|a, b| b.group.count.cmp(&a.group.count)),
        GroupSortKey::Recent => groups
            .sort_by_key(|g| std::cmp::Reverse(date_or_epoch(g.group.last_seen.as_deref()))),
        GroupSortKey::Services => {
            groups.sort_by(|a, b| b.group.services.len().cmp(&a.group.services.len()))
        }
        GroupSortKey::Priority => groups.sort_by(|a, b| b.score.cmp(&a.score)),
        GroupSortKey::None => {}
    }
}

/// Newest first.
pub fn sort_events(events: &mut [&RawErrorEvent]) {
    events.sort_by_key(|e| std::cmp::Reverse(date_or_epoch(Some(e.timestamp.as_str()))));
}

/// Newest first; producers already emit this order but it is not trusted.
pub fn sort_deployments(deployments: &mut [DeploymentRecord]) {
    deployments.sort_by_key(|d| std::cmp::Reverse(date_or_epoch(Some(d.timestamp.as_str()))));
}
