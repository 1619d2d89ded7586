#![forbid(unsafe_code)]

//! Conjunctive record filters.
//!
//! Every predicate is a pure function of one record, so a filter's result is the same subset
//! in the same input order no matter which predicate runs first. A predicate that needs a
//! missing field rejects the record; it never panics.

use crate::model::{RawErrorEvent, ServiceRecord};
use crate::priority::PriorityBucket;
use crate::reconcile::ReconciledGroup;
use crate::timeutil::{
    DateParseError, end_of_local_day, parse_calendar_date, parse_optional, start_of_local_day,
};
use std::str::FromStr;
use time::{Date, OffsetDateTime, UtcOffset};

pub const ALL: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterParseError {
    Unknown { kind: &'static str, value: String },
    Date(DateParseError),
}

impl FilterParseError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::Unknown {
            kind,
            value: value.to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Unknown { kind, value } => format!("unknown {kind} filter: {value:?}"),
            Self::Date(err) => err.message().to_string(),
        }
    }
}

impl std::fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for FilterParseError {}

/// `"all"` (or blank) selects everything.
pub fn parse_selector(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == ALL {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Like [`parse_selector`] for enumerated filters: `"all"` or blank is `None`.
pub fn parse_choice<T>(raw: &str) -> Result<Option<T>, FilterParseError>
where
    T: FromStr<Err = FilterParseError>,
{
    match parse_selector(raw) {
        None => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthFilter {
    Healthy,
    Unhealthy,
    HasErrors,
}

impl FromStr for HealthFilter {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            "errors" => Ok(Self::HasErrors),
            other => Err(FilterParseError::unknown("status", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueStatusFilter {
    WithIssue,
    WithoutIssue,
    Open,
    Closed,
}

impl FromStr for IssueStatusFilter {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "with-issue" => Ok(Self::WithIssue),
            "without-issue" => Ok(Self::WithoutIssue),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(FilterParseError::unknown("issue", other)),
        }
    }
}

/// Inclusive calendar-date window evaluated in a fixed local offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub offset: UtcOffset,
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded(UtcOffset::UTC)
    }
}

impl DateRange {
    pub fn unbounded(offset: UtcOffset) -> Self {
        Self {
            from: None,
            to: None,
            offset,
        }
    }

    /// Blank strings leave that side open.
    pub fn parse(
        from: Option<&str>,
        to: Option<&str>,
        offset: UtcOffset,
    ) -> Result<Self, FilterParseError> {
        let parse_side = |raw: Option<&str>| -> Result<Option<Date>, FilterParseError> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(value) => parse_calendar_date(value)
                    .map(Some)
                    .map_err(FilterParseError::Date),
            }
        };
        Ok(Self {
            from: parse_side(from)?,
            to: parse_side(to)?,
            offset,
        })
    }

    pub fn lower_bound(&self) -> Option<OffsetDateTime> {
        self.from.map(|d| start_of_local_day(d, self.offset))
    }

    pub fn upper_bound(&self) -> Option<OffsetDateTime> {
        self.to.map(|d| end_of_local_day(d, self.offset))
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Lower-cased needle; empty matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Field access shared by every filterable record shape.
pub trait Filterable {
    fn belongs_to(&self, service: &str) -> bool;
    /// Compared against the local start of the `from` day.
    fn lower_date(&self) -> Option<&str>;
    /// Compared against the local end of the `to` day.
    fn upper_date(&self) -> Option<&str>;
    fn haystacks(&self) -> Vec<&str>;
}

impl Filterable for RawErrorEvent {
    fn belongs_to(&self, service: &str) -> bool {
        self.service == service
    }

    fn lower_date(&self) -> Option<&str> {
        Some(self.timestamp.as_str())
    }

    fn upper_date(&self) -> Option<&str> {
        Some(self.timestamp.as_str())
    }

    fn haystacks(&self) -> Vec<&str> {
        vec![self.message.as_str(), self.service.as_str()]
    }
}

impl Filterable for ServiceRecord {
    fn belongs_to(&self, service: &str) -> bool {
        self.name == service
    }

    fn lower_date(&self) -> Option<&str> {
        self.last_deployment()
    }

    fn upper_date(&self) -> Option<&str> {
        self.last_deployment()
    }

    fn haystacks(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Filterable for ReconciledGroup<'_> {
    fn belongs_to(&self, service: &str) -> bool {
        self.group.services.iter().any(|s| s == service)
    }

    fn lower_date(&self) -> Option<&str> {
        self.group.last_seen.as_deref()
    }

    fn upper_date(&self) -> Option<&str> {
        self.group.first_seen.as_deref()
    }

    fn haystacks(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.group.services.len() + 2);
        if let Some(error_type) = self.group.error_type.as_deref() {
            out.push(error_type);
        }
        out.push(self.group.sample_message.as_str());
        out.extend(self.group.services.iter().map(String::as_str));
        out
    }
}

pub fn matches_service<T: Filterable + ?Sized>(record: &T, service: Option<&str>) -> bool {
    match service {
        None => true,
        Some(service) => record.belongs_to(service),
    }
}

pub fn matches_date_range<T: Filterable + ?Sized>(record: &T, range: &DateRange) -> bool {
    if let Some(lower) = range.lower_bound() {
        match parse_optional(record.lower_date()) {
            Some(ts) if ts >= lower => {}
            _ => return false,
        }
    }
    if let Some(upper) = range.upper_bound() {
        match parse_optional(record.upper_date()) {
            Some(ts) if ts <= upper => {}
            _ => return false,
        }
    }
    true
}

pub fn matches_search<T: Filterable + ?Sized>(record: &T, search: &SearchText) -> bool {
    if search.is_empty() {
        return true;
    }
    record
        .haystacks()
        .iter()
        .any(|field| field.to_lowercase().contains(search.as_str()))
}

pub fn matches_severity(event: &RawErrorEvent, severity: Option<&str>) -> bool {
    match severity {
        None => true,
        Some(wanted) => event.severity.as_deref() == Some(wanted),
    }
}

pub fn matches_health(service: &ServiceRecord, health: Option<HealthFilter>) -> bool {
    match health {
        None => true,
        Some(HealthFilter::Healthy) => service.is_healthy(),
        Some(HealthFilter::Unhealthy) => !service.is_healthy(),
        Some(HealthFilter::HasErrors) => service.errors_7d() > 0,
    }
}

pub fn matches_bucket(group: &ReconciledGroup<'_>, bucket: Option<PriorityBucket>) -> bool {
    match bucket {
        None => true,
        Some(bucket) => bucket.contains(group.group.count),
    }
}

pub fn matches_issue_status(group: &ReconciledGroup<'_>, status: Option<IssueStatusFilter>) -> bool {
    let link = &group.link;
    match status {
        None => true,
        Some(IssueStatusFilter::WithIssue) => link.has_issue,
        Some(IssueStatusFilter::WithoutIssue) => !link.has_issue,
        Some(IssueStatusFilter::Open) => link.has_issue && !link.issue_closed,
        Some(IssueStatusFilter::Closed) => link.has_issue && link.issue_closed,
    }
}

/// Raw error stream (list view).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub service: Option<String>,
    pub severity: Option<String>,
    pub dates: DateRange,
    pub search: SearchText,
}

impl EventFilter {
    pub fn matches(&self, event: &RawErrorEvent) -> bool {
        matches_service(event, self.service.as_deref())
            && matches_severity(event, self.severity.as_deref())
            && matches_date_range(event, &self.dates)
            && matches_search(event, &self.search)
    }

    pub fn apply<'a>(&self, events: &'a [RawErrorEvent]) -> Vec<&'a RawErrorEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Service grid on the overview page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub health: Option<HealthFilter>,
    pub search: SearchText,
}

impl ServiceFilter {
    pub fn matches(&self, service: &ServiceRecord) -> bool {
        matches_health(service, self.health) && matches_search(service, &self.search)
    }

    pub fn apply<'a>(&self, services: &'a [ServiceRecord]) -> Vec<&'a ServiceRecord> {
        services.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Consolidated groups (priority, service and issues views).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub service: Option<String>,
    pub bucket: Option<PriorityBucket>,
    pub issue_status: Option<IssueStatusFilter>,
    pub dates: DateRange,
    pub search: SearchText,
}

impl GroupFilter {
    pub fn matches(&self, group: &ReconciledGroup<'_>) -> bool {
        matches_service(group, self.service.as_deref())
            && matches_bucket(group, self.bucket)
            && matches_issue_status(group, self.issue_status)
            && matches_date_range(group, &self.dates)
            && matches_search(group, &self.search)
    }

    pub fn apply<'g, 'a>(&self, groups: &'g [ReconciledGroup<'a>]) -> Vec<&'g ReconciledGroup<'a>> {
        groups.iter().filter(|g| self.matches(g)).collect()
    }
}
