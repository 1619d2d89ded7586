#![forbid(unsafe_code)]

//! Cross-references consolidated groups with filed issues and their live tracker state.

use crate::model::{
    ConsolidatedErrorGroup, ConsolidatedErrors, CreatedIssue, ErrorAnalyses, ErrorAnalysis,
    IssueStates, IssueStatus,
};
use crate::priority::score;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IssueLink {
    pub has_issue: bool,
    pub issue_url: Option<String>,
    pub issue_state: Option<IssueStatus>,
    pub issue_closed: bool,
}

/// Last-appended entry wins. Earlier entries for the same hash are shadowed, never merged.
pub fn latest_issue_for<'a>(hash: &str, created: &'a [CreatedIssue]) -> Option<&'a CreatedIssue> {
    created.iter().rev().find(|issue| issue.hash == hash)
}

/// Issue number from a trailing `/issues/<digits>` segment.
pub fn parse_issue_number(url: &str) -> Option<u64> {
    let (_, tail) = url.rsplit_once("/issues/")?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse::<u64>().ok()
}

pub fn issue_link(hash: &str, created: &[CreatedIssue], states: &IssueStates) -> IssueLink {
    let Some(issue) = latest_issue_for(hash, created) else {
        return IssueLink::default();
    };
    let issue_state = parse_issue_number(&issue.url)
        .and_then(|number| states.get(&number))
        .map(|state| state.state);
    IssueLink {
        has_issue: true,
        issue_url: Some(issue.url.clone()),
        issue_state,
        issue_closed: issue_state == Some(IssueStatus::Closed),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ReconciledGroup<'a> {
    pub hash: &'a str,
    pub group: &'a ConsolidatedErrorGroup,
    pub link: IssueLink,
    pub analysis: Option<&'a ErrorAnalysis>,
    pub score: u64,
}

impl ReconciledGroup<'_> {
    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }
}

pub fn reconcile_groups<'a>(
    groups: &'a ConsolidatedErrors,
    created: &[CreatedIssue],
    states: &IssueStates,
    analyses: &'a ErrorAnalyses,
    now: OffsetDateTime,
) -> Vec<ReconciledGroup<'a>> {
    groups
        .iter()
        .map(|(hash, group)| ReconciledGroup {
            hash: hash.as_str(),
            group,
            link: issue_link(hash, created, states),
            analysis: analyses.get(hash),
            score: score(group, now),
        })
        .collect()
}

/// Resolution progress over whatever slice is passed in (normally the filtered set).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressMetrics {
    pub total: usize,
    pub corrected: usize,
    pub detected: usize,
    pub pending: usize,
    pub percent: u32,
}

impl ProgressMetrics {
    pub fn over<'g, 'a: 'g, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = &'g ReconciledGroup<'a>>,
    {
        let mut out = Self::default();
        for group in groups {
            out.total += 1;
            if group.link.issue_closed {
                out.corrected += 1;
            }
            if group.link.has_issue {
                out.detected += 1;
            }
        }
        out.pending = out.total - out.corrected;
        out.percent = if out.total == 0 {
            0
        } else {
            ((out.corrected as f64 / out.total as f64) * 100.0).round() as u32
        };
        out
    }
}
