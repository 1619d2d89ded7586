use eb_core::model::{
    ConsolidatedErrorGroup, CreatedIssue, ErrorAnalysis, ErrorSummary, IssueState, IssueStatus,
    MetaSummary, RawErrorEvent, ServiceRecord,
};
use eb_loader::{Page, Snapshot};
use time::macros::datetime;
use time::{OffsetDateTime, UtcOffset};

pub(crate) const NOW: OffsetDateTime = datetime!(2026-10-17 12:00 UTC);
pub(crate) const OFFSET: UtcOffset = UtcOffset::UTC;

fn group(
    error_type: Option<&str>,
    sample: &str,
    count: u64,
    services: &[&str],
    first_seen: &str,
    last_seen: &str,
) -> ConsolidatedErrorGroup {
    ConsolidatedErrorGroup {
        error_type: error_type.map(str::to_string),
        sample_message: sample.to_string(),
        count,
        services: services.iter().map(|s| s.to_string()).collect(),
        first_seen: Some(first_seen.to_string()),
        last_seen: Some(last_seen.to_string()),
        ..ConsolidatedErrorGroup::default()
    }
}

fn event(service: &str, severity: Option<&str>, timestamp: &str, message: &str) -> RawErrorEvent {
    RawErrorEvent {
        service: service.to_string(),
        severity: severity.map(str::to_string),
        timestamp: timestamp.to_string(),
        message: message.to_string(),
        ..RawErrorEvent::default()
    }
}

/// 25 services (every fifth unhealthy), three groups and a handful of events.
pub(crate) fn snapshot() -> Snapshot {
    let services = (0..25)
        .map(|i| ServiceRecord {
            name: format!("svc-{i:02}"),
            status: Some(if i % 5 == 0 { "False" } else { "True" }.to_string()),
            errors: Some(ErrorSummary {
                last24h: i,
                last7d: i * 2,
                ..ErrorSummary::default()
            }),
            ..ServiceRecord::default()
        })
        .collect();

    let mut consolidated = eb_core::model::ConsolidatedErrors::new();
    consolidated.insert(
        "a1".to_string(),
        group(
            Some("OperationalError"),
            "could not connect to server",
            60,
            &["billing-api", "web"],
            "2026-10-12T08:00:00Z",
            "2026-10-17T02:00:00Z",
        ),
    );
    consolidated.insert(
        "b2".to_string(),
        group(
            None,
            "ValueError: bad input",
            12,
            &["web"],
            "2026-10-12T08:00:00Z",
            "2026-10-13T08:00:00Z",
        ),
    );
    consolidated.insert(
        "c3".to_string(),
        group(
            Some("Timeout"),
            "upstream timeout",
            4,
            &["worker"],
            "2026-08-01T08:00:00Z",
            "2026-08-02T08:00:00Z",
        ),
    );

    let mut analyses = eb_core::model::ErrorAnalyses::new();
    analyses.insert(
        "a1".to_string(),
        ErrorAnalysis {
            analysis: "## Causa\n\nEl pool de **conexiones** se agota.".to_string(),
            analyzed_at: Some("2026-10-17T06:00:00Z".to_string()),
        },
    );

    let created_issues = vec![
        CreatedIssue {
            hash: "a1".to_string(),
            url: "https://github.com/acme/dash/issues/7".to_string(),
        },
        CreatedIssue {
            hash: "b2".to_string(),
            url: "https://github.com/acme/dash/issues/8".to_string(),
        },
        CreatedIssue {
            hash: "a1".to_string(),
            url: "https://github.com/acme/dash/issues/9".to_string(),
        },
    ];

    let mut issue_states = eb_core::model::IssueStates::new();
    issue_states.insert(
        8,
        IssueState {
            state: IssueStatus::Open,
            closed_at: None,
            title: "[ERROR-b2] ValueError".to_string(),
        },
    );
    issue_states.insert(
        9,
        IssueState {
            state: IssueStatus::Closed,
            closed_at: Some("2026-10-16T00:00:00Z".to_string()),
            title: "[ERROR-a1] OperationalError".to_string(),
        },
    );

    Snapshot {
        page: Some(Page::Issues),
        services,
        meta: MetaSummary {
            last_update: Some("2026-10-17T06:00:00Z".to_string()),
            ..MetaSummary::default()
        },
        errors: vec![
            event("web", Some("ERROR"), "2026-10-16T10:00:00Z", "ValueError: bad input"),
            event("billing-api", Some("CRITICAL"), "2026-10-17T02:00:00Z", "could not connect"),
            event("web", None, "2026-10-01T10:00:00Z", "old failure"),
        ],
        consolidated,
        analyses,
        created_issues,
        issue_states,
        ..Snapshot::default()
    }
}
