#![forbid(unsafe_code)]

use eb_loader::{DataSource, IssueTracker, LoadError, Page, Resource, load_snapshot};
use reqwest::Url;
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SERVICES: &str = r#"[
  {"name": "billing-api", "status": "True", "errors": {"total": 3, "last24h": 1, "last7d": 3}},
  {"name": "web", "status": "False"}
]"#;
const META: &str = r#"{"lastUpdate": "2026-10-17T06:00:00Z", "totalServices": 2}"#;
const CONSOLIDATED: &str = r#"{
  "a1": {"error_type": "ValueError", "sample_message": "ValueError: x", "count": 4, "services": ["web"]}
}"#;
const CREATED: &str = r#"[{"hash": "a1", "url": "https://github.com/acme/dash/issues/3"}]"#;

fn write(root: &Path, resource: Resource, body: &str) {
    let path = root.join(resource.relative_path());
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create data dir");
    std::fs::write(path, body).expect("write fixture");
}

fn dashboard(files: &[(Resource, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir_all(dir.path().join("data")).expect("create data dir");
    for (resource, body) in files {
        write(dir.path(), *resource, body);
    }
    dir
}

#[tokio::test]
async fn overview_loads_required_and_optional_documents() {
    let dir = dashboard(&[
        (Resource::Services, SERVICES),
        (Resource::Meta, META),
        (Resource::Repos, r#"[{"name": "dash", "url": "https://github.com/acme/dash"}]"#),
    ]);
    let source = DataSource::dir(dir.path());
    let snapshot = load_snapshot(&source, Page::Overview, None)
        .await
        .expect("load");
    assert_eq!(snapshot.services.len(), 2);
    assert_eq!(snapshot.repos.len(), 1);
    assert_eq!(snapshot.meta.total_services, Some(2));
    assert!(!snapshot.is_degraded());
    // Documents the page does not use are never read.
    assert!(snapshot.consolidated.is_empty());
}

#[tokio::test]
async fn missing_optional_document_degrades_to_empty() {
    let dir = dashboard(&[(Resource::Services, SERVICES), (Resource::Meta, META)]);
    let source = DataSource::dir(dir.path());
    let snapshot = load_snapshot(&source, Page::Overview, None)
        .await
        .expect("load");
    assert!(snapshot.repos.is_empty());
    assert_eq!(snapshot.degraded, vec![Resource::Repos]);
}

#[tokio::test]
async fn malformed_optional_document_degrades_to_empty() {
    let dir = dashboard(&[
        (Resource::ConsolidatedErrors, CONSOLIDATED),
        (Resource::Meta, META),
        (Resource::Errors, "{not json"),
        (Resource::ErrorAnalyses, "{}"),
    ]);
    let source = DataSource::dir(dir.path());
    let snapshot = load_snapshot(&source, Page::Errors, None)
        .await
        .expect("load");
    assert_eq!(snapshot.consolidated.len(), 1);
    assert!(snapshot.errors.is_empty());
    assert_eq!(snapshot.degraded, vec![Resource::Errors]);
}

#[tokio::test]
async fn missing_required_document_fails_the_load() {
    let dir = dashboard(&[(Resource::Meta, META)]);
    let source = DataSource::dir(dir.path());
    let err = load_snapshot(&source, Page::Errors, None)
        .await
        .expect_err("consolidated errors are required");
    assert_eq!(err.resource(), Some(Resource::ConsolidatedErrors));
    assert!(err.is_not_found());
    assert!(err.to_string().starts_with("data/consolidated_errors.json: io:"));
}

#[tokio::test]
async fn malformed_required_document_fails_the_load() {
    let dir = dashboard(&[(Resource::Meta, "42"), (Resource::ConsolidatedErrors, CONSOLIDATED)]);
    let source = DataSource::dir(dir.path());
    let err = load_snapshot(&source, Page::Errors, None)
        .await
        .expect_err("meta must be an object");
    assert!(matches!(err, LoadError::Decode { resource: Resource::Meta, .. }));
}

#[tokio::test]
async fn issues_page_without_tracker_has_no_live_states() {
    let dir = dashboard(&[
        (Resource::ConsolidatedErrors, CONSOLIDATED),
        (Resource::Meta, META),
        (Resource::CreatedIssues, CREATED),
    ]);
    let source = DataSource::dir(dir.path());
    let snapshot = load_snapshot(&source, Page::Issues, None)
        .await
        .expect("load");
    assert_eq!(snapshot.created_issues.len(), 1);
    assert!(snapshot.issue_states.is_empty());
    assert_eq!(snapshot.degraded, vec![Resource::ErrorAnalyses]);
}

#[tokio::test]
async fn issues_page_without_consolidated_errors_lists_nothing() {
    let dir = dashboard(&[(Resource::Meta, META), (Resource::CreatedIssues, CREATED)]);
    let source = DataSource::dir(dir.path());
    let snapshot = load_snapshot(&source, Page::Issues, None)
        .await
        .expect("load");
    assert!(snapshot.consolidated.is_empty());
    assert_eq!(snapshot.created_issues.len(), 1);
    assert_eq!(
        snapshot.degraded,
        vec![Resource::ConsolidatedErrors, Resource::ErrorAnalyses]
    );
}

/// Accepts one connection and answers it with `status_line` and an empty body.
async fn one_shot_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response =
                format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn unreachable_tracker_yields_no_states() {
    let tracker = IssueTracker::new(reqwest::Client::new(), "http://127.0.0.1:1", "acme/dash");
    assert!(tracker.fetch_states().await.is_empty());
}

#[tokio::test]
async fn tracker_error_status_yields_no_states() {
    let api = one_shot_server("503 Service Unavailable").await;
    let tracker = IssueTracker::new(reqwest::Client::new(), &api, "acme/dash");
    assert!(tracker.fetch_states().await.is_empty());
}

#[tokio::test]
async fn failing_tracker_does_not_abort_the_issues_page() {
    let dir = dashboard(&[
        (Resource::ConsolidatedErrors, CONSOLIDATED),
        (Resource::Meta, META),
        (Resource::CreatedIssues, CREATED),
        (Resource::ErrorAnalyses, "{}"),
    ]);
    let source = DataSource::dir(dir.path());
    let tracker = IssueTracker::new(reqwest::Client::new(), "http://127.0.0.1:1", "acme/dash");
    let snapshot = load_snapshot(&source, Page::Issues, Some(&tracker))
        .await
        .expect("tracker failures never fail the load");
    assert!(snapshot.issue_states.is_empty());
    assert_eq!(snapshot.consolidated.len(), 1);
    assert_eq!(snapshot.created_issues.len(), 1);
    assert!(!snapshot.is_degraded());
}

#[test]
fn http_source_builds_cache_busted_urls() {
    let source =
        DataSource::http(reqwest::Client::new(), "https://dash.example.test/board").expect("url");
    let DataSource::Http { base_url, .. } = &source else {
        panic!("expected http source");
    };
    let url = DataSource::resource_url(base_url, Resource::Meta, 1_760_000_000_000).expect("url");
    assert_eq!(
        url,
        Url::parse("https://dash.example.test/board/data/meta.json?t=1760000000000").expect("url")
    );
}

#[test]
fn http_source_rejects_non_http_urls() {
    let err = DataSource::http(reqwest::Client::new(), "ftp://dash.example.test").expect_err("scheme");
    assert!(matches!(err, LoadError::InvalidBaseUrl { .. }));
    assert!(DataSource::http(reqwest::Client::new(), "not a url").is_err());
}

#[test]
fn pages_declare_disjoint_required_and_optional_sets() {
    for page in [Page::Overview, Page::Errors, Page::Issues] {
        for resource in page.optional() {
            assert!(!page.is_required(*resource), "{page:?} {resource}");
        }
        assert!(page.is_required(Resource::Meta));
    }
}
