use super::*;
use crate::testing::{NOW, OFFSET, snapshot};
use eb_core::{HealthFilter, IssueStatusFilter};
use eb_core::model::{DeploymentRecord, DeploymentSummary};
use eb_loader::Resource;

fn state() -> AppState {
    AppState::new(snapshot(), NOW, OFFSET, 20)
}

#[test]
fn page_strip_marks_current_page() {
    let slots = [
        PageSlot::Number(1),
        PageSlot::Ellipsis,
        PageSlot::Number(4),
        PageSlot::Number(5),
        PageSlot::Number(6),
        PageSlot::Ellipsis,
        PageSlot::Number(10),
    ];
    assert_eq!(page_strip(&slots, 5), "1 ... 4 [5] 6 ... 10");
}

#[test]
fn overview_text_has_counts_and_footer() {
    let out = overview(&state(), OutputFormat::Text).expect("render");
    assert!(out.starts_with("Ultima actualizacion: 17 oct 2026, 06:00"));
    assert!(out.contains("Servicios: 25 (20 saludables, 5 con fallas) | Repos: 0"));
    assert!(out.contains("Mostrando 1-20 de 25 | Paginas: [1] 2"));
}

#[test]
fn overview_empty_filter_message() {
    let mut state = state();
    state.set_service_search("nothing-matches");
    let out = overview(&state, OutputFormat::Text).expect("render");
    assert!(out.contains("No se encontraron servicios"));
    state.set_service_search("");
    state.set_health(Some(HealthFilter::Unhealthy));
    let out = overview(&state, OutputFormat::Text).expect("render");
    assert!(out.contains("FAIL svc-00"));
}

#[test]
fn overview_json_is_structured() {
    let out = overview(&state(), OutputFormat::Json).expect("render");
    let value: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(value["summary"]["total_services"], 25);
    assert_eq!(value["services"]["total_pages"], 2);
    assert_eq!(value["services"]["items"].as_array().map(Vec::len), Some(20));
}

#[test]
fn priority_view_ranks_by_score() {
    let out = errors_priority(&state(), OutputFormat::Text).expect("render");
    let first = out.find("#1").expect("rank 1");
    let a1 = out.find("OperationalError").expect("a1");
    let b2 = out.find("ValueError").expect("b2");
    assert!(first < a1 && a1 < b2);
    assert!(out.contains("ALTO"));
    assert!(out.contains("(mas errores: web)"));
}

#[test]
fn service_view_bundles_groups() {
    let out = errors_by_service(&state(), OutputFormat::Text).expect("render");
    assert!(out.contains("web (72 ocurrencias, 0 criticos)"));
    assert!(out.contains("billing-api (60 ocurrencias, 0 criticos)"));
}

#[test]
fn list_view_shows_range_and_events() {
    let out = errors_list(&state(), OutputFormat::Text).expect("render");
    assert!(out.contains("Eventos (2) | rango 2026-10-10 .. 2026-10-17"));
    assert!(out.contains("CRITICAL"));
    assert!(!out.contains("old failure"));
}

#[test]
fn issues_view_reports_links_and_progress() {
    let mut state = state();
    let out = issues(&state, OutputFormat::Text).expect("render");
    assert!(out.contains("Progreso: 1/2 corregidos (50%) | detectados 2 | pendientes 1"));
    assert!(out.contains("closed (corregido) https://github.com/acme/dash/issues/9"));
    assert!(out.contains("open https://github.com/acme/dash/issues/8"));

    state.set_group_dates(DateRange::unbounded(OFFSET));
    state.set_group_issue_status(Some(IssueStatusFilter::WithoutIssue));
    let out = issues(&state, OutputFormat::Text).expect("render");
    assert!(out.contains("sin issue (errboard compose-issue c3)"));
    assert!(out.contains("Progreso: 0/1 corregidos (0%) | detectados 0 | pendientes 1"));
}

#[test]
fn analysis_renders_markdown_or_html() {
    let state = state();
    let groups = state.reconciled();
    let a1 = groups.iter().find(|g| g.hash == "a1").expect("a1");
    let text = analysis(&state, a1, false, OutputFormat::Text).expect("render");
    assert!(text.starts_with("ERROR-a1 OperationalError"));
    assert!(text.contains("## Causa"));
    let html = analysis(&state, a1, true, OutputFormat::Text).expect("render");
    assert!(html.contains("<strong>conexiones</strong>"));

    let b2 = groups.iter().find(|g| g.hash == "b2").expect("b2");
    let missing = analysis(&state, b2, false, OutputFormat::Text).expect("render");
    assert!(missing.contains("Sin analisis disponible"));
}

#[test]
fn selectors_list_available_services() {
    let state = state();
    let list = errors_list(&state, OutputFormat::Text).expect("render");
    assert!(list.contains("Servicios disponibles: billing-api, web"));

    let priority = errors_priority(&state, OutputFormat::Json).expect("render");
    let value: serde_json::Value = serde_json::from_str(&priority).expect("json");
    assert_eq!(value["service_options"], serde_json::json!(["billing-api", "web"]));

    let issues_json = issues(&state, OutputFormat::Json).expect("render");
    let value: serde_json::Value = serde_json::from_str(&issues_json).expect("json");
    assert_eq!(
        value["service_options"],
        serde_json::json!(["billing-api", "web", "worker"])
    );
    let issues_text = issues(&state, OutputFormat::Text).expect("render");
    assert!(issues_text.contains("Servicios disponibles: billing-api, web, worker"));
}

#[test]
fn recent_deployments_mark_readiness() {
    let deployed = |name: &str, status: &str, at: &str| ServiceRecord {
        name: name.to_string(),
        status: Some("True".to_string()),
        deployments: Some(DeploymentSummary {
            last_deployment: Some(at.to_string()),
            recent_deployments: vec![DeploymentRecord {
                revision: format!("{name}-00042-abc"),
                timestamp: at.to_string(),
                status: status.to_string(),
            }],
            ..DeploymentSummary::default()
        }),
        ..ServiceRecord::default()
    };
    let mut snapshot = snapshot();
    snapshot
        .services
        .push(deployed("ready-svc", "True", "2026-10-17T10:00:00Z"));
    snapshot
        .services
        .push(deployed("stuck-svc", "False", "2026-10-16T10:00:00Z"));
    let state = AppState::new(snapshot, NOW, OFFSET, 20);
    let out = overview(&state, OutputFormat::Text).expect("render");
    assert!(out.contains("Despliegues recientes"));
    assert!(out.contains("✓ ready-svc"));
    assert!(out.contains("! stuck-svc"));
    let ready = out.find("✓ ready-svc").expect("ready line");
    let stuck = out.find("! stuck-svc").expect("stuck line");
    assert!(ready < stuck);
}

#[test]
fn degraded_documents_are_called_out() {
    let mut snapshot = snapshot();
    snapshot.degraded = vec![Resource::Repos];
    let state = AppState::new(snapshot, NOW, OFFSET, 20);
    let out = overview(&state, OutputFormat::Text).expect("render");
    assert!(out.ends_with("Aviso: datos parciales, sin data/repos.json"));
}

#[test]
fn unavailable_placeholder() {
    let err = LoadError::Status {
        resource: Resource::Meta,
        status: reqwest::StatusCode::NOT_FOUND,
    };
    assert_eq!(
        unavailable(&err),
        "Datos no disponibles: data/meta.json: unexpected status 404 Not Found"
    );
}
