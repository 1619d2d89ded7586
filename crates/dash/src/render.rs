#![forbid(unsafe_code)]

//! Text and JSON output for each view. Nothing here filters or sorts; it only lays out what
//! [`AppState`] computed.

use crate::OutputFormat;
use crate::state::{AppState, PagedView};
use eb_core::compose::{can_open_issue, issue_id};
use eb_core::filter::DateRange;
use eb_core::format::{
    MISSING, display_error_type, format_analysis_compact, format_analysis_markdown, format_date,
    format_date_short, format_number, format_short_ago, format_time_ago, truncate_message,
    truncate_revision, truncate_url,
};
use eb_core::model::{RawErrorEvent, ServiceRecord};
use eb_core::reconcile::ReconciledGroup;
use eb_core::summary::{
    RECENT_DEPLOYMENTS_LIMIT, group_by_service, recent_deployments,
};
use eb_core::timeutil::format_calendar_date;
use eb_core::{PageSlot, PriorityBucket, PriorityLevel};
use eb_loader::LoadError;
use serde::Serialize;
use serde_json::json;

const MESSAGE_PREVIEW: usize = 120;
const SAMPLE_PREVIEW: usize = 200;

pub type RenderResult = Result<String, serde_json::Error>;

/// Placeholder shown when a required document could not be loaded.
pub fn unavailable(err: &LoadError) -> String {
    format!("Datos no disponibles: {err}")
}

fn to_json<T: Serialize>(value: &T) -> RenderResult {
    serde_json::to_string_pretty(value)
}

fn page_strip(slots: &[PageSlot], current: usize) -> String {
    slots
        .iter()
        .map(|slot| match slot {
            PageSlot::Number(n) if *n == current => format!("[{n}]"),
            PageSlot::Number(n) => n.to_string(),
            PageSlot::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn page_footer<T>(view: &PagedView<T>) -> Option<String> {
    if view.total_pages <= 1 {
        return None;
    }
    let first = view.offset + 1;
    let last = view.offset + view.items.len();
    Some(format!(
        "Mostrando {first}-{last} de {} | Paginas: {}",
        view.total_items,
        page_strip(&view.window, view.page)
    ))
}

fn range_label(range: &DateRange) -> String {
    let side = |date: Option<time::Date>| date.map(format_calendar_date).unwrap_or_else(|| "*".to_string());
    format!("{} .. {}", side(range.from), side(range.to))
}

fn degraded_notice(state: &AppState) -> Option<String> {
    let degraded = &state.snapshot().degraded;
    if degraded.is_empty() {
        return None;
    }
    let names: Vec<String> = degraded.iter().map(ToString::to_string).collect();
    Some(format!("Aviso: datos parciales, sin {}", names.join(", ")))
}

fn header(state: &AppState) -> String {
    format!(
        "Ultima actualizacion: {}",
        format_date(state.snapshot().meta.last_update.as_deref(), state.offset())
    )
}

fn service_options_line(options: &[String]) -> String {
    if options.is_empty() {
        return format!("Servicios disponibles: {MISSING}");
    }
    format!("Servicios disponibles: {}", options.join(", "))
}

fn service_line(state: &AppState, service: &ServiceRecord) -> String {
    let marker = if service.is_healthy() { "OK  " } else { "FAIL" };
    format!(
        "  {marker} {:<28} errores 7d {:>6}  deploys 7d {:>4}  ultimo deploy {}",
        service.name,
        format_number(service.errors_7d()),
        service.deployments_7d(),
        format_short_ago(service.last_deployment(), state.now(), state.offset())
    )
}

pub fn overview(state: &AppState, format: OutputFormat) -> RenderResult {
    let summary = state.overview_summary();
    let services = state.service_view();
    let snapshot = state.snapshot();
    let deployments = recent_deployments(&snapshot.services, RECENT_DEPLOYMENTS_LIMIT);

    if format == OutputFormat::Json {
        return to_json(&json!({
            "last_update": snapshot.meta.last_update,
            "summary": summary,
            "services": services,
            "recent_deployments": deployments,
            "repos": snapshot.repos,
            "degraded": snapshot.degraded.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }));
    }

    let mut lines = vec![
        header(state),
        format!(
            "Servicios: {} ({} saludables, {} con fallas) | Repos: {}",
            summary.total_services,
            summary.healthy_services,
            summary.unhealthy_services,
            summary.total_repos
        ),
        format!(
            "Errores: 24h {} | 7d {} | Servicios con errores: {}",
            format_number(summary.total_errors_24h),
            format_number(summary.total_errors_7d),
            summary.services_with_errors
        ),
        format!(
            "Deploys: 24h {} | 7d {}",
            summary.total_deployments_24h, summary.total_deployments_7d
        ),
        String::new(),
        format!("Servicios ({})", services.total_items),
    ];
    if services.items.is_empty() {
        lines.push("  No se encontraron servicios con los filtros seleccionados.".to_string());
    }
    lines.extend(services.items.iter().map(|s| service_line(state, s)));
    lines.extend(page_footer(&services));

    if !deployments.is_empty() {
        lines.push(String::new());
        lines.push("Despliegues recientes".to_string());
        for entry in &deployments {
            let latest = entry.deployments.first();
            let marker = if latest.is_some_and(|d| d.is_ready()) { "✓" } else { "!" };
            lines.push(format!(
                "  {marker} {:<28} {:<12} {}{}",
                entry.service.name,
                truncate_revision(latest.map(|d| d.revision.as_str())),
                format_time_ago(latest.map(|d| d.timestamp.as_str()), state.now(), state.offset()),
                if entry.has_errors { "  [errores]" } else { "" }
            ));
        }
    }

    if !snapshot.repos.is_empty() {
        lines.push(String::new());
        lines.push("Repositorios".to_string());
        for repo in &snapshot.repos {
            lines.push(format!(
                "  {:<28} {:<40} {}",
                repo.name,
                truncate_message(repo.description.as_deref().unwrap_or(MISSING), 40),
                format_short_ago(repo.updated_at.as_deref(), state.now(), state.offset())
            ));
        }
    }

    lines.extend(degraded_notice(state));
    Ok(lines.join("\n"))
}

fn group_title(group: &ReconciledGroup<'_>) -> String {
    display_error_type(group.group.error_type.as_deref(), &group.group.sample_message)
}

fn ranked_line(state: &AppState, rank: usize, group: &ReconciledGroup<'_>) -> Vec<String> {
    let level = PriorityLevel::from_score(group.score);
    vec![
        format!(
            "#{rank:<3} {} {:<8} score {:<5} {}",
            level.icon(),
            level.label(),
            group.score,
            group_title(group)
        ),
        format!(
            "      {} ocurrencias | servicios: {} | visto {} | analisis: {}",
            format_number(group.group.count),
            group.group.services.join(", "),
            format_time_ago(group.group.last_seen.as_deref(), state.now(), state.offset()),
            if group.has_analysis() { "si" } else { "no" }
        ),
        format!("      {}", group.hash),
    ]
}

pub fn errors_priority(state: &AppState, format: OutputFormat) -> RenderResult {
    let summary = state.errors_summary();
    let groups = state.ranked_groups();
    let options = state.event_service_options();
    if format == OutputFormat::Json {
        return to_json(&json!({
            "summary": summary,
            "service_options": options,
            "groups": groups,
        }));
    }
    let mut lines = vec![
        header(state),
        format!(
            "Errores: {} ocurrencias en {} grupos, {} servicios afectados (mas errores: {})",
            format_number(summary.total_errors),
            summary.total_groups,
            summary.affected_services,
            summary.top_service.as_deref().unwrap_or(MISSING)
        ),
        service_options_line(&options),
        String::new(),
    ];
    if groups.is_empty() {
        lines.push("No se encontraron errores con los filtros seleccionados.".to_string());
    }
    for (index, group) in groups.iter().enumerate() {
        lines.extend(ranked_line(state, index + 1, group));
    }
    lines.extend(degraded_notice(state));
    Ok(lines.join("\n"))
}

pub fn errors_by_service(state: &AppState, format: OutputFormat) -> RenderResult {
    let groups = state.ranked_groups();
    let refs: Vec<&ReconciledGroup<'_>> = groups.iter().collect();
    let bundles = group_by_service(&refs);
    let options = state.event_service_options();
    if format == OutputFormat::Json {
        return to_json(&json!({ "service_options": options, "services": bundles }));
    }
    let mut lines = vec![header(state), service_options_line(&options), String::new()];
    if bundles.is_empty() {
        lines.push("No se encontraron errores con los filtros seleccionados.".to_string());
    }
    for bundle in &bundles {
        lines.push(format!(
            "{} ({} ocurrencias, {} criticos)",
            bundle.service,
            format_number(bundle.total_count),
            bundle.critical
        ));
        for group in &bundle.groups {
            let level = PriorityLevel::from_score(group.score);
            lines.push(format!(
                "  {} {:<8} x{:<6} {}  [{}]",
                level.icon(),
                level.label(),
                group.group.count,
                group_title(group),
                group.hash
            ));
        }
    }
    lines.extend(degraded_notice(state));
    Ok(lines.join("\n"))
}

fn event_line(state: &AppState, event: &RawErrorEvent) -> String {
    let http = event
        .http_request
        .as_ref()
        .map(|req| {
            format!(
                " {} {} {}",
                req.method.as_deref().unwrap_or(MISSING),
                truncate_url(req.url.as_deref().unwrap_or(MISSING)),
                req.status.map(|s| s.to_string()).unwrap_or_else(|| MISSING.to_string())
            )
        })
        .unwrap_or_default();
    format!(
        "  {:<15} {:<24} {:<8} {:<12}{http}  {}",
        format_date_short(Some(event.timestamp.as_str()), state.offset()),
        event.service,
        event.severity.as_deref().unwrap_or(MISSING),
        truncate_revision(event.revision.as_deref()),
        truncate_message(event.message.lines().next().unwrap_or_default(), MESSAGE_PREVIEW)
    )
}

pub fn errors_list(state: &AppState, format: OutputFormat) -> RenderResult {
    let events = state.event_view();
    let options = state.event_service_options();
    if format == OutputFormat::Json {
        return to_json(&json!({ "service_options": options, "events": events }));
    }
    let mut lines = vec![
        header(state),
        service_options_line(&options),
        format!(
            "Eventos ({}) | rango {}",
            events.total_items,
            range_label(&state.event_filter().dates)
        ),
    ];
    if events.items.is_empty() {
        lines.push("  No se encontraron errores con los filtros seleccionados.".to_string());
    }
    lines.extend(events.items.iter().map(|e| event_line(state, e)));
    lines.extend(page_footer(&events));
    lines.extend(degraded_notice(state));
    Ok(lines.join("\n"))
}

fn issue_state_label(group: &ReconciledGroup<'_>) -> String {
    let link = &group.link;
    if !link.has_issue {
        return if can_open_issue(group.group, false) {
            format!("sin issue (errboard compose-issue {})", group.hash)
        } else {
            "sin issue".to_string()
        };
    }
    let state = match link.issue_state {
        Some(state) if link.issue_closed => format!("{} (corregido)", state.as_str()),
        Some(state) => state.as_str().to_string(),
        None => "creado".to_string(),
    };
    format!("{state} {}", link.issue_url.as_deref().unwrap_or(MISSING))
}

pub fn issues(state: &AppState, format: OutputFormat) -> RenderResult {
    let summary = state.issues_summary();
    let progress = state.progress();
    let view = state.group_view();
    let options = state.group_service_options();
    if format == OutputFormat::Json {
        return to_json(&json!({
            "summary": summary,
            "progress": progress,
            "service_options": options,
            "groups": view,
        }));
    }
    let mut lines = vec![
        header(state),
        format!(
            "Grupos: {} | Alta prioridad: {} | Issues creados: {} | Analizados: {}",
            summary.total_groups, summary.high_priority, summary.issues_created, summary.analyzed
        ),
        format!(
            "Progreso: {}/{} corregidos ({}%) | detectados {} | pendientes {}",
            progress.corrected, progress.total, progress.percent, progress.detected, progress.pending
        ),
        service_options_line(&options),
        format!(
            "Grupos filtrados ({}) | rango {}",
            view.total_items,
            range_label(&state.group_filter().dates)
        ),
    ];
    if view.items.is_empty() {
        lines.push("  No se encontraron errores con los filtros seleccionados.".to_string());
    }
    for group in &view.items {
        let bucket = PriorityBucket::display_for_count(group.group.count);
        lines.push(format!(
            "  [{:<5}] {:<40} x{:<6} {}",
            bucket.label(),
            truncate_message(&group_title(group), 40),
            group.group.count,
            issue_state_label(group)
        ));
        lines.push(format!(
            "          {} | {} | {}",
            issue_id(group.hash),
            group.group.services.join(", "),
            format_date_short(group.group.last_seen.as_deref(), state.offset())
        ));
    }
    lines.extend(page_footer(&view));
    lines.extend(degraded_notice(state));
    Ok(lines.join("\n"))
}

pub fn analysis(
    state: &AppState,
    group: &ReconciledGroup<'_>,
    html: bool,
    format: OutputFormat,
) -> RenderResult {
    let text = group.analysis.map(|a| a.analysis.as_str()).unwrap_or_default();
    if format == OutputFormat::Json {
        return to_json(&json!({
            "hash": group.hash,
            "error_type": group_title(group),
            "analyzed_at": group.analysis.and_then(|a| a.analyzed_at.as_deref()),
            "markdown": text,
            "html": format_analysis_markdown(text),
            "compact_html": format_analysis_compact(text),
        }));
    }
    let mut lines = vec![
        format!("{} {}", issue_id(group.hash), group_title(group)),
        format!(
            "{} ocurrencias | servicios: {}",
            format_number(group.group.count),
            group.group.services.join(", ")
        ),
        format!(
            "Muestra: {}",
            truncate_message(&group.group.sample_message, SAMPLE_PREVIEW)
        ),
        String::new(),
    ];
    match group.analysis {
        None => lines.push("Sin analisis disponible para este error.".to_string()),
        Some(found) => {
            lines.push(format!(
                "Analizado: {}",
                format_date(found.analyzed_at.as_deref(), state.offset())
            ));
            lines.push(if html {
                format_analysis_markdown(&found.analysis)
            } else {
                found.analysis.clone()
            });
        }
    }
    Ok(lines.join("\n"))
}

pub fn compose(hash: &str, title: &str, url: &str, format: OutputFormat) -> RenderResult {
    if format == OutputFormat::Json {
        return to_json(&json!({ "hash": hash, "title": title, "url": url }));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests;
