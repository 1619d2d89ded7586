use super::*;
use crate::testing::{NOW, OFFSET, snapshot};
use time::macros::date;

fn state() -> AppState {
    AppState::new(snapshot(), NOW, OFFSET, 20)
}

#[test]
fn date_views_default_to_the_last_seven_days() {
    let state = state();
    let dates = state.event_filter().dates;
    assert_eq!(dates.from, Some(date!(2026 - 10 - 10)));
    assert_eq!(dates.to, Some(date!(2026 - 10 - 17)));
    assert_eq!(state.group_filter().dates, dates);
}

#[test]
fn every_filter_change_resets_the_page() {
    let mut state = state();
    state.go_to_page(2);
    assert_eq!(state.page(), 2);

    state.set_health(Some(HealthFilter::Healthy));
    assert_eq!(state.page(), 1);

    state.set_health(None);
    state.go_to_page(2);
    state.set_service_search("svc");
    assert_eq!(state.page(), 1);

    state.go_to_page(2);
    state.set_service_sort(ServiceSortKey::Errors);
    assert_eq!(state.page(), 1);
}

#[test]
fn paging_is_clamped_to_the_active_view() {
    let mut state = state();
    state.go_to_page(99);
    assert_eq!(state.page(), 2);
    state.next_page();
    assert_eq!(state.page(), 2);
    state.prev_page();
    state.prev_page();
    assert_eq!(state.page(), 1);

    let last = state.service_view();
    assert_eq!(last.total_items, 25);
    assert_eq!(last.total_pages, 2);

    state.set_view(ActiveView::Events);
    state.go_to_page(5);
    assert_eq!(state.page(), 1);
}

#[test]
fn service_view_filters_then_sorts() {
    let mut state = state();
    state.set_health(Some(HealthFilter::Unhealthy));
    state.set_service_sort(ServiceSortKey::Errors);
    let view = state.service_view();
    let names: Vec<&str> = view.items.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["svc-20", "svc-15", "svc-10", "svc-05", "svc-00"]);
    assert!(!view.has_next);
}

#[test]
fn event_view_is_newest_first_inside_the_window() {
    let state = state();
    let view = state.event_view();
    let services: Vec<&str> = view.items.iter().map(|e| e.service.as_str()).collect();
    assert_eq!(services, vec!["billing-api", "web"]);
}

#[test]
fn group_view_uses_reconciled_links() {
    let mut state = state();
    state.set_group_issue_status(Some(IssueStatusFilter::Closed));
    let view = state.group_view();
    assert_eq!(view.total_items, 1);
    assert_eq!(view.items[0].hash, "a1");
    assert!(view.items[0].link.issue_closed);

    state.set_group_issue_status(None);
    state.set_group_dates(DateRange::unbounded(OFFSET));
    state.set_group_bucket(Some(PriorityBucket::Low));
    let hashes: Vec<&str> = state.group_view().items.iter().map(|g| g.hash).collect();
    assert_eq!(hashes, vec!["c3"]);
}

#[test]
fn ranked_groups_ignore_dates_and_follow_the_service_selector() {
    let mut state = state();
    let all: Vec<&str> = state.ranked_groups().iter().map(|g| g.hash).collect();
    assert_eq!(all, vec!["a1", "b2", "c3"]);

    state.set_event_service(Some("web".to_string()));
    let web: Vec<&str> = state.ranked_groups().iter().map(|g| g.hash).collect();
    assert_eq!(web, vec!["a1", "b2"]);
}

#[test]
fn summaries_and_progress() {
    let state = state();
    // c3 falls outside the default seven-day window.
    let progress = state.progress();
    assert_eq!(progress.total, 2);
    assert_eq!(progress.corrected, 1);
    assert_eq!(progress.detected, 2);
    assert_eq!(progress.pending, 1);
    assert_eq!(progress.percent, 50);

    let overview = state.overview_summary();
    assert_eq!(overview.total_services, 25);
    assert_eq!(overview.unhealthy_services, 5);

    assert_eq!(state.errors_summary().top_service.as_deref(), Some("web"));
    assert_eq!(state.issues_summary().high_priority, 1);
}

#[test]
fn replacing_the_snapshot_keeps_filters() {
    let mut state = state();
    state.set_event_service(Some("web".to_string()));
    state.replace_snapshot(Snapshot::default(), NOW);
    assert!(state.event_view().items.is_empty());
    assert_eq!(state.event_filter().service.as_deref(), Some("web"));
    assert!(state.reconciled().is_empty());
}

#[test]
fn lookback_for_all_leaves_lower_bound_open() {
    let range = lookback_range(NOW, OFFSET, None);
    assert_eq!(range.from, None);
    assert_eq!(range.to, Some(date!(2026 - 10 - 17)));
}

#[test]
fn progress_follows_the_group_filters() {
    let mut state = state();
    state.set_view(ActiveView::Groups);
    state.set_group_dates(DateRange::unbounded(OFFSET));
    assert_eq!(state.progress().total, state.group_view().total_items);
    assert_eq!(state.progress().total, 3);

    state.set_group_issue_status(Some(IssueStatusFilter::WithoutIssue));
    let progress = state.progress();
    assert_eq!(progress.total, state.group_view().total_items);
    assert_eq!(progress.total, 1);
    assert_eq!(progress.detected, 0);
    assert_eq!(progress.corrected, 0);

    state.set_group_issue_status(Some(IssueStatusFilter::Closed));
    let progress = state.progress();
    assert_eq!(progress.total, 1);
    assert_eq!(progress.corrected, 1);
    assert_eq!(progress.percent, 100);
}
