#![forbid(unsafe_code)]

//! View state for one dashboard session.
//!
//! The raw snapshot is never modified; every view is recomputed from it with the active
//! filters, so changing a filter can never leave a stale subset behind.

use eb_core::filter::{DateRange, EventFilter, GroupFilter, SearchText, ServiceFilter};
use eb_core::model::{RawErrorEvent, ServiceRecord};
use eb_core::paginate::{PageSlot, page_window, paginate, total_pages};
use eb_core::reconcile::{ProgressMetrics, ReconciledGroup, reconcile_groups};
use eb_core::sort::{sort_events, sort_groups, sort_services};
use eb_core::summary::{
    ErrorsSummary, IssuesSummary, OverviewSummary, service_options_from_events,
    service_options_from_groups,
};
use eb_core::timeutil::{days_before, local_today};
use eb_core::{
    GroupSortKey, HealthFilter, IssueStatusFilter, PriorityBucket, ServiceSortKey,
};
use eb_loader::Snapshot;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

/// Lookback applied to date-filtered views until the user picks a range.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Which paginated list the page cursor belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Services,
    Events,
    Groups,
}

/// One page of a recomputed view.
#[derive(Clone, Debug, Serialize)]
pub struct PagedView<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 0-based position of `items[0]` in the filtered set.
    pub offset: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub window: Vec<PageSlot>,
}

impl<T: Clone> PagedView<T> {
    fn build(all: &[T], requested: usize, page_size: usize) -> Self {
        let page = paginate(all, requested, page_size);
        Self {
            items: page.items.to_vec(),
            page: page.number,
            total_pages: page.total_pages,
            total_items: page.total_items,
            offset: page.offset,
            has_prev: page.has_prev,
            has_next: page.has_next,
            window: page_window(page.number, page.total_pages),
        }
    }
}

/// Default `[today - days, today]` window in local dates.
pub fn lookback_range(now: OffsetDateTime, offset: UtcOffset, days: Option<i64>) -> DateRange {
    let today = local_today(now, offset);
    DateRange {
        from: days.map(|days| days_before(today, days)),
        to: Some(today),
        offset,
    }
}

#[derive(Debug)]
pub struct AppState {
    snapshot: Snapshot,
    now: OffsetDateTime,
    offset: UtcOffset,
    page_size: usize,
    page: usize,
    view: ActiveView,
    service_filter: ServiceFilter,
    service_sort: ServiceSortKey,
    event_filter: EventFilter,
    group_filter: GroupFilter,
    group_sort: GroupSortKey,
}

impl AppState {
    pub fn new(snapshot: Snapshot, now: OffsetDateTime, offset: UtcOffset, page_size: usize) -> Self {
        let dates = lookback_range(now, offset, Some(DEFAULT_LOOKBACK_DAYS));
        Self {
            snapshot,
            now,
            offset,
            page_size: page_size.max(1),
            page: 1,
            view: ActiveView::default(),
            service_filter: ServiceFilter::default(),
            service_sort: ServiceSortKey::default(),
            event_filter: EventFilter {
                dates,
                ..EventFilter::default()
            },
            group_filter: GroupFilter {
                dates,
                ..GroupFilter::default()
            },
            group_sort: GroupSortKey::Count,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn now(&self) -> OffsetDateTime {
        self.now
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    pub fn event_filter(&self) -> &EventFilter {
        &self.event_filter
    }

    pub fn group_filter(&self) -> &GroupFilter {
        &self.group_filter
    }

    /// Swaps in a fresh load. Filters survive; the page is re-clamped on the next view.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot, now: OffsetDateTime) {
        self.snapshot = snapshot;
        self.now = now;
    }

    pub fn set_view(&mut self, view: ActiveView) {
        self.view = view;
        self.page = 1;
    }

    pub fn set_health(&mut self, health: Option<HealthFilter>) {
        self.service_filter.health = health;
        self.page = 1;
    }

    pub fn set_service_search(&mut self, search: &str) {
        self.service_filter.search = SearchText::new(search);
        self.page = 1;
    }

    pub fn set_service_sort(&mut self, key: ServiceSortKey) {
        self.service_sort = key;
        self.page = 1;
    }

    pub fn set_event_service(&mut self, service: Option<String>) {
        self.event_filter.service = service;
        self.page = 1;
    }

    pub fn set_event_severity(&mut self, severity: Option<String>) {
        self.event_filter.severity = severity;
        self.page = 1;
    }

    pub fn set_event_dates(&mut self, dates: DateRange) {
        self.event_filter.dates = dates;
        self.page = 1;
    }

    pub fn set_event_search(&mut self, search: &str) {
        self.event_filter.search = SearchText::new(search);
        self.page = 1;
    }

    pub fn set_group_service(&mut self, service: Option<String>) {
        self.group_filter.service = service;
        self.page = 1;
    }

    pub fn set_group_bucket(&mut self, bucket: Option<PriorityBucket>) {
        self.group_filter.bucket = bucket;
        self.page = 1;
    }

    pub fn set_group_issue_status(&mut self, status: Option<IssueStatusFilter>) {
        self.group_filter.issue_status = status;
        self.page = 1;
    }

    pub fn set_group_dates(&mut self, dates: DateRange) {
        self.group_filter.dates = dates;
        self.page = 1;
    }

    pub fn set_group_search(&mut self, search: &str) {
        self.group_filter.search = SearchText::new(search);
        self.page = 1;
    }

    pub fn set_group_sort(&mut self, key: GroupSortKey) {
        self.group_sort = key;
        self.page = 1;
    }

    fn active_total_pages(&self) -> usize {
        let items = match self.view {
            ActiveView::Services => self.filtered_services().len(),
            ActiveView::Events => self.filtered_events().len(),
            ActiveView::Groups => {
                let all = self.reconciled();
                self.group_filter.apply(&all).len()
            }
        };
        total_pages(items, self.page_size)
    }

    /// Clamped into the active view's page range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.active_total_pages().max(1));
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    fn filtered_services(&self) -> Vec<&ServiceRecord> {
        let mut services = self.service_filter.apply(&self.snapshot.services);
        sort_services(&mut services, self.service_sort);
        services
    }

    fn filtered_events(&self) -> Vec<&RawErrorEvent> {
        let mut events = self.event_filter.apply(&self.snapshot.errors);
        sort_events(&mut events);
        events
    }

    /// Every consolidated group joined with its issue link, analysis and score.
    pub fn reconciled(&self) -> Vec<ReconciledGroup<'_>> {
        reconcile_groups(
            &self.snapshot.consolidated,
            &self.snapshot.created_issues,
            &self.snapshot.issue_states,
            &self.snapshot.analyses,
            self.now,
        )
    }

    pub fn service_view(&self) -> PagedView<&ServiceRecord> {
        PagedView::build(&self.filtered_services(), self.page, self.page_size)
    }

    pub fn event_view(&self) -> PagedView<&RawErrorEvent> {
        PagedView::build(&self.filtered_events(), self.page, self.page_size)
    }

    pub fn group_view(&self) -> PagedView<ReconciledGroup<'_>> {
        let all = self.reconciled();
        let mut view = self.group_filter.apply(&all);
        sort_groups(&mut view, self.group_sort);
        let owned: Vec<ReconciledGroup<'_>> = view.into_iter().cloned().collect();
        PagedView::build(&owned, self.page, self.page_size)
    }

    /// Unpaginated groups for the priority and per-service error views. Only the service
    /// selector applies there; those views are not date-bounded.
    pub fn ranked_groups(&self) -> Vec<ReconciledGroup<'_>> {
        let filter = GroupFilter {
            service: self.event_filter.service.clone(),
            ..GroupFilter::default()
        };
        let all = self.reconciled();
        let mut view = filter.apply(&all);
        sort_groups(&mut view, GroupSortKey::Priority);
        view.into_iter().cloned().collect()
    }

    /// Choices for the errors-page service selector, taken from the raw events.
    pub fn event_service_options(&self) -> Vec<String> {
        service_options_from_events(&self.snapshot.errors)
    }

    /// Choices for the issues-page service selector.
    pub fn group_service_options(&self) -> Vec<String> {
        service_options_from_groups(&self.snapshot.consolidated)
    }

    pub fn overview_summary(&self) -> OverviewSummary {
        OverviewSummary::resolve(
            Some(&self.snapshot.meta),
            &self.snapshot.services,
            &self.snapshot.repos,
        )
    }

    pub fn errors_summary(&self) -> ErrorsSummary {
        ErrorsSummary::from_groups(&self.snapshot.consolidated)
    }

    pub fn issues_summary(&self) -> IssuesSummary {
        IssuesSummary::compute(
            &self.snapshot.consolidated,
            &self.snapshot.created_issues,
            &self.snapshot.analyses,
        )
    }

    /// Correction progress over the groups the issues view currently shows.
    pub fn progress(&self) -> ProgressMetrics {
        let all = self.reconciled();
        ProgressMetrics::over(self.group_filter.apply(&all))
    }
}

#[cfg(test)]
mod tests;
