#![forbid(unsafe_code)]

//! Pure engine behind the errboard views: records, filters, scoring, ordering, pagination and
//! issue reconciliation. Nothing here performs I/O or reads the clock; callers pass `now` and
//! the viewer's UTC offset explicitly.

pub mod compose;
pub mod filter;
pub mod format;
pub mod model;
pub mod paginate;
pub mod priority;
pub mod reconcile;
pub mod sort;
pub mod summary;
pub mod timeutil;

pub use filter::{
    DateRange, EventFilter, FilterParseError, Filterable, GroupFilter, HealthFilter,
    IssueStatusFilter, SearchText, ServiceFilter, parse_choice, parse_selector,
};
pub use paginate::{PAGE_SIZE, Page, PageSlot, page_window, paginate};
pub use priority::{PriorityBucket, PriorityLevel, score};
pub use reconcile::{IssueLink, ProgressMetrics, ReconciledGroup, reconcile_groups};
pub use sort::{GroupSortKey, ServiceSortKey};
