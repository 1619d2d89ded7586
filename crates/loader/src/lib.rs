#![forbid(unsafe_code)]

//! Snapshot loading for the errboard views.
//!
//! A page declares which pipeline documents it cannot render without and which ones it can
//! live without. Everything is fetched concurrently; a missing optional document degrades to
//! an empty collection, a missing required one fails the whole load.

mod error;
mod resource;
mod snapshot;
mod source;
mod tracker;

pub use error::LoadError;
pub use resource::{Page, Resource};
pub use snapshot::{Snapshot, load_snapshot};
pub use source::DataSource;
pub use tracker::{DEFAULT_API_BASE, DEFAULT_ISSUE_REPO, IssueTracker, parse_issue_states};
