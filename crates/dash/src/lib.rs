//! # errboard
//!
//! Terminal views over the monitoring pipeline's published data: service health, consolidated
//! error groups and the issues filed for them.
//!
//! ## Configuration
//!
//! Settings are layered: an optional YAML file (`--config`), then `ERRBOARD_*` environment
//! variables, then command-line flags.
//!
//! - `ERRBOARD_DATA_DIR` - dashboard checkout containing `data/` (default: `.`)
//! - `ERRBOARD_DATA_URL` - static site serving `data/` (overrides the directory)
//! - `ERRBOARD_ISSUE_REPO` - `owner/repo` issues are filed against
//! - `ERRBOARD_GITHUB_API` - tracker API base
//! - `ERRBOARD_PAGE_SIZE` - rows per page

#![forbid(unsafe_code)]

pub mod config;
pub mod render;
pub mod run;
pub mod state;

#[cfg(test)]
mod testing;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// errboard - error monitoring dashboard for the terminal.
#[derive(Debug, Parser)]
#[command(name = "errboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML settings file.
    #[arg(long, env = "ERRBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dashboard directory containing `data/`. Ignored when a data URL is given.
    #[arg(long, env = "ERRBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the published dashboard.
    #[arg(long, env = "ERRBOARD_DATA_URL")]
    pub data_url: Option<String>,

    /// Repository issues are filed against (`owner/repo`).
    #[arg(long, env = "ERRBOARD_ISSUE_REPO")]
    pub issue_repo: Option<String>,

    /// Issue tracker API base URL.
    #[arg(long, env = "ERRBOARD_GITHUB_API")]
    pub github_api: Option<String>,

    /// Rows per page.
    #[arg(long, env = "ERRBOARD_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Skip the live issue-state lookup.
    #[arg(long)]
    pub offline: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Service health, deployments and repositories.
    Overview(OverviewArgs),
    /// Consolidated error groups and the raw error stream.
    Errors(ErrorsArgs),
    /// Issue tracking progress per error group.
    Issues(IssuesArgs),
    /// Show the stored analysis for one error group.
    Analysis(AnalysisArgs),
    /// Print a pre-filled new-issue link for one error group.
    ComposeIssue(ComposeArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Args)]
pub struct OverviewArgs {
    /// healthy, unhealthy, errors or all.
    #[arg(long, default_value = "all")]
    pub status: String,
    #[arg(long, default_value = "")]
    pub search: String,
    /// name, errors, deployments or recent.
    #[arg(long, default_value = "name")]
    pub sort: String,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ErrorsView {
    /// Groups ranked by priority score.
    #[default]
    Priority,
    /// Groups bundled per affected service.
    Service,
    /// Raw error events, newest first.
    List,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ErrorsArgs {
    #[arg(long, value_enum, default_value_t = ErrorsView::Priority)]
    pub view: ErrorsView,
    #[arg(long, default_value = "all")]
    pub service: String,
    #[arg(long, default_value = "all")]
    pub severity: String,
    /// First day (YYYY-MM-DD, local). Defaults to seven days ago.
    #[arg(long)]
    pub from: Option<String>,
    /// Last day (YYYY-MM-DD, local). Defaults to today.
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long, default_value = "")]
    pub search: String,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Period {
    #[default]
    #[value(name = "7d")]
    Week,
    #[value(name = "30d")]
    Month,
    #[value(name = "90d")]
    Quarter,
    All,
}

impl Period {
    /// Lookback in days; `None` leaves the lower bound open.
    pub fn days(self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Quarter => Some(90),
            Period::All => None,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct IssuesArgs {
    #[arg(long, default_value = "all")]
    pub service: String,
    /// high, medium, low or all.
    #[arg(long, default_value = "all")]
    pub priority: String,
    /// with-issue, without-issue, open, closed or all.
    #[arg(long, default_value = "all")]
    pub issue: String,
    /// count, recent, services or priority.
    #[arg(long, default_value = "count")]
    pub sort: String,
    #[arg(long, value_enum, default_value_t = Period::Week)]
    pub period: Period,
    /// Overrides the lower bound derived from `--period`.
    #[arg(long)]
    pub from: Option<String>,
    /// Overrides the upper bound (today).
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Error group fingerprint.
    pub hash: String,
    /// Print the HTML fragment instead of the raw markdown.
    #[arg(long)]
    pub html: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    /// Error group fingerprint.
    pub hash: String,
    /// Print the link even when the group already has an issue or is below the threshold.
    #[arg(long)]
    pub force: bool,
}
