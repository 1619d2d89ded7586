#![forbid(unsafe_code)]

use crate::config::{Config, SourceConfig};
use crate::render;
use crate::state::{ActiveView, AppState, lookback_range};
use crate::{AnalysisArgs, Commands, ComposeArgs, ErrorsArgs, ErrorsView, IssuesArgs, OverviewArgs};
use anyhow::{Context, Result, bail};
use eb_core::compose::{MIN_COUNT_FOR_ISSUE, can_open_issue, issue_title, new_issue_url};
use eb_core::filter::{DateRange, FilterParseError, parse_choice, parse_selector};
use eb_core::reconcile::ReconciledGroup;
use eb_loader::{DataSource, IssueTracker, LoadError, Page, load_snapshot};
use reqwest::Client;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, error};

/// Wall clock and the viewer's offset, captured once per invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    pub now: OffsetDateTime,
    pub offset: UtcOffset,
}

impl Clock {
    /// Must run before any thread is spawned; the local offset is unsound to query later on
    /// some platforms and falls back to UTC.
    pub fn local() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or_else(|err| {
            debug!(error = %err, "local offset unavailable; using UTC");
            UtcOffset::UTC
        });
        Self {
            now: OffsetDateTime::now_utc(),
            offset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Rendered(String),
    /// A required document failed to load; the message is user-facing.
    Unavailable(String),
}

pub fn http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!("errboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

pub fn data_source(config: &Config, client: Client) -> Result<DataSource, LoadError> {
    match &config.source {
        SourceConfig::Dir(root) => Ok(DataSource::dir(root.clone())),
        SourceConfig::Url(url) => DataSource::http(client, url),
    }
}

pub fn page_for(command: &Commands) -> Page {
    match command {
        Commands::Overview(_) => Page::Overview,
        Commands::Errors(_) | Commands::Analysis(_) => Page::Errors,
        Commands::Issues(_) | Commands::ComposeIssue(_) => Page::Issues,
    }
}

/// Replaces either side of `base` that was given explicitly. A blank value opens that side.
pub fn override_range(
    base: DateRange,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<DateRange, FilterParseError> {
    let explicit = |raw: Option<&str>, fallback| -> Result<_, FilterParseError> {
        match raw {
            None => Ok(fallback),
            Some(raw) => Ok(DateRange::parse(Some(raw), None, base.offset)?.from),
        }
    };
    Ok(DateRange {
        from: explicit(from, base.from)?,
        to: explicit(to, base.to)?,
        offset: base.offset,
    })
}

pub fn apply_overview(state: &mut AppState, args: &OverviewArgs) -> Result<(), FilterParseError> {
    state.set_view(ActiveView::Services);
    state.set_health(parse_choice(&args.status)?);
    state.set_service_search(&args.search);
    state.set_service_sort(args.sort.parse()?);
    state.go_to_page(args.page);
    Ok(())
}

pub fn apply_errors(state: &mut AppState, args: &ErrorsArgs) -> Result<(), FilterParseError> {
    state.set_view(match args.view {
        ErrorsView::List => ActiveView::Events,
        ErrorsView::Priority | ErrorsView::Service => ActiveView::Groups,
    });
    state.set_event_service(parse_selector(&args.service));
    state.set_event_severity(parse_selector(&args.severity));
    let dates = override_range(
        state.event_filter().dates,
        args.from.as_deref(),
        args.to.as_deref(),
    )?;
    state.set_event_dates(dates);
    state.set_event_search(&args.search);
    state.go_to_page(args.page);
    Ok(())
}

pub fn apply_issues(state: &mut AppState, args: &IssuesArgs) -> Result<(), FilterParseError> {
    state.set_view(ActiveView::Groups);
    state.set_group_service(parse_selector(&args.service));
    state.set_group_bucket(parse_choice(&args.priority)?);
    state.set_group_issue_status(parse_choice(&args.issue)?);
    state.set_group_sort(args.sort.parse()?);
    let period = lookback_range(state.now(), state.offset(), args.period.days());
    state.set_group_dates(override_range(
        period,
        args.from.as_deref(),
        args.to.as_deref(),
    )?);
    state.go_to_page(args.page);
    Ok(())
}

fn find_group<'s>(groups: &'s [ReconciledGroup<'s>], hash: &str) -> Result<&'s ReconciledGroup<'s>> {
    let hash = hash.trim();
    let Some(group) = groups.iter().find(|g| g.hash == hash) else {
        bail!("unknown error group: {hash}");
    };
    Ok(group)
}

fn analysis(state: &AppState, args: &AnalysisArgs, config: &Config) -> Result<String> {
    let groups = state.reconciled();
    let group = find_group(&groups, &args.hash)?;
    Ok(render::analysis(state, group, args.html, config.format)?)
}

fn compose_issue(state: &AppState, args: &ComposeArgs, config: &Config) -> Result<String> {
    let groups = state.reconciled();
    let group = find_group(&groups, &args.hash)?;
    if !args.force && !can_open_issue(group.group, group.link.has_issue) {
        if let Some(url) = group.link.issue_url.as_deref() {
            bail!("error group {} already has an issue: {url}", group.hash);
        }
        bail!(
            "error group {} has {} occurrences; issues start at {MIN_COUNT_FOR_ISSUE} (use --force)",
            group.hash,
            group.group.count
        );
    }
    let url = new_issue_url(&config.issue_repo, group.hash, group.group)
        .context("Failed to build issue link")?;
    Ok(render::compose(
        group.hash,
        &issue_title(group.hash, group.group),
        url.as_str(),
        config.format,
    )?)
}

/// Loads what `command` needs, applies its filters and renders the result.
pub async fn execute(command: &Commands, config: &Config, clock: Clock) -> Result<Outcome> {
    let client = http_client(config)?;
    let source = data_source(config, client.clone())?;
    let page = page_for(command);
    let tracker = (config.live_issue_states && matches!(command, Commands::Issues(_)))
        .then(|| IssueTracker::new(client, &config.github_api, &config.issue_repo));

    let snapshot = match load_snapshot(&source, page, tracker.as_ref()).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, source = %source.describe(), "required data unavailable");
            return Ok(Outcome::Unavailable(render::unavailable(&err)));
        }
    };
    let mut state = AppState::new(snapshot, clock.now, clock.offset, config.page_size);

    let body = match command {
        Commands::Overview(args) => {
            apply_overview(&mut state, args)?;
            render::overview(&state, config.format)?
        }
        Commands::Errors(args) => {
            apply_errors(&mut state, args)?;
            match args.view {
                ErrorsView::Priority => render::errors_priority(&state, config.format)?,
                ErrorsView::Service => render::errors_by_service(&state, config.format)?,
                ErrorsView::List => render::errors_list(&state, config.format)?,
            }
        }
        Commands::Issues(args) => {
            apply_issues(&mut state, args)?;
            render::issues(&state, config.format)?
        }
        Commands::Analysis(args) => analysis(&state, args, config)?,
        Commands::ComposeIssue(args) => compose_issue(&state, args, config)?,
    };
    Ok(Outcome::Rendered(body))
}
