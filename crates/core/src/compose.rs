#![forbid(unsafe_code)]

//! Pre-filled "new issue" links. Opening the link is left to the user; nothing is written to
//! the tracker from here.

use crate::format::display_error_type;
use crate::model::ConsolidatedErrorGroup;
use url::Url;

pub const GITHUB_WEB: &str = "https://github.com";
pub const SAMPLE_MESSAGE_MAX: usize = 2000;
pub const MANUAL_LABELS: &str = "bug,manual";

/// Groups below this count do not get a create-issue action.
pub const MIN_COUNT_FOR_ISSUE: u64 = 3;

pub fn issue_id(hash: &str) -> String {
    format!("ERROR-{hash}")
}

pub fn issue_title(hash: &str, group: &ConsolidatedErrorGroup) -> String {
    let error_type = display_error_type(group.error_type.as_deref(), &group.sample_message);
    format!("[{}] {error_type}", issue_id(hash))
}

pub fn issue_body(hash: &str, group: &ConsolidatedErrorGroup) -> String {
    let error_type = display_error_type(group.error_type.as_deref(), &group.sample_message);
    let sample: String = group.sample_message.chars().take(SAMPLE_MESSAGE_MAX).collect();
    format!(
        "## Error Report\n\n\
**ID:** `{id}`\n\
**Tipo:** {error_type}\n\
**Ocurrencias:** {count}\n\
**Servicios:** {services}\n\n\
### Mensaje de Error\n\
```\n{sample}\n```\n\n\
---\n\
*Creado desde el dashboard de monitoreo*\n",
        id = issue_id(hash),
        count = group.count,
        services = group.services.join(", "),
    )
}

pub fn can_open_issue(group: &ConsolidatedErrorGroup, has_issue: bool) -> bool {
    !has_issue && group.count >= MIN_COUNT_FOR_ISSUE
}

/// `https://github.com/<owner>/<repo>/issues/new?title=..&body=..&labels=bug,manual`.
pub fn new_issue_url(
    repo: &str,
    hash: &str,
    group: &ConsolidatedErrorGroup,
) -> Result<Url, url::ParseError> {
    let base = format!("{GITHUB_WEB}/{}/issues/new", repo.trim_matches('/'));
    Url::parse_with_params(
        &base,
        &[
            ("title", issue_title(hash, group)),
            ("body", issue_body(hash, group)),
            ("labels", MANUAL_LABELS.to_string()),
        ],
    )
}

#[cfg(test)]
mod tests;
