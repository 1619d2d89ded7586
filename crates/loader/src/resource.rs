#![forbid(unsafe_code)]

use std::fmt;

/// Documents published by the data pipeline under `data/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Services,
    Repos,
    Meta,
    Errors,
    ConsolidatedErrors,
    ErrorAnalyses,
    CreatedIssues,
}

impl Resource {
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Services => "services.json",
            Resource::Repos => "repos.json",
            Resource::Meta => "meta.json",
            Resource::Errors => "errors.json",
            Resource::ConsolidatedErrors => "consolidated_errors.json",
            Resource::ErrorAnalyses => "error_analyses.json",
            Resource::CreatedIssues => "created_issues.json",
        }
    }

    /// Path relative to the dashboard root, e.g. `data/meta.json`.
    pub fn relative_path(self) -> String {
        format!("data/{}", self.file_name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data/{}", self.file_name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Overview,
    Errors,
    Issues,
}

impl Page {
    pub fn required(self) -> &'static [Resource] {
        match self {
            Page::Overview => &[Resource::Services, Resource::Meta],
            Page::Errors => &[Resource::ConsolidatedErrors, Resource::Meta],
            // A board with no consolidation run yet still lists its (empty) issues.
            Page::Issues => &[Resource::Meta],
        }
    }

    pub fn optional(self) -> &'static [Resource] {
        match self {
            Page::Overview => &[Resource::Repos],
            Page::Errors => &[Resource::Errors, Resource::ErrorAnalyses],
            Page::Issues => &[
                Resource::ConsolidatedErrors,
                Resource::ErrorAnalyses,
                Resource::CreatedIssues,
            ],
        }
    }

    pub fn is_required(self, resource: Resource) -> bool {
        self.required().contains(&resource)
    }

    pub fn uses(self, resource: Resource) -> bool {
        self.is_required(resource) || self.optional().contains(&resource)
    }

    /// Only the issues page cross-references the live tracker.
    pub fn wants_issue_states(self) -> bool {
        matches!(self, Page::Issues)
    }
}
