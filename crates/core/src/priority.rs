#![forbid(unsafe_code)]

//! Urgency ranking for consolidated error groups.
//!
//! The score only orders groups against each other; it has no absolute meaning.

use crate::model::ConsolidatedErrorGroup;
use crate::timeutil::{hours_since, parse_optional};
use std::str::FromStr;
use time::OffsetDateTime;

pub const SEVERE_TERM: u64 = 300;
pub const BASELINE_TERM: u64 = 200;
pub const LAST_DAY_TERM: u64 = 100;
pub const LAST_WEEK_TERM: u64 = 50;

const SEVERE_KEYWORDS: &[&str] = &["CRITICAL", "OperationalError", "Connection"];

pub fn severity_term(group: &ConsolidatedErrorGroup) -> u64 {
    let in_type = |kw: &str| group.error_type.as_deref().is_some_and(|t| t.contains(kw));
    let in_message = |kw: &str| group.sample_message.contains(kw);
    if SEVERE_KEYWORDS.iter().any(|kw| in_type(kw) || in_message(kw)) {
        SEVERE_TERM
    } else {
        BASELINE_TERM
    }
}

pub fn recency_term(group: &ConsolidatedErrorGroup, now: OffsetDateTime) -> u64 {
    let Some(last_seen) = parse_optional(group.last_seen.as_deref()) else {
        return 0;
    };
    let hours = hours_since(last_seen, now);
    if hours < 24.0 {
        LAST_DAY_TERM
    } else if hours < 168.0 {
        LAST_WEEK_TERM
    } else {
        0
    }
}

/// `count + severity + recency`. Monotonic in each term.
pub fn score(group: &ConsolidatedErrorGroup, now: OffsetDateTime) -> u64 {
    group
        .count
        .saturating_add(severity_term(group))
        .saturating_add(recency_term(group, now))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityLevel {
    pub fn from_score(score: u64) -> Self {
        if score >= 500 {
            Self::Critical
        } else if score >= 300 {
            Self::High
        } else if score >= 150 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICO",
            Self::High => "ALTO",
            Self::Medium => "MEDIO",
            Self::Low => "BAJO",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::High => "🟠",
            Self::Medium => "🟡",
            Self::Low => "🟢",
        }
    }
}

/// Occurrence-count buckets used by the issues view filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityBucket {
    High,
    Medium,
    Low,
}

impl PriorityBucket {
    pub const HIGH_MIN: u64 = 50;
    pub const MEDIUM_MIN: u64 = 10;
    pub const LOW_MIN: u64 = 3;

    /// `None` below the low threshold.
    pub fn for_count(count: u64) -> Option<Self> {
        if count >= Self::HIGH_MIN {
            Some(Self::High)
        } else if count >= Self::MEDIUM_MIN {
            Some(Self::Medium)
        } else if count >= Self::LOW_MIN {
            Some(Self::Low)
        } else {
            None
        }
    }

    /// Card tier: everything under the medium threshold reads as low.
    pub fn display_for_count(count: u64) -> Self {
        Self::for_count(count).unwrap_or(Self::Low)
    }

    pub fn contains(self, count: u64) -> bool {
        Self::for_count(count) == Some(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "Alta",
            Self::Medium => "Media",
            Self::Low => "Baja",
        }
    }
}

impl FromStr for PriorityBucket {
    type Err = crate::filter::FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(crate::filter::FilterParseError::unknown("priority", other)),
        }
    }
}
