#![forbid(unsafe_code)]

//! Display helpers. Output strings are Spanish to match the dashboard audience.

use crate::timeutil::parse_timestamp;
use regex::Regex;
use std::sync::LazyLock;
use time::{OffsetDateTime, UtcOffset};

pub const MISSING: &str = "--";
pub const UNKNOWN_ERROR: &str = "Error desconocido";

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// `1500 -> "1.5K"`, `2000000 -> "2M"`.
pub fn format_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{}M", one_decimal(value as f64 / 1_000_000.0))
    } else if value >= 1_000 {
        format!("{}K", one_decimal(value as f64 / 1_000.0))
    } else {
        value.to_string()
    }
}

fn one_decimal(value: f64) -> String {
    let rendered = format!("{value:.1}");
    match rendered.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => rendered,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Truncates by characters and appends `...` when anything was cut.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let head: String = message.chars().take(max_chars).collect();
    format!("{head}...")
}

const URL_PATH_MAX: usize = 50;

/// Path part of a request URL, capped at 50 chars. Unparseable input is capped as-is.
pub fn truncate_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => truncate_message(parsed.path(), URL_PATH_MAX),
        Err(_) => truncate_message(raw, URL_PATH_MAX),
    }
}

/// `service-name-00072-qjd -> 00072-qjd`.
pub fn truncate_revision(revision: Option<&str>) -> String {
    let Some(revision) = revision.filter(|r| !r.is_empty()) else {
        return MISSING.to_string();
    };
    let parts: Vec<&str> = revision.split('-').collect();
    if parts.len() >= 2 {
        return parts[parts.len() - 2..].join("-");
    }
    if revision.chars().count() > 15 {
        let skip = revision.chars().count() - 15;
        return revision.chars().skip(skip).collect();
    }
    revision.to_string()
}

static ERROR_TYPE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\w+Error):",
        r"(\w+Exception):",
        r"^(Error|ERROR):",
        r"django\.db\.utils\.(\w+)",
        r"psycopg2\.(\w+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Best-effort error class from a message, falling back to its first line.
pub fn extract_error_type(message: &str) -> String {
    if message.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }
    for pattern in ERROR_TYPE_PATTERNS.iter() {
        if let Some(found) = pattern.captures(message).and_then(|c| c.get(1)) {
            return found.as_str().to_string();
        }
    }
    let first_line = message.lines().next().unwrap_or_default();
    truncate_message(first_line, 50)
}

/// Explicit type when present, otherwise extracted from the sample.
pub fn display_error_type(error_type: Option<&str>, sample_message: &str) -> String {
    match error_type.filter(|t| !t.trim().is_empty()) {
        Some(t) => t.to_string(),
        None => extract_error_type(sample_message),
    }
}

/// `17 oct 2026, 14:05` in the viewer's offset.
pub fn format_date(raw: Option<&str>, offset: UtcOffset) -> String {
    let Some(ts) = raw.and_then(parse_timestamp) else {
        return MISSING.to_string();
    };
    let local = ts.to_offset(offset);
    format!(
        "{} {} {}, {:02}:{:02}",
        local.day(),
        month_es(local),
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// `17 oct, 14:05`.
pub fn format_date_short(raw: Option<&str>, offset: UtcOffset) -> String {
    let Some(ts) = raw.and_then(parse_timestamp) else {
        return MISSING.to_string();
    };
    let local = ts.to_offset(offset);
    format!(
        "{} {}, {:02}:{:02}",
        local.day(),
        month_es(local),
        local.hour(),
        local.minute()
    )
}

fn month_es(ts: OffsetDateTime) -> &'static str {
    MONTHS_ES[usize::from(u8::from(ts.month())) - 1]
}

fn day_month(ts: OffsetDateTime, offset: UtcOffset) -> String {
    let local = ts.to_offset(offset);
    format!("{} {}", local.day(), month_es(local))
}

/// Relative age: `ahora`, `hace 5m`, `hace 3h`, `hace 2d`, then a short date.
pub fn format_time_ago(raw: Option<&str>, now: OffsetDateTime, offset: UtcOffset) -> String {
    let Some(ts) = raw.and_then(parse_timestamp) else {
        return MISSING.to_string();
    };
    let elapsed = now - ts;
    let minutes = elapsed.whole_minutes();
    let hours = elapsed.whole_hours();
    let days = hours / 24;
    if minutes < 1 {
        "ahora".to_string()
    } else if minutes < 60 {
        format!("hace {minutes}m")
    } else if hours < 24 {
        format!("hace {hours}h")
    } else if days < 7 {
        format!("hace {days}d")
    } else {
        day_month(ts, offset)
    }
}

/// Coarser variant used on service cards: `Hace minutos`, `Hace 3h`, `Hace 2d`.
pub fn format_short_ago(raw: Option<&str>, now: OffsetDateTime, offset: UtcOffset) -> String {
    let Some(ts) = raw.and_then(parse_timestamp) else {
        return MISSING.to_string();
    };
    let hours = (now - ts).whole_hours();
    let days = hours / 24;
    if hours < 1 {
        "Hace minutos".to_string()
    } else if hours < 24 {
        format!("Hace {hours}h")
    } else if days < 7 {
        format!("Hace {days}d")
    } else {
        day_month(ts, offset)
    }
}

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .filter_map(|&(pattern, replacement)| {
            Regex::new(pattern).ok().map(|pattern| Rule {
                pattern,
                replacement,
            })
        })
        .collect()
}

fn apply_rules(text: &str, rules: &[Rule]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| {
        rule.pattern.replace_all(&acc, rule.replacement).into_owned()
    })
}

static MARKDOWN_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (r"(?m)^### (.+)$", "<h4>$1</h4>"),
        (r"(?m)^## (.+)$", r#"<h3 class="analysis-section-title">$1</h3>"#),
        (r"(?m)^# (.+)$", "<h2>$1</h2>"),
        (r"\*\*(.+?)\*\*", "<strong>$1</strong>"),
        (r"```(\w+)?\n((?s:.*?))```", r#"<pre class="code-block"><code>$2</code></pre>"#),
        (r"`([^`]+)`", r#"<code class="inline-code">$1</code>"#),
        (r"(?m)^- (.+)$", "<li>$1</li>"),
        (r"(?m)^(\d+)\. (.+)$", "<li>$2</li>"),
        (r"\n\n", "</p><p>"),
        (r"\n", "<br>"),
        (r"(?s)(?:<li>.*?</li>)+", "<ul>$0</ul>"),
    ])
});

static COMPACT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (r"\*\*(.*?)\*\*", "<strong>$1</strong>"),
        (r"\n", "<br>"),
        (r"`(.*?)`", "<code>$1</code>"),
    ])
});

/// Analysis markdown to an HTML fragment. The text is escaped before any markup is added.
pub fn format_analysis_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("<p>{}</p>", apply_rules(&escape_html(text), &MARKDOWN_RULES))
}

/// Bold, inline code and line breaks only; used in the issue detail panel.
pub fn format_analysis_compact(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    apply_rules(&escape_html(text), &COMPACT_RULES)
}
