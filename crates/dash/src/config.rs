#![forbid(unsafe_code)]

//! Layered settings: YAML file, then environment, then flags. Clap already folds the
//! environment into the flag values, so resolution here only has two layers to merge.

use crate::{Cli, OutputFormat};
use eb_core::PAGE_SIZE;
use eb_loader::{DEFAULT_API_BASE, DEFAULT_ISSUE_REPO};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATA_DIR: &str = ".";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// On-disk shape. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub data_url: Option<String>,
    pub issue_repo: Option<String>,
    pub github_api: Option<String>,
    pub page_size: Option<usize>,
    pub http_timeout_secs: Option<u64>,
    pub live_issue_states: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceConfig {
    Dir(PathBuf),
    Url(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    pub issue_repo: String,
    pub github_api: String,
    pub page_size: usize,
    pub http_timeout: Duration,
    pub live_issue_states: bool,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::Dir(PathBuf::from(DEFAULT_DATA_DIR)),
            issue_repo: DEFAULT_ISSUE_REPO.to_string(),
            github_api: DEFAULT_API_BASE.to_string(),
            page_size: PAGE_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            live_issue_states: true,
            format: OutputFormat::Text,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `owner/repo` with both segments present; surrounding slashes are dropped.
fn normalize_repo(raw: &str) -> Option<String> {
    let (owner, repo) = raw.trim().trim_matches('/').split_once('/')?;
    let valid = |segment: &str| {
        !segment.is_empty() && !segment.contains('/') && !segment.chars().any(char::is_whitespace)
    };
    (valid(owner) && valid(repo)).then(|| format!("{owner}/{repo}"))
}

impl Config {
    /// Reads `--config` when given and merges it under the flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let source = match (cli.data_url.clone(), cli.data_dir.clone()) {
            (Some(url), _) => SourceConfig::Url(url),
            (None, Some(dir)) => SourceConfig::Dir(dir),
            (None, None) => match (non_blank(file.data_url), file.data_dir) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::Invalid("set either data_dir or data_url, not both"));
                }
                (Some(url), None) => SourceConfig::Url(url),
                (None, Some(dir)) => SourceConfig::Dir(dir),
                (None, None) => defaults.source,
            },
        };

        let page_size = cli.page_size.or(file.page_size).unwrap_or(defaults.page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid("page_size must be between 1 and 500"));
        }

        let issue_repo = non_blank(cli.issue_repo.clone())
            .or(non_blank(file.issue_repo))
            .unwrap_or(defaults.issue_repo);
        let issue_repo = normalize_repo(&issue_repo)
            .ok_or(ConfigError::Invalid("issue_repo must look like owner/repo"))?;

        let http_timeout = match file.http_timeout_secs {
            Some(0) => return Err(ConfigError::Invalid("http_timeout_secs must be positive")),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.http_timeout,
        };

        Ok(Self {
            source,
            issue_repo,
            github_api: non_blank(cli.github_api.clone())
                .or(non_blank(file.github_api))
                .unwrap_or(defaults.github_api),
            page_size,
            http_timeout,
            live_issue_states: !cli.offline
                && file.live_issue_states.unwrap_or(defaults.live_issue_states),
            format: cli.format,
        })
    }
}
