#![forbid(unsafe_code)]

use crate::resource::Resource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid data url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("{resource}: io: {source}")]
    Io {
        resource: Resource,
        #[source]
        source: std::io::Error,
    },
    #[error("{resource}: http: {source}")]
    Http {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },
    #[error("{resource}: unexpected status {status}")]
    Status {
        resource: Resource,
        status: reqwest::StatusCode,
    },
    #[error("{resource}: invalid json: {source}")]
    Decode {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::InvalidBaseUrl { .. } => None,
            Self::Io { resource, .. }
            | Self::Http { resource, .. }
            | Self::Status { resource, .. }
            | Self::Decode { resource, .. } => Some(*resource),
        }
    }

    /// True when the document simply is not there (404 or missing file).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Status { status, .. } => *status == reqwest::StatusCode::NOT_FOUND,
            _ => false,
        }
    }
}
