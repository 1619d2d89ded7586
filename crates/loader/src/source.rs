#![forbid(unsafe_code)]

use crate::error::LoadError;
use crate::resource::Resource;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::debug;

/// Where the pipeline documents live.
#[derive(Clone, Debug)]
pub enum DataSource {
    /// Static hosting; every request carries a `?t=<unix ms>` cache-buster.
    Http { client: Client, base_url: Url },
    /// A checkout of the dashboard with its `data/` directory.
    Dir { root: PathBuf },
}

impl DataSource {
    pub fn http(client: Client, base_url: &str) -> Result<Self, LoadError> {
        let trimmed = base_url.trim();
        // `Url::join` drops the last segment unless the base ends with a slash.
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        let base_url = Url::parse(&normalized).map_err(|err| LoadError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(LoadError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: "scheme must be http or https".to_string(),
            });
        }
        Ok(Self::Http { client, base_url })
    }

    pub fn dir(root: impl Into<PathBuf>) -> Self {
        Self::Dir { root: root.into() }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http { base_url, .. } => base_url.to_string(),
            Self::Dir { root } => root.display().to_string(),
        }
    }

    /// Request URL for `resource`, cache-busted with `millis`.
    pub fn resource_url(base_url: &Url, resource: Resource, millis: i128) -> Result<Url, LoadError> {
        let mut url = base_url
            .join(&resource.relative_path())
            .map_err(|err| LoadError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: err.to_string(),
            })?;
        url.query_pairs_mut().append_pair("t", &millis.to_string());
        Ok(url)
    }

    pub async fn fetch_bytes(&self, resource: Resource) -> Result<Vec<u8>, LoadError> {
        match self {
            Self::Http { client, base_url } => {
                let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
                let url = Self::resource_url(base_url, resource, millis)?;
                debug!(%resource, %url, "fetching");
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|source| LoadError::Http { resource, source })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status { resource, status });
                }
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| LoadError::Http { resource, source })?;
                Ok(body.to_vec())
            }
            Self::Dir { root } => {
                let path = root.join(resource.relative_path());
                debug!(%resource, path = %path.display(), "reading");
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| LoadError::Io { resource, source })
            }
        }
    }

    pub async fn fetch<T: DeserializeOwned>(&self, resource: Resource) -> Result<T, LoadError> {
        let bytes = self.fetch_bytes(resource).await?;
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Decode { resource, source })
    }
}
