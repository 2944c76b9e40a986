//! GitHub releases access
//!
//! [`ReleaseSource`] is the seam the updater depends on; [`GitHubReleaseClient`]
//! implements it against the GitHub REST API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::UpdateConfig;
use crate::error::RegistryError;

/// Maximum number of releases returned by [`ReleaseSource::list_releases`]
pub const RELEASES_PAGE_CAP: usize = 100;

/// Accept header for release metadata
const METADATA_ACCEPT: &str = "application/vnd.github+json";

/// Accept header for asset downloads
const ASSET_ACCEPT: &str = "application/octet-stream";

/// Header reporting the remaining API quota
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Upper bound on the buffer reserved from a response's `Content-Length`
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Release information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v1.4.0")
    pub tag_name: String,

    /// Display name
    pub name: Option<String>,

    /// Whether this is a prerelease
    #[serde(default)]
    pub prerelease: bool,

    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,

    /// Release assets, in registry order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Display name, falling back to the tag
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.tag_name)
    }

    /// Find an asset by exact name
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// Release asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// File name
    pub name: String,

    /// Download URL
    pub browser_download_url: String,

    /// Size in bytes
    pub size: u64,
}

/// Source of releases and their assets
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Most recent non-prerelease release
    async fn get_latest_release(&self) -> Result<Release, RegistryError>;

    /// Release with exactly this tag
    async fn get_release(&self, tag: &str) -> Result<Release, RegistryError>;

    /// Up to [`RELEASES_PAGE_CAP`] releases, newest first
    async fn list_releases(&self) -> Result<Vec<Release>, RegistryError>;

    /// Raw bytes of one asset
    async fn download_asset(&self, url: &str) -> Result<Vec<u8>, RegistryError>;
}

/// Classified HTTP response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    NotFound,
    RateLimited,
    Forbidden,
    Other(u16),
}

fn classify(status: StatusCode, headers: &HeaderMap) -> StatusClass {
    if status.is_success() {
        return StatusClass::Success;
    }

    match status {
        StatusCode::NOT_FOUND => StatusClass::NotFound,
        StatusCode::FORBIDDEN => {
            let exhausted = headers
                .get(RATE_LIMIT_REMAINING)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.trim() == "0");
            if exhausted {
                StatusClass::RateLimited
            } else {
                StatusClass::Forbidden
            }
        }
        other => StatusClass::Other(other.as_u16()),
    }
}

/// GitHub releases client
pub struct GitHubReleaseClient {
    /// HTTP client with user agent and timeout applied
    client: reqwest::Client,

    /// Base URL of the releases collection
    releases_url: Url,

    /// Bearer token for metadata requests
    token: Option<String>,

    /// Render a progress bar while downloading
    show_progress: bool,
}

impl GitHubReleaseClient {
    /// Create a client from configuration
    pub fn new(config: &UpdateConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()
            .map_err(|source| RegistryError::Transport {
                resource: "HTTP client".to_string(),
                source,
            })?;

        let raw = format!("{}/repos/", config.api_url.trim_end_matches('/'));
        let mut releases_url =
            Url::parse(&raw).map_err(|e| RegistryError::invalid_url(&raw, e.to_string()))?;
        releases_url
            .path_segments_mut()
            .map_err(|_| RegistryError::invalid_url(&raw, "not a base URL"))?
            .pop_if_empty()
            .extend([config.repo_owner.as_str(), config.repo_name.as_str(), "releases"]);

        Ok(Self {
            client,
            releases_url,
            token: config.token.clone(),
            show_progress: false,
        })
    }

    /// Enable or disable the download progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Base URL of the releases collection
    pub fn releases_url(&self) -> &str {
        self.releases_url.as_str()
    }

    /// Releases URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.releases_url.clone();
        // Checked in `new`: the base URL always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
    ) -> Result<T, RegistryError> {
        debug!("Fetching {} from: {}", resource, url);

        let mut request = self.client.get(url).header(ACCEPT, METADATA_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let transport = |source: reqwest::Error| RegistryError::Transport {
            resource: resource.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;

        match classify(response.status(), response.headers()) {
            StatusClass::Success => {}
            StatusClass::NotFound => return Err(RegistryError::not_found(resource)),
            StatusClass::RateLimited => {
                return Err(RegistryError::RateLimited {
                    resource: resource.to_string(),
                })
            }
            StatusClass::Forbidden => {
                return Err(RegistryError::Forbidden {
                    resource: resource.to_string(),
                })
            }
            StatusClass::Other(status) => {
                return Err(RegistryError::Status {
                    status,
                    resource: resource.to_string(),
                })
            }
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| RegistryError::Decode {
            resource: resource.to_string(),
            source,
        })
    }

    fn progress_bar(&self, total: Option<u64>) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = match total {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }

    async fn read_body(&self, url: &str, response: Response) -> Result<Vec<u8>, RegistryError> {
        let total = response.content_length();
        let progress = self.progress_bar(total);

        let reserve = total.map_or(0, |len| len.min(MAX_PREALLOCATION));
        let mut body = Vec::with_capacity(reserve as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes =
                chunk.map_err(|e| RegistryError::download(url, e.to_string()))?;
            body.extend_from_slice(&chunk);

            if let Some(pb) = &progress {
                pb.set_position(body.len() as u64);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(body)
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseClient {
    async fn get_latest_release(&self) -> Result<Release, RegistryError> {
        let url = self.endpoint(&["latest"]);
        self.get_json(url.as_str(), "latest release").await
    }

    async fn get_release(&self, tag: &str) -> Result<Release, RegistryError> {
        let url = self.endpoint(&["tags", tag]);
        self.get_json(url.as_str(), &format!("release {}", tag)).await
    }

    async fn list_releases(&self) -> Result<Vec<Release>, RegistryError> {
        let mut url = self.releases_url.clone();
        url.query_pairs_mut()
            .append_pair("per_page", &RELEASES_PAGE_CAP.to_string());
        let mut releases: Vec<Release> = self.get_json(url.as_str(), "release list").await?;
        releases.truncate(RELEASES_PAGE_CAP);
        Ok(releases)
    }

    async fn download_asset(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        debug!("Downloading asset from: {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, ASSET_ACCEPT)
            .send()
            .await
            .map_err(|e| RegistryError::download(url, e.to_string()))?;

        match classify(response.status(), response.headers()) {
            StatusClass::Success => {}
            StatusClass::NotFound => return Err(RegistryError::not_found(url)),
            StatusClass::RateLimited => {
                return Err(RegistryError::RateLimited {
                    resource: url.to_string(),
                })
            }
            StatusClass::Forbidden => {
                return Err(RegistryError::Forbidden {
                    resource: url.to_string(),
                })
            }
            StatusClass::Other(status) => {
                return Err(RegistryError::download(url, format!("HTTP {}", status)))
            }
        }

        let body = self.read_body(url, response).await?;
        debug!("Downloaded {} bytes", body.len());
        Ok(body)
    }
}
