//! Error types for twine-update
//!
//! Failures are closed enums so callers can match exhaustively:
//! [`RegistryError`] covers every outcome of talking to the release registry,
//! [`UpdateError`] adds asset selection and installation failures, and
//! [`UpdateFailure`] pins an [`UpdateError`] to the stage that produced it.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::updater::UpdateStage;

/// Result type alias using twine-update's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Outcome of a failed exchange with the release registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Requested release or tag does not exist (HTTP 404)
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// API quota exhausted (HTTP 403 with `x-ratelimit-remaining: 0`)
    #[error("Rate limit exceeded for {resource}")]
    RateLimited { resource: String },

    /// Access denied for a reason other than quota (HTTP 403)
    #[error("Access forbidden: {resource}")]
    Forbidden { resource: String },

    /// Any other non-success status on a metadata request
    #[error("Unexpected HTTP status {status} from {resource}")]
    Status { status: u16, resource: String },

    /// Asset download failed
    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// Response body was not the expected JSON document
    #[error("Failed to decode response from {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configured registry URL cannot be used as a base URL
    #[error("Invalid registry URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection failure or request timeout on a metadata request
    #[error("Request to {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },
}

impl RegistryError {
    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a download error
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while checking for or applying an update
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Release registry failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Release has no asset built for the running platform
    #[error("Release {tag} has no binary for this platform (expected asset {asset})")]
    NoBinaryForPlatform { tag: String, asset: String },

    /// Downloaded asset failed size or checksum verification
    #[error("Verification of {asset} failed: {detail}")]
    Integrity { asset: String, detail: String },

    /// Install path cannot be written by the current user
    #[error("Permission denied: cannot write to {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// Generic filesystem failure during install
    #[error("{context} ({}): {source}", path.display())]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Staged binary on disk does not match the downloaded length
    #[error("Short write to {}: expected {expected} bytes, found {actual}", path.display())]
    ShortWrite {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

impl UpdateError {
    /// Create an I/O error with context
    pub fn io(context: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.into(),
            source,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(err) => match err {
                RegistryError::NotFound { .. } => ErrorKind::NotFound,
                RegistryError::RateLimited { .. } => ErrorKind::RateLimited,
                RegistryError::Forbidden { .. } => ErrorKind::Forbidden,
                RegistryError::Status { .. }
                | RegistryError::Transport { .. }
                | RegistryError::InvalidUrl { .. } => ErrorKind::Protocol,
                RegistryError::Download { .. } => ErrorKind::Download,
                RegistryError::Decode { .. } => ErrorKind::Decode,
            },
            Self::NoBinaryForPlatform { .. } => ErrorKind::NoBinaryForPlatform,
            Self::Integrity { .. } => ErrorKind::Download,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Io { .. } | Self::ShortWrite { .. } => ErrorKind::Io,
        }
    }
}

/// Coarse failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    RateLimited,
    Forbidden,
    Protocol,
    Decode,
    Download,
    NoBinaryForPlatform,
    PermissionDenied,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not-found",
            Self::RateLimited => "rate-limited",
            Self::Forbidden => "forbidden",
            Self::Protocol => "protocol",
            Self::Decode => "decode",
            Self::Download => "download",
            Self::NoBinaryForPlatform => "no-binary-for-platform",
            Self::PermissionDenied => "permission-denied",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

/// A failed update workflow: the stage that failed and why
#[derive(Error, Debug)]
#[error("Update failed while {stage}: {error}")]
pub struct UpdateFailure {
    /// Stage the workflow was in when it failed
    pub stage: UpdateStage,

    /// Originating error
    #[source]
    pub error: UpdateError,
}

impl UpdateFailure {
    pub fn new(stage: UpdateStage, error: impl Into<UpdateError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    /// Classification of the originating error
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
