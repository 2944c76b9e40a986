//! Check-only and full-update workflows
//!
//! A full update walks `ResolvingRelease → Comparing → SelectingAsset →
//! Downloading → Verifying → Installing → Done`. Any failure aborts the
//! workflow with an [`UpdateFailure`] naming the stage; nothing on disk is
//! touched before `Installing`, and the installer itself is all-or-nothing.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::UpdateConfig;
use crate::error::{RegistryError, UpdateError, UpdateFailure};
use crate::installer::BinaryInstaller;
use crate::platform::{select_asset, Platform};
use crate::releases::{Asset, GitHubReleaseClient, Release, ReleaseSource};
use crate::version;

/// Suffix of the optional digest file published next to each binary
const CHECKSUM_SUFFIX: &str = ".sha256";

/// Stage of an update workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    ResolvingRelease,
    Comparing,
    SelectingAsset,
    Downloading,
    Verifying,
    Installing,
    Done,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ResolvingRelease => "resolving release",
            Self::Comparing => "comparing versions",
            Self::SelectingAsset => "selecting asset",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying download",
            Self::Installing => "installing",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Caller-supplied parameters for [`Updater::update`]
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Version of the installed binary
    pub current_version: String,

    /// Release tag to install; latest non-prerelease when absent
    pub target_version: Option<String>,

    /// Binary to replace; the running executable when absent
    pub install_path: Option<PathBuf>,
}

impl UpdateOptions {
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            current_version: current_version.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, tag: impl Into<String>) -> Self {
        self.target_version = Some(tag.into());
        self
    }

    pub fn with_install_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_path = Some(path.into());
        self
    }
}

/// Outcome of a check or update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    /// Whether a new binary was installed
    pub updated: bool,

    /// Version before the call
    pub from: String,

    /// Version offered or installed
    pub to: String,

    /// Human-readable summary
    pub message: String,
}

/// Orchestrates release lookup, asset selection, download and install
pub struct Updater {
    source: Arc<dyn ReleaseSource>,
    installer: BinaryInstaller,
    platform: Platform,
}

impl Updater {
    /// Create an updater reading releases from `source`
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            source,
            installer: BinaryInstaller::new(),
            platform: Platform::current(),
        }
    }

    /// Create an updater backed by the GitHub API
    pub fn from_config(config: &UpdateConfig) -> Result<Self, RegistryError> {
        let client = GitHubReleaseClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Select assets for a platform other than the running one
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn source(&self) -> &dyn ReleaseSource {
        self.source.as_ref()
    }

    /// Report whether a newer release than `current_version` exists.
    /// Never downloads an asset or touches the filesystem.
    pub async fn check_for_update(
        &self,
        current_version: &str,
    ) -> Result<UpdateResult, UpdateFailure> {
        let current = version::normalize(current_version);

        let release = self
            .source
            .get_latest_release()
            .await
            .map_err(|e| UpdateFailure::new(UpdateStage::ResolvingRelease, e))?;
        debug!("Latest release: {}", release.tag_name);

        let result = if version::is_newer(&current, &release.tag_name) {
            info!("Update available: {} -> {}", current, release.tag_name);
            UpdateResult {
                updated: false,
                message: format!("Update available: {} -> {}", current, release.tag_name),
                from: current,
                to: release.tag_name,
            }
        } else {
            debug!("Already on latest version: {}", current);
            UpdateResult {
                updated: false,
                message: format!("Already up-to-date ({})", current),
                from: current,
                to: release.tag_name,
            }
        };

        Ok(result)
    }

    /// Install the requested or latest release if it is strictly newer than
    /// the current version
    pub async fn update(&self, options: UpdateOptions) -> Result<UpdateResult, UpdateFailure> {
        let current = version::normalize(&options.current_version);

        let release = self
            .resolve(options.target_version.as_deref())
            .await
            .map_err(|e| UpdateFailure::new(UpdateStage::ResolvingRelease, e))?;

        if !version::is_newer(&current, &release.tag_name) {
            info!(
                "Already up-to-date: {} (resolved {})",
                current, release.tag_name
            );
            return Ok(UpdateResult {
                updated: false,
                message: format!("Already up-to-date ({})", current),
                from: current,
                to: release.tag_name,
            });
        }

        let asset = select_asset(&release, &self.platform)
            .map_err(|e| UpdateFailure::new(UpdateStage::SelectingAsset, e))?;
        info!("Updating {} -> {} using {}", current, release.tag_name, asset.name);

        let bytes = self
            .source
            .download_asset(&asset.browser_download_url)
            .await
            .map_err(|e| UpdateFailure::new(UpdateStage::Downloading, e))?;

        self.verify(&release, asset, &bytes)
            .await
            .map_err(|e| UpdateFailure::new(UpdateStage::Verifying, e))?;

        let install_path = match options.install_path {
            Some(path) => path,
            None => std::env::current_exe().map_err(|e| {
                UpdateFailure::new(
                    UpdateStage::Installing,
                    UpdateError::io("Failed to locate running executable", "", e),
                )
            })?,
        };

        self.installer
            .install(&bytes, &install_path)
            .map_err(|e| UpdateFailure::new(UpdateStage::Installing, e))?;

        info!("Updated {} -> {}", current, release.tag_name);
        Ok(UpdateResult {
            updated: true,
            message: format!("Updated from {} to {}", current, release.tag_name),
            from: current,
            to: release.tag_name,
        })
    }

    async fn resolve(&self, target: Option<&str>) -> Result<Release, RegistryError> {
        match target {
            Some(tag) => self.source.get_release(&version::normalize(tag)).await,
            None => self.source.get_latest_release().await,
        }
    }

    /// Check the downloaded bytes against the advertised size and, when the
    /// release publishes one, the `<asset>.sha256` digest
    async fn verify(&self, release: &Release, asset: &Asset, bytes: &[u8]) -> Result<(), UpdateError> {
        if bytes.len() as u64 != asset.size {
            return Err(UpdateError::Integrity {
                asset: asset.name.clone(),
                detail: format!("expected {} bytes, received {}", asset.size, bytes.len()),
            });
        }

        let Some(digest_asset) = release.asset(&format!("{}{}", asset.name, CHECKSUM_SUFFIX))
        else {
            debug!("No checksum published for {}", asset.name);
            return Ok(());
        };

        let digest_file = self
            .source
            .download_asset(&digest_asset.browser_download_url)
            .await?;
        let expected = parse_digest(&digest_file).ok_or_else(|| UpdateError::Integrity {
            asset: asset.name.clone(),
            detail: format!("{} does not contain a SHA-256 digest", digest_asset.name),
        })?;

        let actual = hex::encode(Sha256::digest(bytes));
        if !actual.eq_ignore_ascii_case(&expected) {
            return Err(UpdateError::Integrity {
                asset: asset.name.clone(),
                detail: format!("checksum mismatch: expected {}, got {}", expected, actual),
            });
        }

        debug!("Checksum verified: {}", actual);
        Ok(())
    }
}

/// First token of a `sha256sum`-style line, if it is a 64-digit hex string
fn parse_digest(contents: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(contents).ok()?;
    let token = text.split_whitespace().next()?;
    (token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit())).then(|| token.to_string())
}
