//! Platform detection and asset selection
//!
//! Release assets are bare binaries named `twine-<platform>-<arch>`, with an
//! `.exe` suffix on Windows. Platform and architecture use the registry's
//! naming (`darwin`, `amd64`, ...) rather than Rust's target names.

use std::fmt;
use tracing::debug;

use crate::error::UpdateError;
use crate::releases::{Asset, Release};
use crate::TOOL_NAME;

/// Platform identifier that receives the `.exe` suffix
const WINDOWS: &str = "windows";

/// Operating system and architecture, in registry naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Platform of the running binary
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Expected asset name for this platform
    pub fn binary_name(&self) -> String {
        binary_name(&self.os, &self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// `twine-<platform>-<arch>`, plus `.exe` on Windows.
///
/// Unsupported pairs still produce a name; their absence is detected when
/// the asset is looked up.
pub fn binary_name(platform: &str, arch: &str) -> String {
    let suffix = if platform == WINDOWS { ".exe" } else { "" };
    format!("{}-{}-{}{}", TOOL_NAME, platform, arch, suffix)
}

/// Pick the asset built for `platform` out of a release
pub fn select_asset<'a>(release: &'a Release, platform: &Platform) -> Result<&'a Asset, UpdateError> {
    let name = platform.binary_name();
    debug!("Looking for asset {} in release {}", name, release.tag_name);

    release
        .asset(&name)
        .ok_or_else(|| UpdateError::NoBinaryForPlatform {
            tag: release.tag_name.clone(),
            asset: name,
        })
}
