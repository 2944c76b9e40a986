//! Version information for the twine CLI

use serde::Serialize;

/// Release version baked in at build time; `dev` for local builds
pub const VERSION: &str = match option_env!("TWINE_RELEASE_VERSION") {
    Some(v) => v,
    None => twine_update::DEV_VERSION,
};

/// Version information
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Release version or `dev`
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,

    /// Registry platform name, e.g. `linux-amd64`
    pub platform: String,
}

impl VersionInfo {
    /// Create version info for current build
    pub fn current() -> Self {
        Self {
            version: VERSION.to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            platform: twine_update::Platform::current().to_string(),
        }
    }

    /// Format as display string
    pub fn display(&self) -> String {
        let mut parts = vec![format!("twine {}", self.version)];

        if let Some(commit) = &self.commit {
            parts.push(format!("({})", commit));
        }

        parts.push(self.platform.clone());
        parts.join(" ")
    }
}
