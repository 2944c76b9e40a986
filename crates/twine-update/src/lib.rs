//! Self-update functionality for the Twine CLI
//!
//! Provides:
//! - Version normalization and ordering, including the `dev` build sentinel
//! - Release discovery and asset download from GitHub releases
//! - Platform-matched asset selection
//! - Atomic, same-volume replacement of the installed binary
//! - Check-only and full-update workflows

pub mod config;
pub mod error;
pub mod installer;
pub mod platform;
pub mod releases;
pub mod updater;
pub mod version;

pub use config::UpdateConfig;
pub use error::{ErrorKind, RegistryError, UpdateError, UpdateFailure};
pub use installer::BinaryInstaller;
pub use platform::{binary_name, select_asset, Platform};
pub use releases::{Asset, GitHubReleaseClient, Release, ReleaseSource};
pub use updater::{UpdateOptions, UpdateResult, UpdateStage, Updater};

/// Name of the tool; prefixes every release asset
pub const TOOL_NAME: &str = "twine";

/// Version sentinel for unreleased development builds
pub const DEV_VERSION: &str = "dev";
