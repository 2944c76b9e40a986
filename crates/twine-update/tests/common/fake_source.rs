//! In-memory release source
//!
//! Serves a fixed release list and asset table, and records every download
//! so tests can assert that none happened.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use twine_update::{RegistryError, Release, ReleaseSource};

#[derive(Default)]
pub struct FakeSource {
    /// Newest first
    releases: Vec<Release>,
    assets: HashMap<String, Vec<u8>>,
    downloads: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(mut self, release: Release) -> Self {
        self.releases.push(release);
        self
    }

    pub fn with_asset(mut self, url: &str, content: &[u8]) -> Self {
        self.assets.insert(url.to_string(), content.to_vec());
        self
    }

    /// URLs downloaded so far
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleaseSource for FakeSource {
    async fn get_latest_release(&self) -> Result<Release, RegistryError> {
        self.releases
            .iter()
            .find(|r| !r.prerelease)
            .cloned()
            .ok_or_else(|| RegistryError::not_found("latest release"))
    }

    async fn get_release(&self, tag: &str) -> Result<Release, RegistryError> {
        self.releases
            .iter()
            .find(|r| r.tag_name == tag)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("release {}", tag)))
    }

    async fn list_releases(&self) -> Result<Vec<Release>, RegistryError> {
        Ok(self.releases.iter().take(100).cloned().collect())
    }

    async fn download_asset(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        self.downloads.lock().unwrap().push(url.to_string());
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(url))
    }
}
