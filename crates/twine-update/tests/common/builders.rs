//! Builder patterns for test data construction

use sha2::{Digest, Sha256};
use twine_update::{Asset, Release};

use super::constants::*;

/// Builder for Release objects with sensible test defaults
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: String,
    name: Option<String>,
    prerelease: bool,
    published_at: Option<String>,
    assets: Vec<Asset>,
}

impl ReleaseBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag_name: tag.to_string(),
            name: None,
            prerelease: false,
            published_at: None,
            assets: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn prerelease(mut self) -> Self {
        self.prerelease = true;
        self
    }

    /// RFC 3339 publication date
    pub fn published_at(mut self, date: &str) -> Self {
        self.published_at = Some(date.to_string());
        self
    }

    pub fn asset(mut self, asset: Asset) -> Self {
        self.assets.push(asset);
        self
    }

    /// Add the test-platform binary served from `base_url`
    pub fn with_binary(self, base_url: &str, content: &[u8]) -> Self {
        self.asset(
            AssetBuilder::new(TEST_ASSET)
                .url(&format!("{}/download/{}", base_url, TEST_ASSET))
                .size_from_content(content)
                .build(),
        )
    }

    /// Add a `.sha256` digest asset for the test-platform binary
    pub fn with_checksum(self, base_url: &str) -> Self {
        let name = format!("{}.sha256", TEST_ASSET);
        self.asset(
            AssetBuilder::new(&name)
                .url(&format!("{}/download/{}", base_url, name))
                .size(64)
                .build(),
        )
    }

    pub fn build(self) -> Release {
        Release {
            tag_name: self.tag_name,
            name: self.name,
            prerelease: self.prerelease,
            published_at: self
                .published_at
                .map(|d| d.parse().expect("valid RFC 3339 date")),
            assets: self.assets,
        }
    }
}

/// Builder for Asset objects
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    name: String,
    browser_download_url: String,
    size: u64,
}

impl AssetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            browser_download_url: format!("https://example.com/{}", name),
            size: 1024,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.browser_download_url = url.to_string();
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn size_from_content(mut self, content: &[u8]) -> Self {
        self.size = content.len() as u64;
        self
    }

    pub fn build(self) -> Asset {
        Asset {
            name: self.name,
            browser_download_url: self.browser_download_url,
            size: self.size,
        }
    }
}

/// `sha256sum`-style digest line for `content`
pub fn sha256_line(content: &[u8]) -> String {
    format!("{}  {}\n", hex::encode(Sha256::digest(content)), TEST_ASSET)
}
