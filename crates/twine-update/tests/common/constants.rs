//! Shared constants for test infrastructure

use twine_update::Platform;

// Tags
pub const TAG_V1_0_0: &str = "v1.0.0";
pub const TAG_V2_0_0: &str = "v2.0.0";
pub const TAG_V2_1_0_RC1: &str = "v2.1.0-rc.1";
pub const TAG_MISSING: &str = "v99.99.99";

// Sentinel
pub const DEV: &str = "dev";

// Binary payloads
pub const OLD_BINARY: &[u8] = b"#!/bin/sh\necho twine v1.0.0\n";
pub const NEW_BINARY: &[u8] = b"#!/bin/sh\necho twine v2.0.0\n";

/// Platform every updater test pins itself to
pub fn test_platform() -> Platform {
    Platform::new("linux", "amd64")
}

/// Asset name matching [`test_platform`]
pub const TEST_ASSET: &str = "twine-linux-amd64";
