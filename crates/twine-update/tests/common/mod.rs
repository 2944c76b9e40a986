//! Common test infrastructure for twine-update tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Version strings, platforms, binary payloads
//! - `builders`: Fluent builders for Release and Asset
//! - `mock_server`: Wiremock setup helpers for registry endpoints
//! - `fake_source`: In-memory ReleaseSource that records downloads

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fake_source;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use fake_source::*;
pub use mock_server::*;

/// Route library logs to the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("twine_update=debug")
        .with_test_writer()
        .try_init();
}
