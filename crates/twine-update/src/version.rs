//! Version normalization and comparison
//!
//! Versions are release tags such as `v1.2.3`, the leading `v` being optional
//! on input. The `dev` sentinel marks an unreleased build and orders before
//! every real release.

use semver::Version;
use std::cmp::Ordering;

use crate::DEV_VERSION;

/// Prefix carried by every normalized release version
const VERSION_PREFIX: char = 'v';

/// Add the `v` prefix if absent. Empty and `dev` are returned unchanged.
pub fn normalize(version: &str) -> String {
    if version.is_empty() || version == DEV_VERSION || version.starts_with(VERSION_PREFIX) {
        version.to_string()
    } else {
        format!("{}{}", VERSION_PREFIX, version)
    }
}

/// Order two versions.
///
/// `dev` is older than any other version and equal to itself. An empty
/// operand compares equal to anything, so an unknown current version never
/// triggers an update on its own. Strings that are not valid semantic
/// versions order before valid ones and equal to each other.
pub fn compare(v1: &str, v2: &str) -> Ordering {
    let a = normalize(v1);
    let b = normalize(v2);

    match (a == DEV_VERSION, b == DEV_VERSION) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if a.is_empty() || b.is_empty() {
        return Ordering::Equal;
    }

    match (parse(&a), parse(&b)) {
        (Some(a), Some(b)) => a.cmp_precedence(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// True when `candidate` is strictly newer than `current`
pub fn is_newer(current: &str, candidate: &str) -> bool {
    compare(current, candidate) == Ordering::Less
}

/// True for a well-formed semantic version. `dev` and empty are not valid.
pub fn is_valid(version: &str) -> bool {
    if version.is_empty() || version == DEV_VERSION {
        return false;
    }
    parse(&normalize(version)).is_some()
}

/// Parse a normalized version string
fn parse(normalized: &str) -> Option<Version> {
    let bare = normalized.strip_prefix(VERSION_PREFIX)?;
    Version::parse(bare).ok()
}
