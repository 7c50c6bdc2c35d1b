//! Version matcher: pick the definition version that applies to a consumer.

use semver::Version;
use std::collections::BTreeMap;

/// Greatest available version `<= requested`, or `None` if every available
/// version is newer (or nothing is available).
pub fn select<'a, V>(available: &'a BTreeMap<Version, V>, requested: &Version) -> Option<(&'a Version, &'a V)> {
    available.range::<Version, _>(..=requested).next_back()
}

/// Parse a version string, falling back to `default` when absent or invalid.
pub fn version_or(raw: Option<&str>, default: &Version) -> Version {
    raw.and_then(|v| Version::parse(v.trim()).ok())
        .unwrap_or_else(|| default.clone())
}
