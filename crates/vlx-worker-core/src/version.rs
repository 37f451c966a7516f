//! Release tag comparison.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a release tag is compared against the running version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Any tag other than exactly `v<current>` is an update.
    ///
    /// A tag formatted differently (e.g. `1.1.0` without the prefix) always
    /// reads as an update, including the running version itself.
    #[default]
    Exact,
    /// Only a tag that parses as a strictly greater semantic version is an update.
    Semver,
}

impl VersionPolicy {
    pub fn is_update(&self, latest_tag: &str, current: &str) -> bool {
        match self {
            VersionPolicy::Exact => latest_tag != format!("v{}", current),
            VersionPolicy::Semver => {
                match (parse_tag(latest_tag), parse_tag(current)) {
                    (Some(latest), Some(current)) => latest > current,
                    _ => {
                        warn!(
                            latest = latest_tag,
                            current = current,
                            "Unparseable version, not treating as update"
                        );
                        false
                    }
                }
            }
        }
    }
}

fn parse_tag(tag: &str) -> Option<semver::Version> {
    let trimmed = tag.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    semver::Version::parse(bare).ok()
}

/// The version embedded in a bucket name: everything after the last `-v`.
pub fn current_version_from_cache_name(cache_name: &str) -> Option<&str> {
    cache_name
        .rsplit_once("-v")
        .map(|(_, version)| version)
        .filter(|version| !version.is_empty())
}
