//! Semantic version parsing and bump arithmetic.

use semver::{Prerelease, Version};

use crate::error::{Error, Result};

/// Parses a trimmed, optionally `v`-prefixed semver string.
///
/// Returns `None` for anything that is not valid semver. Callers that scan
/// foreign files rely on this never erroring.
pub fn parse_version(raw: &str) -> Option<Version> {
    let bare = strip_prefix(raw);
    if bare.is_empty() {
        return None;
    }
    Version::parse(bare).ok()
}

/// Like [`parse_version`] but reports why the input was rejected.
pub fn parse_version_strict(raw: &str) -> Result<Version> {
    Version::parse(strip_prefix(raw)).map_err(|e| Error::InvalidVersion {
        input: raw.to_string(),
        message: e.to_string(),
    })
}

fn strip_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

fn increment(current: &Version, component: u64) -> Result<u64> {
    component.checked_add(1).ok_or_else(|| Error::InvalidVersion {
        input: current.to_string(),
        message: "version component overflows when incremented".to_string(),
    })
}

/// Type of semantic version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    /// Major version bump (1.0.0 -> 2.0.0).
    Major,
    /// Minor version bump (1.0.0 -> 1.1.0).
    Minor,
    /// Patch version bump (1.0.0 -> 1.0.1).
    Patch,
}

impl BumpType {
    /// Returns the lowercase name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Major => "major",
            BumpType::Minor => "minor",
            BumpType::Patch => "patch",
        }
    }

    /// Applies the bump, dropping any pre-release and build metadata.
    ///
    /// A patch bump of a pre-release finalizes it (1.0.1-rc.2 -> 1.0.1).
    /// Fails with `Error::InvalidVersion` if the bumped component would overflow.
    pub fn apply(&self, current: &Version) -> Result<Version> {
        let next = match self {
            BumpType::Major => Version::new(increment(current, current.major)?, 0, 0),
            BumpType::Minor => Version::new(current.major, increment(current, current.minor)?, 0),
            BumpType::Patch if !current.pre.is_empty() => {
                Version::new(current.major, current.minor, current.patch)
            }
            BumpType::Patch => {
                Version::new(current.major, current.minor, increment(current, current.patch)?)
            }
        };
        Ok(next)
    }
}

/// Advances the pre-release identifier for `label`.
///
/// - `1.0.0` + `rc` -> `1.0.1-rc.1`
/// - `1.0.1-rc.1` + `rc` -> `1.0.1-rc.2`
/// - `1.0.1-alpha.3` + `rc` -> `1.0.1-rc.1`
pub fn bump_prerelease(current: &Version, label: &str) -> Result<Version> {
    let label = label.trim();
    if label.is_empty() || label.contains('.') {
        return Err(Error::InvalidVersion {
            input: label.to_string(),
            message: "pre-release label must be a single non-empty identifier".to_string(),
        });
    }

    let (base, number) = if current.pre.is_empty() {
        (
            Version::new(current.major, current.minor, increment(current, current.patch)?),
            1,
        )
    } else {
        let base = Version::new(current.major, current.minor, current.patch);
        let next = match current.pre.as_str().split_once('.') {
            Some((existing, n)) if existing == label => match n.parse::<u64>() {
                Ok(n) => increment(current, n)?,
                Err(_) => 1,
            },
            _ => 1,
        };
        (base, next)
    };

    let pre = Prerelease::new(&format!("{}.{}", label, number)).map_err(|e| {
        Error::InvalidVersion {
            input: label.to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(Version { pre, ..base })
}
