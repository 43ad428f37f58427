//! Manifest adapter trait for reading and rewriting embedded versions.

use crate::error::Result;
use crate::module::ManifestFormat;

/// Version found inside a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedVersion {
    pub version: String,
    /// Dotted key path the version came from.
    pub field: String,
}

impl ExtractedVersion {
    /// Creates a new extracted version read from `field`.
    pub fn new(version: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            field: field.into(),
        }
    }
}

/// Trait for manifest-specific version handling.
///
/// Adapters never touch the filesystem; discovery hands them file contents.
/// `extract` must return `None` for malformed documents rather than failing,
/// since foreign files must never block discovery.
pub trait ManifestAdapter: Send + Sync {
    /// File name this adapter recognizes, e.g. `package.json`.
    fn filename(&self) -> &'static str;
    fn format(&self) -> ManifestFormat;
    /// Human readable label used in sync candidate descriptions.
    fn description(&self) -> &'static str;

    /// Regex locating the version in unstructured formats.
    fn pattern(&self) -> Option<&'static str> {
        None
    }

    fn extract(&self, content: &str) -> Option<ExtractedVersion>;

    /// Returns `content` with its version replaced by `new_version`.
    fn write_version(&self, content: &str, new_version: &str) -> Result<String>;
}
