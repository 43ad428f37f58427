//! Discovery data model: modules, manifests, drift and sync targets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A versioned component, identified by a version file in its directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// Absolute path of the version file.
    pub path: PathBuf,
    /// Version file path relative to the project root.
    pub rel_path: PathBuf,
    /// Directory holding the version file.
    pub dir: PathBuf,
    pub version: String,
}

impl Module {
    /// Creates a new module from its version file location and current version.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        rel_path: impl Into<PathBuf>,
        version: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            name: name.into(),
            path,
            rel_path: rel_path.into(),
            dir,
            version: version.into(),
        }
    }

    /// True if this module's version file sits directly in `root`.
    pub fn is_root(&self, root: &Path) -> bool {
        self.dir == root
    }
}

/// Serialization format of a versioned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    Json,
    Yaml,
    Toml,
    /// Unstructured text located with a regex.
    Regex,
    /// A bare version file.
    Raw,
}

impl ManifestFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestFormat::Json => "json",
            ManifestFormat::Yaml => "yaml",
            ManifestFormat::Toml => "toml",
            ManifestFormat::Regex => "regex",
            ManifestFormat::Raw => "raw",
        }
    }
}

/// A third-party file with an embedded version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSource {
    pub path: PathBuf,
    pub rel_path: PathBuf,
    pub filename: String,
    pub format: ManifestFormat,
    /// Dotted key path the version was read from (empty for unstructured files).
    pub field: String,
    pub version: String,
}

/// A source whose version differs from the authoritative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub source: PathBuf,
    pub expected_version: String,
    pub actual_version: String,
}

/// A file recommended as a version propagation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCandidate {
    pub path: PathBuf,
    pub format: ManifestFormat,
    pub field: String,
    pub pattern: Option<String>,
    pub description: String,
}

/// How many modules a project has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    NoModules,
    SingleModule,
    MultiModule,
}

impl DiscoveryMode {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => DiscoveryMode::NoModules,
            1 => DiscoveryMode::SingleModule,
            _ => DiscoveryMode::MultiModule,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMode::NoModules => "no modules",
            DiscoveryMode::SingleModule => "single module",
            DiscoveryMode::MultiModule => "multi module",
        }
    }
}

/// Versions grouped for drift reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub version: String,
    pub count: usize,
    pub sources: Vec<PathBuf>,
}

/// Everything one discovery pass found.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub root: PathBuf,
    pub modules: Vec<Module>,
    pub manifests: Vec<ManifestSource>,
    pub mismatches: Vec<Mismatch>,
    pub sync_candidates: Vec<SyncCandidate>,
}

impl DiscoveryResult {
    /// Derived from the module count only.
    pub fn mode(&self) -> DiscoveryMode {
        DiscoveryMode::from_count(self.modules.len())
    }

    /// The module at the discovery root, if one was found.
    pub fn root_module(&self) -> Option<&Module> {
        self.modules.iter().find(|m| m.is_root(&self.root))
    }

    /// True when no source disagrees with the authoritative version.
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Recomputes drift against an arbitrary expected version.
    pub fn mismatches_against(&self, expected: &str) -> Vec<Mismatch> {
        detect_mismatches(expected, &self.modules, &self.manifests)
    }

    fn versioned_sources(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.modules
            .iter()
            .map(|m| (m.rel_path.as_path(), m.version.as_str()))
            .chain(
                self.manifests
                    .iter()
                    .map(|m| (m.rel_path.as_path(), m.version.as_str())),
            )
            .filter(|(_, version)| !version.is_empty())
    }

    /// Distinct non-empty versions, sorted alphabetically.
    pub fn unique_versions(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self.versioned_sources().map(|(_, v)| v).collect();
        unique.into_iter().map(str::to_string).collect()
    }

    /// Versions with their sources, most common first, ties by version.
    pub fn version_summary(&self) -> Vec<VersionSummary> {
        summarize_versions(self.versioned_sources())
    }
}

/// Every source with a non-empty version different from `expected`, sorted by path.
pub fn detect_mismatches(
    expected: &str,
    modules: &[Module],
    manifests: &[ManifestSource],
) -> Vec<Mismatch> {
    let mut mismatches: Vec<Mismatch> = modules
        .iter()
        .map(|m| (&m.rel_path, &m.version))
        .chain(manifests.iter().map(|m| (&m.rel_path, &m.version)))
        .filter(|(_, version)| !version.is_empty() && version.as_str() != expected)
        .map(|(source, version)| Mismatch {
            source: source.clone(),
            expected_version: expected.to_string(),
            actual_version: version.clone(),
        })
        .collect();
    mismatches.sort_by(|a, b| a.source.cmp(&b.source));
    mismatches
}

/// Groups `(source, version)` pairs by version.
pub fn summarize_versions<'a>(
    sources: impl IntoIterator<Item = (&'a Path, &'a str)>,
) -> Vec<VersionSummary> {
    let mut groups: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for (source, version) in sources {
        if version.is_empty() {
            continue;
        }
        groups.entry(version).or_default().push(source.to_path_buf());
    }

    let mut summary: Vec<VersionSummary> = groups
        .into_iter()
        .map(|(version, sources)| VersionSummary {
            version: version.to_string(),
            count: sources.len(),
            sources,
        })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.version.cmp(&b.version)));
    summary
}
