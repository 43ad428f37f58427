//! Project discovery: version-bearing modules, third-party manifests and drift.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::adapter::ManifestAdapter;
use crate::adapter_registry::AdapterRegistry;
use crate::cancel::CancelToken;
use crate::config::{DiscoveryConfig, DEFAULT_VERSION_FILE};
use crate::error::{Error, Result};
use crate::fs::{DirEntry, FileSystem};
use crate::module::{
    detect_mismatches, DiscoveryResult, ManifestFormat, ManifestSource, Module, SyncCandidate,
};
use crate::path_utils::{relative_to, ExcludeSet};
use crate::version::parse_version;

/// Walks a project tree and reports what it finds.
///
/// Every call is a fresh walk; nothing is cached between calls.
pub struct Discovery {
    config: DiscoveryConfig,
    fs: Arc<dyn FileSystem>,
    registry: Arc<AdapterRegistry>,
    version_file: String,
    expected_version: Option<String>,
}

/// Depth limits for one walk. `None` disables that kind of scan.
#[derive(Debug, Clone, Copy)]
struct WalkPlan {
    module_depth: Option<usize>,
    manifest_depth: Option<usize>,
}

impl WalkPlan {
    fn max_depth(&self) -> usize {
        self.module_depth
            .unwrap_or(0)
            .max(self.manifest_depth.unwrap_or(0))
    }

    fn modules_at(&self, depth: usize) -> bool {
        self.module_depth.is_some_and(|max| depth <= max)
    }

    fn manifests_at(&self, depth: usize) -> bool {
        self.manifest_depth.is_some_and(|max| depth <= max)
    }
}

struct Walk<'a> {
    discovery: &'a Discovery,
    root: &'a Path,
    plan: WalkPlan,
    excludes: ExcludeSet,
    cancel: &'a CancelToken,
    modules: Vec<Module>,
    manifests: Vec<ManifestSource>,
}

impl Discovery {
    /// Creates a new discovery service over `fs` with the given settings and adapters.
    pub fn new(
        config: DiscoveryConfig,
        fs: Arc<dyn FileSystem>,
        registry: Arc<AdapterRegistry>,
    ) -> Self {
        Self {
            config,
            fs,
            registry,
            version_file: DEFAULT_VERSION_FILE.to_string(),
            expected_version: None,
        }
    }

    /// Overrides the name of the per-module version file (default `.version`).
    pub fn with_version_file(mut self, name: impl Into<String>) -> Self {
        self.version_file = name.into();
        self
    }

    /// Overrides the root module's version as the mismatch reference.
    pub fn with_expected_version(mut self, version: Option<String>) -> Self {
        self.expected_version = version.map(|v| {
            parse_version(&v)
                .map(|parsed| parsed.to_string())
                .unwrap_or_else(|| v.trim().to_string())
        });
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn version_file(&self) -> &str {
        &self.version_file
    }

    /// The authoritative version set by configuration, if any.
    pub fn expected_version(&self) -> Option<&str> {
        self.expected_version.as_deref()
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Full discovery with the configured depth limits.
    pub fn discover(&self, cancel: &CancelToken, root: impl AsRef<Path>) -> Result<DiscoveryResult> {
        let plan = WalkPlan {
            module_depth: Some(self.limit(self.config.module_max_depth)),
            manifest_depth: Some(self.limit(self.config.manifest_max_depth)),
        };
        self.run(cancel, root.as_ref(), plan)
    }

    /// Full discovery with the module depth limit replaced by `depth`.
    pub fn discover_with_depth(
        &self,
        cancel: &CancelToken,
        root: impl AsRef<Path>,
        depth: usize,
    ) -> Result<DiscoveryResult> {
        let plan = WalkPlan {
            module_depth: Some(self.limit(depth)),
            manifest_depth: Some(self.limit(self.config.manifest_max_depth)),
        };
        self.run(cancel, root.as_ref(), plan)
    }

    /// Runs discovery with only the version-file scan enabled.
    pub fn discover_modules_only(
        &self,
        cancel: &CancelToken,
        root: impl AsRef<Path>,
    ) -> Result<Vec<Module>> {
        let plan = WalkPlan {
            module_depth: Some(self.limit(self.config.module_max_depth)),
            manifest_depth: None,
        };
        let (modules, _) = self.walk(cancel, root.as_ref(), plan)?;
        Ok(modules)
    }

    /// Runs discovery with only the manifest scan enabled.
    pub fn discover_manifests_only(
        &self,
        cancel: &CancelToken,
        root: impl AsRef<Path>,
    ) -> Result<Vec<ManifestSource>> {
        let plan = WalkPlan {
            module_depth: None,
            manifest_depth: Some(self.limit(self.config.manifest_max_depth)),
        };
        let (_, manifests) = self.walk(cancel, root.as_ref(), plan)?;
        Ok(manifests)
    }

    fn limit(&self, depth: usize) -> usize {
        if self.config.recursive {
            depth
        } else {
            0
        }
    }

    fn run(&self, cancel: &CancelToken, root: &Path, plan: WalkPlan) -> Result<DiscoveryResult> {
        let (modules, manifests) = self.walk(cancel, root, plan)?;

        let expected = self.expected_version.clone().or_else(|| {
            modules
                .iter()
                .find(|m| m.is_root(root))
                .map(|m| m.version.clone())
        });
        let mismatches = match expected {
            Some(ref expected) => detect_mismatches(expected, &modules, &manifests),
            None => Vec::new(),
        };
        let sync_candidates = self.sync_candidates(root, &modules, &manifests);

        debug!(
            root = %root.display(),
            modules = modules.len(),
            manifests = manifests.len(),
            mismatches = mismatches.len(),
            "discovery finished"
        );

        Ok(DiscoveryResult {
            root: root.to_path_buf(),
            modules,
            manifests,
            mismatches,
            sync_candidates,
        })
    }

    fn walk(
        &self,
        cancel: &CancelToken,
        root: &Path,
        plan: WalkPlan,
    ) -> Result<(Vec<Module>, Vec<ManifestSource>)> {
        cancel.check()?;
        let meta = self.fs.stat(root).map_err(|e| Error::io(root, e))?;
        if !meta.is_dir() {
            return Err(Error::io(
                root,
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        let patterns = self.config.effective_excludes();
        let mut walk = Walk {
            discovery: self,
            root,
            plan,
            excludes: ExcludeSet::new(&patterns, self.version_file.clone())?,
            cancel,
            modules: Vec::new(),
            manifests: Vec::new(),
        };
        walk.visit(root, 0)?;
        Ok((walk.modules, walk.manifests))
    }

    /// One candidate per manifest, plus every non-root module's version file.
    fn sync_candidates(
        &self,
        root: &Path,
        modules: &[Module],
        manifests: &[ManifestSource],
    ) -> Vec<SyncCandidate> {
        let manifest_candidates = manifests.iter().map(|manifest| {
            let adapter = self.registry.get(&manifest.filename);
            let label = adapter.map(|a| a.description()).unwrap_or("manifest");
            SyncCandidate {
                path: manifest.path.clone(),
                format: manifest.format,
                field: manifest.field.clone(),
                pattern: adapter.and_then(|a| a.pattern()).map(str::to_string),
                description: format!("{} ({})", label, manifest.rel_path.display()),
            }
        });

        let module_candidates = modules
            .iter()
            .filter(|m| !m.is_root(root))
            .map(|module| SyncCandidate {
                path: module.path.clone(),
                format: ManifestFormat::Raw,
                field: String::new(),
                pattern: None,
                description: format!("version file of module {}", module.name),
            });

        manifest_candidates.chain(module_candidates).collect()
    }
}

impl Walk<'_> {
    fn visit(&mut self, dir: &Path, depth: usize) -> Result<()> {
        self.cancel.check()?;
        let discovery = self.discovery;
        let entries = discovery.fs.read_dir(dir).map_err(|e| Error::io(dir, e))?;

        let scan_modules = self.plan.modules_at(depth);
        let scan_manifests = self.plan.manifests_at(depth);

        for entry in entries.iter().filter(|e| !e.is_dir()) {
            if scan_modules && entry.name == discovery.version_file {
                self.read_module(dir, entry)?;
            } else if scan_manifests {
                if let Some(adapter) = discovery.registry.get(&entry.name) {
                    self.read_manifest(entry, adapter)?;
                }
            }
        }

        if depth >= self.plan.max_depth() {
            return Ok(());
        }

        for entry in entries.iter().filter(|e| e.is_dir()) {
            if self.excludes.is_excluded(&entry.name) {
                debug!(path = %entry.path.display(), "skipping excluded directory");
                continue;
            }
            self.visit(&entry.path, depth + 1)?;
        }

        Ok(())
    }

    fn read_module(&mut self, dir: &Path, entry: &DirEntry) -> Result<()> {
        let Some(content) = self.read_text(entry)? else {
            return Ok(());
        };
        let Some(version) = parse_version(&content) else {
            debug!(path = %entry.path.display(), "ignoring version file without valid semver");
            return Ok(());
        };

        let name = if dir == self.root {
            self.root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "root".to_string())
        } else {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string())
        };

        self.modules.push(Module::new(
            name,
            entry.path.clone(),
            relative_to(&entry.path, self.root),
            version.to_string(),
        ));
        Ok(())
    }

    fn read_manifest(&mut self, entry: &DirEntry, adapter: &dyn ManifestAdapter) -> Result<()> {
        let Some(content) = self.read_text(entry)? else {
            return Ok(());
        };
        let Some(extracted) = adapter.extract(&content) else {
            debug!(path = %entry.path.display(), "no version found in manifest");
            return Ok(());
        };
        let Some(version) = parse_version(&extracted.version) else {
            debug!(
                path = %entry.path.display(),
                version = %extracted.version,
                "ignoring manifest with non-semver version"
            );
            return Ok(());
        };

        self.manifests.push(ManifestSource {
            path: entry.path.clone(),
            rel_path: relative_to(&entry.path, self.root),
            filename: entry.name.clone(),
            format: adapter.format(),
            field: extracted.field,
            version: version.to_string(),
        });
        Ok(())
    }

    /// Reads a file as UTF-8. Binary content is treated as a foreign format
    /// and skipped; any other read failure is fatal.
    fn read_text(&self, entry: &DirEntry) -> Result<Option<String>> {
        match self.discovery.fs.read_to_string(&entry.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                debug!(path = %entry.path.display(), "skipping non UTF-8 file");
                Ok(None)
            }
            Err(e) => Err(Error::io(entry.path.clone(), e)),
        }
    }
}

