//! Propagates new module versions into the manifests they own.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use versync_core::{
    successful_modules, AdapterRegistry, DiscoveryResult, ExecutionResult, ManifestFormat,
    Module, SyncCandidate,
};

/// Outcome of rewriting one sync candidate.
#[derive(Debug)]
pub struct SyncOutcome {
    pub path: PathBuf,
    pub version: String,
    pub error: Option<String>,
}

/// The module whose directory is the closest ancestor of `path`.
fn owner<'a>(modules: &'a [Module], path: &Path) -> Option<&'a Module> {
    modules
        .iter()
        .filter(|m| path.starts_with(&m.dir))
        .max_by_key(|m| m.dir.components().count())
}

/// Pairs each manifest candidate with the new version of the module owning it.
///
/// Module version files are skipped since the operation already rewrote them.
pub fn plan<'a>(
    discovery: &'a DiscoveryResult,
    results: &'a [ExecutionResult],
) -> Vec<(&'a SyncCandidate, &'a str)> {
    let updated = successful_modules(results);

    discovery
        .sync_candidates
        .iter()
        .filter(|c| c.format != ManifestFormat::Raw)
        .filter_map(|candidate| {
            let owner = owner(&discovery.modules, &candidate.path)?;
            updated
                .iter()
                .find(|(module, _)| module.path == owner.path)
                .map(|(_, version)| (candidate, *version))
        })
        .collect()
}

pub fn propagate(
    discovery: &DiscoveryResult,
    results: &[ExecutionResult],
    registry: &AdapterRegistry,
    dry_run: bool,
) -> Vec<SyncOutcome> {
    plan(discovery, results)
        .into_iter()
        .map(|(candidate, version)| {
            let error = rewrite(candidate, version, registry, dry_run).err();
            SyncOutcome {
                path: candidate.path.clone(),
                version: version.to_string(),
                error,
            }
        })
        .collect()
}

fn rewrite(
    candidate: &SyncCandidate,
    version: &str,
    registry: &AdapterRegistry,
    dry_run: bool,
) -> Result<(), String> {
    let filename = candidate
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Invalid manifest path: {}", candidate.path.display()))?;
    let adapter = registry
        .get(filename)
        .ok_or_else(|| format!("No adapter for {}", filename))?;

    let content = fs::read_to_string(&candidate.path)
        .map_err(|e| format!("Failed to read {}: {}", candidate.path.display(), e))?;
    let updated = adapter
        .write_version(&content, version)
        .map_err(|e| e.to_string())?;

    if dry_run {
        debug!(path = %candidate.path.display(), version, "dry run: manifest not written");
        return Ok(());
    }

    fs::write(&candidate.path, updated)
        .map_err(|e| format!("Failed to write {}: {}", candidate.path.display(), e))?;
    info!(path = %candidate.path.display(), version, "synced manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(dir: &str, version: &str) -> Module {
        let path = Path::new(dir).join(".version");
        Module::new("m", path.clone(), path, version)
    }

    fn candidate(path: &str, format: ManifestFormat) -> SyncCandidate {
        SyncCandidate {
            path: PathBuf::from(path),
            format,
            field: "version".to_string(),
            pattern: None,
            description: path.to_string(),
        }
    }

    #[test]
    fn test_candidates_follow_their_closest_module() {
        let root = module("/proj", "1.0.0");
        let api = module("/proj/api", "1.0.0");
        let discovery = DiscoveryResult {
            root: PathBuf::from("/proj"),
            modules: vec![root.clone(), api.clone()],
            manifests: Vec::new(),
            mismatches: Vec::new(),
            sync_candidates: vec![
                candidate("/proj/package.json", ManifestFormat::Json),
                candidate("/proj/api/Cargo.toml", ManifestFormat::Toml),
                candidate("/proj/api/.version", ManifestFormat::Raw),
            ],
        };
        let results = vec![
            ExecutionResult::failed(&root, "boom"),
            ExecutionResult::succeeded(&api, "1.1.0"),
        ];

        let planned = plan(&discovery, &results);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].0.path, PathBuf::from("/proj/api/Cargo.toml"));
        assert_eq!(planned[0].1, "1.1.0");
    }

    #[test]
    fn test_orphan_candidates_are_left_alone() {
        let api = module("/proj/api", "1.0.0");
        let discovery = DiscoveryResult {
            root: PathBuf::from("/proj"),
            modules: vec![api.clone()],
            manifests: Vec::new(),
            mismatches: Vec::new(),
            sync_candidates: vec![candidate("/proj/web/package.json", ManifestFormat::Json)],
        };
        let results = vec![ExecutionResult::succeeded(&api, "2.0.0")];

        assert!(plan(&discovery, &results).is_empty());
    }
}
