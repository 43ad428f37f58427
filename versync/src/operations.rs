//! Concrete version operations applied by the workspace executor.

use std::fs;

use semver::Version;
use tracing::info;
use versync_core::error::{Error, Result};
use versync_core::version::parse_version_strict;
use versync_core::{bump_prerelease, BumpType, Module, Operation};

/// Rewrites a module's version file, or only reports the new version on a dry run.
fn write_version_file(module: &Module, version: &Version, dry_run: bool) -> Result<String> {
    let new_version = version.to_string();
    if dry_run {
        return Ok(new_version);
    }

    fs::write(&module.path, format!("{}\n", new_version)).map_err(|e| Error::Operation {
        module: module.name.clone(),
        message: format!("Failed to write {}: {}", module.path.display(), e),
    })?;
    info!(module = %module.name, version = %new_version, "wrote version file");
    Ok(new_version)
}

fn current_version(module: &Module) -> Result<Version> {
    parse_version_strict(&module.version).map_err(|e| Error::Operation {
        module: module.name.clone(),
        message: e.to_string(),
    })
}

/// Increments the major, minor or patch component.
pub struct BumpOperation {
    pub level: BumpType,
    pub dry_run: bool,
}

impl Operation for BumpOperation {
    fn apply(&self, module: &Module) -> Result<String> {
        let next = self.level.apply(&current_version(module)?).map_err(|e| Error::Operation {
            module: module.name.clone(),
            message: e.to_string(),
        })?;
        write_version_file(module, &next, self.dry_run)
    }
}

pub struct PreReleaseOperation {
    pub label: String,
    pub dry_run: bool,
}

impl Operation for PreReleaseOperation {
    fn apply(&self, module: &Module) -> Result<String> {
        let next = bump_prerelease(&current_version(module)?, &self.label).map_err(|e| {
            Error::Operation {
                module: module.name.clone(),
                message: e.to_string(),
            }
        })?;
        write_version_file(module, &next, self.dry_run)
    }
}

/// Sets one explicit version everywhere. The target is validated up front.
pub struct SetOperation {
    pub version: Version,
    pub dry_run: bool,
}

impl SetOperation {
    /// Creates a new set operation, rejecting a target that is not valid semver.
    pub fn new(version: &str, dry_run: bool) -> Result<Self> {
        Ok(Self {
            version: parse_version_strict(version)?,
            dry_run,
        })
    }
}

impl Operation for SetOperation {
    fn apply(&self, module: &Module) -> Result<String> {
        write_version_file(module, &self.version, self.dry_run)
    }
}
