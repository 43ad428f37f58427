//! Command implementations for the CLI.

mod discover;
mod doctor;
mod sync;
mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use versync_adapters::default_registry;
use versync_core::{AdapterRegistry, CancelToken, Config, Discovery, OsFileSystem};

pub use discover::cmd_discover;
pub use doctor::cmd_doctor;
pub use version::{cmd_bump, cmd_pre, cmd_set, ExecutionArgs};

/// A loaded project: canonical root, its configuration and a ready discovery service.
struct Workspace {
    root: PathBuf,
    config: Config,
    registry: Arc<AdapterRegistry>,
    discovery: Discovery,
}

impl Workspace {
    fn open(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Project root not found: {}", root.display()))?;
        let config = Config::load(&root)?;

        let mut discovery_config = config.discovery.clone();
        if !discovery_config.enabled {
            discovery_config.recursive = false;
        }

        let registry = Arc::new(default_registry());
        let discovery = Discovery::new(
            discovery_config,
            Arc::new(OsFileSystem),
            Arc::clone(&registry),
        )
        .with_version_file(config.version_file.clone());

        Ok(Self {
            root,
            config,
            registry,
            discovery,
        })
    }
}

/// Cancels the returned token on Ctrl+C.
pub fn install_cancel_handler() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || handle.cancel())
        .map_err(|e| anyhow::anyhow!("Failed to set signal handler: {}", e))?;
    Ok(cancel)
}
