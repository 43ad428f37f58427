//! Core library for keeping monorepo component versions in sync.

pub mod adapter;
pub mod adapter_registry;
pub mod cancel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod fs;
pub mod module;
pub mod path_utils;
pub mod version;

pub use adapter::{ExtractedVersion, ManifestAdapter};
pub use adapter_registry::AdapterRegistry;
pub use cancel::CancelToken;
pub use config::{Config, DiscoveryConfig, WorkspaceConfig};
pub use discovery::Discovery;
pub use error::{Error, Result};
pub use executor::{
    error_count, has_errors, success_count, successful_modules, ExecutionOptions,
    ExecutionResult, Operation, WorkspaceExecutor,
};
pub use formatter::{get_formatter, get_formatter_with_verb, Formatter, OutputFormat};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use module::{
    DiscoveryMode, DiscoveryResult, ManifestFormat, ManifestSource, Mismatch, Module,
    SyncCandidate, VersionSummary,
};
pub use version::{bump_prerelease, parse_version, BumpType};
