//! Filesystem capability used by discovery.
//!
//! Discovery only ever reads. Tests substitute [`MemoryFileSystem`] for the
//! real [`OsFileSystem`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy)]
pub struct Metadata {
    pub kind: EntryKind,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Read-only filesystem operations.
///
/// `read_dir` must return entries sorted by name so discovery output is
/// stable across platforms.
pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> io::Result<Metadata>;
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Filesystem backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        let meta = std::fs::metadata(path)?;
        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        Ok(Metadata { kind })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            // Follows symlinks; broken links are reported as files and skipped later.
            let kind = match std::fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => EntryKind::Dir,
                _ => EntryKind::File,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory filesystem for tests and dry runs.
///
/// Directories are implied by the files added beneath them. Paths registered
/// with [`MemoryFileSystem::deny`] fail with `PermissionDenied`.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    denied: HashSet<PathBuf>,
}

impl MemoryFileSystem {
    /// Creates a new, empty in-memory tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating every ancestor directory.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> &mut Self {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path, contents.into());
        self
    }

    /// Adds an empty directory and its ancestors.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
        self
    }

    /// Makes reads of `path` fail with `PermissionDenied`.
    pub fn deny(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.denied.insert(path.as_ref().to_path_buf());
        self
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        if self.files.contains_key(path) {
            return Ok(Metadata {
                kind: EntryKind::File,
            });
        }
        if self.dirs.contains(path) {
            return Ok(Metadata {
                kind: EntryKind::Dir,
            });
        }
        Err(Self::not_found(path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.check_access(path)?;
        if !self.dirs.contains(path) {
            return Err(Self::not_found(path));
        }

        let children = self
            .dirs
            .iter()
            .filter(|d| d.parent() == Some(path))
            .map(|d| (d, EntryKind::Dir))
            .chain(
                self.files
                    .keys()
                    .filter(|f| f.parent() == Some(path))
                    .map(|f| (f, EntryKind::File)),
            );

        let mut entries: Vec<DirEntry> = children
            .filter_map(|(child, kind)| {
                let name = child.file_name()?.to_string_lossy().into_owned();
                Some(DirEntry {
                    name,
                    path: child.clone(),
                    kind,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.check_access(path)?;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }
}
