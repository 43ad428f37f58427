//! Path helpers shared by discovery: exclude matching and relative paths.

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};

enum Matcher {
    Exact(String),
    Glob(Regex),
}

/// Compiled set of directory-name exclude patterns.
///
/// A pattern is either an exact directory name or a shell-style glob using
/// `*` and `?`. Patterns match a single path segment, never a full path.
pub struct ExcludeSet {
    matchers: Vec<Matcher>,
    version_file: String,
}

impl ExcludeSet {
    /// Compiles exclude patterns. Entries with `*` or `?` are globs, the rest match exact names.
    pub fn new(patterns: &[String], version_file: impl Into<String>) -> Result<Self> {
        let matchers = patterns
            .iter()
            .map(|pattern| {
                if pattern.contains('*') || pattern.contains('?') {
                    glob_to_regex(pattern).map(Matcher::Glob)
                } else {
                    Ok(Matcher::Exact(pattern.clone()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            matchers,
            version_file: version_file.into(),
        })
    }

    /// Returns true if a directory with this name must not be descended into.
    ///
    /// Hidden directories are excluded unless named exactly like the version file.
    pub fn is_excluded(&self, name: &str) -> bool {
        if name.starts_with('.') && name != self.version_file {
            return true;
        }
        self.matchers.iter().any(|m| match m {
            Matcher::Exact(exact) => exact == name,
            Matcher::Glob(re) => re.is_match(name),
        })
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Returns `path` relative to `root`, or `path` itself if it lies elsewhere.
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Returns true if any normal component of `path` equals `segment`.
pub fn contains_segment(path: &Path, segment: &str) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy() == segment,
        _ => false,
    })
}
