//! Line-level edits of `key = "value"` pairs inside a TOML table.
//!
//! Re-serializing a manifest through `toml::Value` drops comments and key
//! order, so writes operate on the raw text instead.

use once_cell::sync::Lazy;
use regex::Regex;
use versync_core::error::{Error, Result};

static VERSION_LINE: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"^(\s*version\s*=\s*)(["'])([^"']*)(["'])"#));

fn version_line(manifest: &str) -> Result<&'static Regex> {
    VERSION_LINE.as_ref().map_err(|e| Error::Adapter {
        manifest: manifest.to_string(),
        message: format!("Failed to create regex: {}", e),
    })
}

/// Name of the table a header line opens, `None` for array-of-tables headers.
fn header_name(line: &str) -> Option<Option<String>> {
    let trimmed = line.trim();
    if trimmed.starts_with("[[") {
        return Some(None);
    }
    let inner = trimmed.strip_prefix('[')?;
    let end = inner.find(']')?;
    let name: String = inner[..end]
        .split('.')
        .map(|part| part.trim().trim_matches('"'))
        .collect::<Vec<_>>()
        .join(".");
    Some(Some(name))
}

/// Replaces the first `version = "..."` line of `table`, keeping the quote
/// style and anything after the closing quote. Returns `None` if the table has
/// no such line.
pub(crate) fn replace_version(
    manifest: &str,
    content: &str,
    table: &str,
    new_version: &str,
) -> Result<Option<String>> {
    let version_re = version_line(manifest)?;
    let mut current: Option<String> = None;
    let mut replaced = false;
    let mut out = String::with_capacity(content.len() + new_version.len());

    for line in content.split_inclusive('\n') {
        if let Some(header) = header_name(line) {
            current = header;
            out.push_str(line);
            continue;
        }

        if !replaced && current.as_deref() == Some(table) {
            if let Some(caps) = version_re.captures(line) {
                let whole = caps.get(0).map_or(0, |m| m.end());
                out.push_str(&caps[1]);
                out.push_str(&caps[2]);
                out.push_str(new_version);
                out.push_str(&caps[4]);
                out.push_str(&line[whole..]);
                replaced = true;
                continue;
            }
        }
        out.push_str(line);
    }

    Ok(replaced.then_some(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_only_inside_table() {
        let content = "[dependencies]\nversion = \"0.1.0\"\n\n[package]\nname = \"x\"\nversion = \"1.0.0\" # keep\n";
        let updated = replace_version("Cargo.toml", content, "package", "2.0.0").unwrap().unwrap();
        assert_eq!(
            updated,
            "[dependencies]\nversion = \"0.1.0\"\n\n[package]\nname = \"x\"\nversion = \"2.0.0\" # keep\n"
        );
    }

    #[test]
    fn test_dotted_and_quoted_headers() {
        let content = "[ tool . \"poetry\" ]\nversion = '0.3.0'\n";
        let updated = replace_version("pyproject.toml", content, "tool.poetry", "0.4.0").unwrap().unwrap();
        assert_eq!(updated, "[ tool . \"poetry\" ]\nversion = '0.4.0'\n");
    }

    #[test]
    fn test_array_tables_end_the_section() {
        let content = "[package]\nname = \"x\"\n[[bin]]\nversion = \"9.9.9\"\n";
        assert!(replace_version("Cargo.toml", content, "package", "1.0.0").unwrap().is_none());
    }

    #[test]
    fn test_missing_table() {
        assert!(replace_version("pyproject.toml", "name = \"x\"\n", "project", "1.0.0")
            .unwrap()
            .is_none());
    }
}
