use serde_json::Value;
use versync_core::adapter::{ExtractedVersion, ManifestAdapter};
use versync_core::error::{Error, Result};
use versync_core::module::ManifestFormat;
use versync_core::version::parse_version_strict;

const FILENAME: &str = "package.json";

/// Index of the closing quote of the string whose body starts at `start`.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Byte range of the value of the top-level `"version"` key, quotes excluded.
///
/// Objects and arrays both count towards depth, so `version` keys inside
/// nested objects are never matched.
fn top_level_version_span(content: &str) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            b'"' => {
                let end = string_end(bytes, i + 1)?;
                if depth == 1 && &content[i + 1..end] == "version" {
                    let after_key = content[end + 1..].trim_start();
                    if let Some(value) = after_key.strip_prefix(':').map(str::trim_start) {
                        if value.starts_with('"') {
                            let value_start = content.len() - value.len() + 1;
                            let value_end = string_end(bytes, value_start)?;
                            return Some((value_start, value_end));
                        }
                    }
                }
                i = end;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Reads and rewrites the top-level `version` of an npm manifest.
pub struct PackageJsonAdapter;

impl PackageJsonAdapter {
    fn parse(content: &str) -> Option<Value> {
        let json: Value = serde_json::from_str(content).ok()?;
        json.is_object().then_some(json)
    }
}

impl ManifestAdapter for PackageJsonAdapter {
    fn filename(&self) -> &'static str {
        FILENAME
    }

    fn format(&self) -> ManifestFormat {
        ManifestFormat::Json
    }

    fn description(&self) -> &'static str {
        "npm package manifest"
    }

    fn extract(&self, content: &str) -> Option<ExtractedVersion> {
        let json = Self::parse(content)?;
        let version = json.get("version")?.as_str()?;
        Some(ExtractedVersion::new(version, "version"))
    }

    fn write_version(&self, content: &str, new_version: &str) -> Result<String> {
        parse_version_strict(new_version)?;

        if self.extract(content).is_none() {
            return Err(Error::Adapter {
                manifest: FILENAME.to_string(),
                message: "Could not find a top-level 'version' string".to_string(),
            });
        }

        let (start, end) = top_level_version_span(content).ok_or_else(|| Error::Adapter {
            manifest: FILENAME.to_string(),
            message: "Could not locate the top-level 'version' key".to_string(),
        })?;

        let mut updated = String::with_capacity(content.len() + new_version.len());
        updated.push_str(&content[..start]);
        updated.push_str(new_version);
        updated.push_str(&content[end..]);
        Ok(updated)
    }
}
