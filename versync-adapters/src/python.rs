use toml::Value;
use versync_core::adapter::{ExtractedVersion, ManifestAdapter};
use versync_core::error::{Error, Result};
use versync_core::module::ManifestFormat;
use versync_core::version::parse_version_strict;

use crate::toml_section::replace_version;

const FILENAME: &str = "pyproject.toml";

/// PEP 621 `[project]` first, then Poetry's `[tool.poetry]`.
pub struct PyprojectAdapter;

impl ManifestAdapter for PyprojectAdapter {
    fn filename(&self) -> &'static str {
        FILENAME
    }

    fn format(&self) -> ManifestFormat {
        ManifestFormat::Toml
    }

    fn description(&self) -> &'static str {
        "Python project metadata"
    }

    fn extract(&self, content: &str) -> Option<ExtractedVersion> {
        let toml: Value = content.parse().ok()?;

        if let Some(version) = toml
            .get("project")
            .and_then(|p| p.get("version"))
            .and_then(|v| v.as_str())
        {
            return Some(ExtractedVersion::new(version, "project.version"));
        }

        toml.get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(|p| p.get("version"))
            .and_then(|v| v.as_str())
            .map(|version| ExtractedVersion::new(version, "tool.poetry.version"))
    }

    fn write_version(&self, content: &str, new_version: &str) -> Result<String> {
        parse_version_strict(new_version)?;

        let extracted = self.extract(content).ok_or_else(|| Error::Adapter {
            manifest: FILENAME.to_string(),
            message: "Could not find 'project.version' or 'tool.poetry.version'".to_string(),
        })?;
        let table = if extracted.field == "project.version" {
            "project"
        } else {
            "tool.poetry"
        };

        replace_version(FILENAME, content, table, new_version)?.ok_or_else(|| Error::Adapter {
            manifest: FILENAME.to_string(),
            message: format!("Could not rewrite '{}'", extracted.field),
        })
    }
}
