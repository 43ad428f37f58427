use toml::Value;
use versync_core::adapter::{ExtractedVersion, ManifestAdapter};
use versync_core::error::{Error, Result};
use versync_core::module::ManifestFormat;
use versync_core::version::parse_version_strict;

use crate::toml_section::replace_version;

const FILENAME: &str = "Cargo.toml";

/// Tables a crate manifest may carry its version in, in lookup order.
const VERSION_TABLES: [&str; 2] = ["package", "workspace.package"];

/// Handles `package.version`, falling back to `workspace.package.version`
/// for virtual workspace roots. Members inheriting `version.workspace = true`
/// have no version of their own.
pub struct CargoAdapter;

fn lookup<'a>(toml: &'a Value, table: &str) -> Option<&'a str> {
    table
        .split('.')
        .try_fold(toml, |value, key| value.get(key))?
        .get("version")?
        .as_str()
}

impl ManifestAdapter for CargoAdapter {
    fn filename(&self) -> &'static str {
        FILENAME
    }

    fn format(&self) -> ManifestFormat {
        ManifestFormat::Toml
    }

    fn description(&self) -> &'static str {
        "Cargo crate manifest"
    }

    fn extract(&self, content: &str) -> Option<ExtractedVersion> {
        let toml: Value = content.parse().ok()?;
        VERSION_TABLES.iter().find_map(|table| {
            lookup(&toml, table)
                .map(|version| ExtractedVersion::new(version, format!("{}.version", table)))
        })
    }

    fn write_version(&self, content: &str, new_version: &str) -> Result<String> {
        parse_version_strict(new_version)?;

        let extracted = self.extract(content).ok_or_else(|| Error::Adapter {
            manifest: FILENAME.to_string(),
            message: "Could not find 'package.version'. \
                Ensure the file contains a [package] section with a version field."
                .to_string(),
        })?;
        let table = extracted
            .field
            .strip_suffix(".version")
            .unwrap_or(extracted.field.as_str());

        replace_version(FILENAME, content, table, new_version)?.ok_or_else(|| Error::Adapter {
            manifest: FILENAME.to_string(),
            message: format!(
                "'{}' is not written as a plain `version = \"...\"` line",
                extracted.field
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_package_version() {
        let content = "[package]\nname = \"core\"\nversion = \"0.3.1\"\n";
        let extracted = CargoAdapter.extract(content).unwrap();
        assert_eq!(extracted.version, "0.3.1");
        assert_eq!(extracted.field, "package.version");
    }

    #[test]
    fn test_extract_workspace_package_version() {
        let content = "[workspace]\nmembers = [\"a\"]\n\n[workspace.package]\nversion = \"2.0.0\"\n";
        let extracted = CargoAdapter.extract(content).unwrap();
        assert_eq!(extracted.version, "2.0.0");
        assert_eq!(extracted.field, "workspace.package.version");
    }

    #[test]
    fn test_inherited_version_is_not_extracted() {
        let content = "[package]\nname = \"member\"\nversion.workspace = true\n";
        assert!(CargoAdapter.extract(content).is_none());
    }

    #[test]
    fn test_extract_malformed() {
        assert!(CargoAdapter.extract("[package\nversion = ").is_none());
    }

    #[test]
    fn test_write_keeps_comments_and_dependencies() {
        let content = "# crate\n[package]\nname = \"core\"\nversion = \"0.3.1\" # bumped by CI\n\n[dependencies]\nserde = { version = \"1.0\" }\n";
        let updated = CargoAdapter.write_version(content, "0.4.0").unwrap();
        assert_eq!(
            updated,
            "# crate\n[package]\nname = \"core\"\nversion = \"0.4.0\" # bumped by CI\n\n[dependencies]\nserde = { version = \"1.0\" }\n"
        );
    }

    #[test]
    fn test_write_workspace_package() {
        let content = "[workspace.package]\nversion = \"2.0.0\"\nedition = \"2021\"\n";
        let updated = CargoAdapter.write_version(content, "2.1.0").unwrap();
        assert!(updated.contains("version = \"2.1.0\""));
        assert!(updated.contains("edition = \"2021\""));
    }

    #[test]
    fn test_write_without_version_fails() {
        let content = "[build-system]\nrequires = []\n";
        let err = CargoAdapter.write_version(content, "1.0.0").unwrap_err();
        assert!(err.to_string().contains("Could not find 'package.version'"));
    }
}
