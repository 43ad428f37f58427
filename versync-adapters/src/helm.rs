use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::Value;
use versync_core::adapter::{ExtractedVersion, ManifestAdapter};
use versync_core::error::{Error, Result};
use versync_core::module::ManifestFormat;
use versync_core::version::parse_version_strict;

const FILENAME: &str = "Chart.yaml";

// Top-level key only; `appVersion` and indented keys are left alone.
static CHART_VERSION: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"(?m)^(version:[ \t]*)(["']?)([^"'\s#]+)(["']?)"#));

/// Helm chart metadata.
pub struct HelmChartAdapter;

impl ManifestAdapter for HelmChartAdapter {
    fn filename(&self) -> &'static str {
        FILENAME
    }

    fn format(&self) -> ManifestFormat {
        ManifestFormat::Yaml
    }

    fn description(&self) -> &'static str {
        "Helm chart"
    }

    fn extract(&self, content: &str) -> Option<ExtractedVersion> {
        let yaml: Value = serde_yaml::from_str(content).ok()?;
        let version = yaml.get("version")?.as_str()?;
        Some(ExtractedVersion::new(version, "version"))
    }

    fn write_version(&self, content: &str, new_version: &str) -> Result<String> {
        parse_version_strict(new_version)?;

        if self.extract(content).is_none() {
            return Err(Error::Adapter {
                manifest: FILENAME.to_string(),
                message: "Could not find a top-level 'version' key".to_string(),
            });
        }

        let version_re = CHART_VERSION.as_ref().map_err(|e| Error::Adapter {
            manifest: FILENAME.to_string(),
            message: format!("Failed to create regex: {}", e),
        })?;
        if !version_re.is_match(content) {
            return Err(Error::Adapter {
                manifest: FILENAME.to_string(),
                message: "'version' is not written on a single line".to_string(),
            });
        }

        let updated = version_re.replace(content, |caps: &Captures| {
            format!("{}{}{}{}", &caps[1], &caps[2], new_version, &caps[4])
        });
        Ok(updated.into_owned())
    }
}
