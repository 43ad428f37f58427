use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use versync_core::adapter::{ExtractedVersion, ManifestAdapter};
use versync_core::error::{Error, Result};
use versync_core::module::ManifestFormat;
use versync_core::version::parse_version_strict;

const FILENAME: &str = "gradle.properties";
const PATTERN: &str = r"(?m)^([ \t]*version[ \t]*=[ \t]*)(\S+)[ \t]*\r?$";

static VERSION_PROPERTY: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(PATTERN));

/// `version=` property of a Gradle build. Located by regex since properties
/// files have no structured parser in the stack.
pub struct GradlePropertiesAdapter;

fn version_property() -> Result<&'static Regex> {
    VERSION_PROPERTY.as_ref().map_err(|e| Error::Adapter {
        manifest: FILENAME.to_string(),
        message: format!("Failed to create regex: {}", e),
    })
}

impl ManifestAdapter for GradlePropertiesAdapter {
    fn filename(&self) -> &'static str {
        FILENAME
    }

    fn format(&self) -> ManifestFormat {
        ManifestFormat::Regex
    }

    fn description(&self) -> &'static str {
        "Gradle properties"
    }

    fn pattern(&self) -> Option<&'static str> {
        Some(PATTERN)
    }

    fn extract(&self, content: &str) -> Option<ExtractedVersion> {
        let caps = version_property().ok()?.captures(content)?;
        Some(ExtractedVersion::new(&caps[2], ""))
    }

    fn write_version(&self, content: &str, new_version: &str) -> Result<String> {
        parse_version_strict(new_version)?;

        let version_re = version_property()?;
        if !version_re.is_match(content) {
            return Err(Error::Adapter {
                manifest: FILENAME.to_string(),
                message: "Could not find a 'version=' property".to_string(),
            });
        }

        let updated = version_re.replace(content, |caps: &Captures| {
            let suffix = if caps[0].ends_with('\r') { "\r" } else { "" };
            format!("{}{}{}", &caps[1], new_version, suffix)
        });
        Ok(updated.into_owned())
    }
}
