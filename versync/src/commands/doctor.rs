//! Version consistency check.

use std::path::Path;

use anyhow::Result;
use versync_core::CancelToken;

use crate::formatting::{
    print_error, print_key_value, print_mismatch_table, print_section_header, print_success,
    print_version_summary_table, print_warning, SectionStyle,
};

use super::Workspace;

/// Exits with status 1 when sources disagree.
pub fn cmd_doctor(
    root: &Path,
    cancel: &CancelToken,
    expected: Option<String>,
    json: bool,
) -> Result<()> {
    let workspace = Workspace::open(root)?;
    if let Some(ref version) = expected {
        versync_core::version::parse_version_strict(version)?;
    }

    let discovery = workspace.discovery.with_expected_version(expected);
    let result = discovery.discover(cancel, &workspace.root)?;
    let summary = result.version_summary();

    // Without an authoritative version, any disagreement counts as drift.
    let authoritative = discovery.expected_version().is_some() || result.root_module().is_some();
    let drifted = if authoritative {
        !result.is_consistent()
    } else {
        summary.len() > 1
    };

    if json {
        let report = serde_json::json!({
            "root": result.root,
            "mode": result.mode(),
            "consistent": !drifted,
            "mismatches": result.mismatches,
            "versions": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_section_header("Version doctor", SectionStyle::Primary);
        print_key_value("Root", &result.root.display().to_string());
        print_key_value("Mode", result.mode().as_str());
        if let Some(root_module) = result.root_module() {
            print_key_value("Root version", &root_module.version);
        }
        println!();

        if summary.is_empty() {
            print_warning("No versions found");
        } else {
            print_version_summary_table(&summary);
        }
        println!();

        if !result.mismatches.is_empty() {
            print_section_header("Mismatches", SectionStyle::Warning);
            print_mismatch_table(&result.mismatches);
            println!();
        }

        if drifted {
            print_error(&format!(
                "{} versions in use across {} sources",
                summary.len(),
                summary.iter().map(|s| s.count).sum::<usize>()
            ));
        } else {
            print_success("All versions agree");
        }
        println!();
    }

    if drifted {
        std::process::exit(1);
    }

    Ok(())
}
