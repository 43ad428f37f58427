//! Discovery and inspection commands.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use versync_core::CancelToken;

use crate::formatting::{
    print_key_value, print_manifest_table, print_mismatch_table, print_module_table,
    print_section_header, print_sync_candidates, print_warning, SectionStyle,
};

use super::Workspace;

pub fn cmd_discover(
    root: &Path,
    cancel: &CancelToken,
    json: bool,
    depth: Option<usize>,
    modules_only: bool,
    manifests_only: bool,
) -> Result<()> {
    let workspace = Workspace::open(root)?;
    let discovery = &workspace.discovery;

    if modules_only {
        let modules = discovery.discover_modules_only(cancel, &workspace.root)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&modules)?);
        } else {
            print_section_header("Modules", SectionStyle::Primary);
            if modules.is_empty() {
                print_warning(&format!("No {} files found", discovery.version_file()));
            } else {
                print_module_table(&modules);
            }
            println!();
        }
        return Ok(());
    }

    if manifests_only {
        let manifests = discovery.discover_manifests_only(cancel, &workspace.root)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&manifests)?);
        } else {
            print_section_header("Manifests", SectionStyle::Primary);
            if manifests.is_empty() {
                print_warning("No versioned manifests found");
            } else {
                print_manifest_table(&manifests);
            }
            println!();
        }
        return Ok(());
    }

    let result = match depth {
        Some(depth) => discovery.discover_with_depth(cancel, &workspace.root, depth)?,
        None => discovery.discover(cancel, &workspace.root)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_section_header("Discovering modules...", SectionStyle::Primary);
    print_key_value("Root", &result.root.display().to_string());
    print_key_value("Mode", result.mode().as_str());
    println!();

    if result.modules.is_empty() {
        print_warning(&format!("No {} files found", discovery.version_file()));
    } else {
        println!(
            "  {} Found {} {}",
            "OK".green(),
            result.modules.len().to_string().bold().cyan(),
            "modules".bold()
        );
        println!();
        print_module_table(&result.modules);
    }
    println!();

    if !result.manifests.is_empty() {
        print_section_header("Manifests", SectionStyle::Primary);
        print_manifest_table(&result.manifests);
        println!();
    }

    if !result.mismatches.is_empty() {
        print_section_header("Version drift", SectionStyle::Warning);
        print_mismatch_table(&result.mismatches);
        println!();
    }

    print_section_header("Sync candidates", SectionStyle::Primary);
    print_sync_candidates(&result.sync_candidates);
    println!();

    Ok(())
}
