//! Discovery tables using comfy-table.

use std::path::Path;

use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use versync_core::{ManifestSource, Mismatch, Module, SyncCandidate, VersionSummary};

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(comfy_table::Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

pub fn print_module_table(modules: &[Module]) {
    let mut table = styled_table(&["Module", "Path", "Version"]);
    for module in modules {
        table.add_row(vec![
            Cell::new(&module.name).fg(Color::White),
            Cell::new(display(&module.rel_path)).fg(Color::DarkGrey),
            Cell::new(&module.version).fg(Color::Cyan),
        ]);
    }
    println!("{}", table);
}

pub fn print_manifest_table(manifests: &[ManifestSource]) {
    let mut table = styled_table(&["Manifest", "Format", "Field", "Version"]);
    for manifest in manifests {
        let field = if manifest.field.is_empty() {
            "-".to_string()
        } else {
            manifest.field.clone()
        };
        table.add_row(vec![
            Cell::new(display(&manifest.rel_path)).fg(Color::White),
            Cell::new(manifest.format.as_str()).fg(Color::DarkGrey),
            Cell::new(field).fg(Color::DarkGrey),
            Cell::new(&manifest.version).fg(Color::Cyan),
        ]);
    }
    println!("{}", table);
}

pub fn print_mismatch_table(mismatches: &[Mismatch]) {
    let mut table = styled_table(&["Source", "Expected", "Actual"]);
    for mismatch in mismatches {
        table.add_row(vec![
            Cell::new(display(&mismatch.source)).fg(Color::White),
            Cell::new(&mismatch.expected_version).fg(Color::Green),
            Cell::new(&mismatch.actual_version).fg(Color::Red),
        ]);
    }
    println!("{}", table);
}

pub fn print_version_summary_table(summary: &[VersionSummary]) {
    let mut table = styled_table(&["Version", "Count", "Sources"]);
    for entry in summary {
        let sources: Vec<String> = entry.sources.iter().map(|s| display(s)).collect();
        table.add_row(vec![
            Cell::new(&entry.version).fg(Color::Cyan),
            Cell::new(entry.count),
            Cell::new(sources.join("\n")).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
}

pub fn print_sync_candidates(candidates: &[SyncCandidate]) {
    if candidates.is_empty() {
        println!("  {} {}", "→".cyan(), "(none)".bright_black());
        return;
    }

    for candidate in candidates {
        println!("  {} {}", "→".cyan(), candidate.description.bold().white());
    }
}
