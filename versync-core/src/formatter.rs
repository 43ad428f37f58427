//! Rendering of execution results as table, JSON, text or a quiet summary.
//!
//! Formatters only build strings; printing is left to the caller.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::executor::{error_count, has_errors, success_count, ExecutionResult};

/// Verb used when the caller does not supply one.
pub const DEFAULT_ACTION_VERB: &str = "updated";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Text,
    Quiet,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognized falls back to text.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "table" => OutputFormat::Table,
            "json" => OutputFormat::Json,
            "quiet" => OutputFormat::Quiet,
            _ => OutputFormat::Text,
        }
    }

    /// Returns the canonical name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
            OutputFormat::Quiet => "quiet",
        }
    }
}

/// Renders a result set into printable text.
pub trait Formatter {
    fn format_results(&self, results: &[ExecutionResult]) -> String;
}

/// Creates a formatter for the named format, using the default action verb.
pub fn get_formatter(format: &str, operation_name: &str) -> Box<dyn Formatter> {
    get_formatter_with_verb(format, operation_name, DEFAULT_ACTION_VERB)
}

/// Creates a formatter for the named format. `action_verb` appears in per-module text lines.
pub fn get_formatter_with_verb(
    format: &str,
    operation_name: &str,
    action_verb: &str,
) -> Box<dyn Formatter> {
    match OutputFormat::parse(format) {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter {
            operation: operation_name.to_string(),
        }),
        OutputFormat::Text => Box::new(TextFormatter {
            verb: action_verb.to_string(),
        }),
        OutputFormat::Quiet => Box::new(QuietFormatter),
    }
}

fn status_text(result: &ExecutionResult) -> String {
    match (&result.error, result.skipped) {
        (None, _) => result.new_version.clone(),
        (Some(_), true) => "SKIPPED".to_string(),
        (Some(err), false) => format!("FAILED: {}", err),
    }
}

/// Bordered table with one row per module.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_results(&self, results: &[ExecutionResult]) -> String {
        let mut table = Table::new();
        table
            .set_header(vec![
                Cell::new("Module").add_attribute(Attribute::Bold),
                Cell::new("Old Version").add_attribute(Attribute::Bold),
                Cell::new("New Version").add_attribute(Attribute::Bold),
            ])
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Disabled);

        for result in results {
            table.add_row(vec![
                Cell::new(&result.module.name),
                Cell::new(&result.old_version),
                Cell::new(status_text(result)),
            ]);
        }

        table.to_string()
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    module: &'a str,
    path: String,
    operation: &'a str,
    old_version: &'a str,
    new_version: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Pretty-printed JSON array, one object per module.
pub struct JsonFormatter {
    operation: String,
}

impl Formatter for JsonFormatter {
    fn format_results(&self, results: &[ExecutionResult]) -> String {
        let rows: Vec<JsonResult<'_>> = results
            .iter()
            .map(|r| JsonResult {
                module: &r.module.name,
                path: r.module.rel_path.display().to_string(),
                operation: &self.operation,
                old_version: &r.old_version,
                new_version: &r.new_version,
                success: r.is_success(),
                error: r.error.as_deref(),
            })
            .collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }
}

pub struct TextFormatter {
    verb: String,
}

impl Formatter for TextFormatter {
    fn format_results(&self, results: &[ExecutionResult]) -> String {
        results
            .iter()
            .map(|r| match (&r.error, r.skipped) {
                (None, _) => format!(
                    "{}: {} {} → {}",
                    r.module.name, self.verb, r.old_version, r.new_version
                ),
                (Some(_), true) => format!("{}: skipped", r.module.name),
                (Some(err), false) => format!("{}: failed: {}", r.module.name, err),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One summary line. The success wording is fixed regardless of the action verb.
pub struct QuietFormatter;

impl Formatter for QuietFormatter {
    fn format_results(&self, results: &[ExecutionResult]) -> String {
        if has_errors(results) {
            format!(
                "Completed: {} succeeded, {} failed",
                success_count(results),
                error_count(results)
            )
        } else {
            format!("Success: {} module(s) updated", results.len())
        }
    }
}
