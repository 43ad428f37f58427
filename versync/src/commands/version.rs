//! Commands that change module versions.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use versync_core::{
    error_count, get_formatter_with_verb, has_errors, success_count, BumpType, CancelToken,
    DiscoveryResult, Error, ExecutionOptions, ExecutionResult, Operation, OutputFormat,
    WorkspaceExecutor,
};

use crate::formatting::{
    print_error, print_section_header, print_success, print_summary_box, print_warning,
    SectionStyle,
};
use crate::operations::{BumpOperation, PreReleaseOperation, SetOperation};

use super::sync::propagate;
use super::Workspace;

/// Flags shared by every version-changing command.
#[derive(clap::Args, Debug, Clone)]
pub struct ExecutionArgs {
    /// Update modules concurrently.
    #[arg(long, action)]
    pub parallel: bool,
    /// Worker threads for --parallel.
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
    /// Keep going after a module fails.
    #[arg(long, action)]
    pub continue_on_error: bool,
    /// Output format: table, json, text or quiet.
    #[arg(long, default_value = "table")]
    pub format: String,
    /// Compute new versions without writing anything.
    #[arg(long, action)]
    pub dry_run: bool,
    /// Also rewrite manifests owned by updated modules.
    #[arg(long, action)]
    pub sync: bool,
}

/// Bumps every discovered module by one semver level.
pub fn cmd_bump(
    root: &Path,
    cancel: &CancelToken,
    level: BumpType,
    args: ExecutionArgs,
) -> Result<()> {
    let operation = BumpOperation {
        level,
        dry_run: args.dry_run,
    };
    run_operation(root, cancel, &format!("bump {}", level.as_str()), "bumped", &operation, &args)
}

pub fn cmd_pre(root: &Path, cancel: &CancelToken, label: String, args: ExecutionArgs) -> Result<()> {
    let operation = PreReleaseOperation {
        label: label.clone(),
        dry_run: args.dry_run,
    };
    run_operation(root, cancel, &format!("pre {}", label), "updated", &operation, &args)
}

/// Sets every discovered module to one explicit version.
pub fn cmd_set(root: &Path, cancel: &CancelToken, version: String, args: ExecutionArgs) -> Result<()> {
    let operation = SetOperation::new(&version, args.dry_run)?;
    run_operation(root, cancel, "set", "set", &operation, &args)
}

fn run_operation(
    root: &Path,
    cancel: &CancelToken,
    operation_name: &str,
    verb: &str,
    operation: &dyn Operation,
    args: &ExecutionArgs,
) -> Result<()> {
    let start = Instant::now();
    let workspace = Workspace::open(root)?;
    let discovery = workspace.discovery.discover(cancel, &workspace.root)?;
    if discovery.modules.is_empty() {
        return Err(anyhow::anyhow!(
            "No modules found: no {} files under {}",
            workspace.config.version_file,
            workspace.root.display()
        ));
    }

    let continue_on_error = args.continue_on_error || workspace.config.workspace.continue_on_error;
    let options = ExecutionOptions {
        parallel: args.parallel || workspace.config.workspace.parallel,
        fail_fast: !continue_on_error,
    };
    let format = OutputFormat::parse(&args.format);
    let decorated = matches!(format, OutputFormat::Table);

    let executor = WorkspaceExecutor::new().with_max_parallel(args.jobs);
    let (results, stop) = match executor.run(cancel, &discovery.modules, operation, options) {
        Ok(results) => (results, Stop::Completed),
        Err(Error::FailFast { results, .. }) => (results, Stop::FailFast),
        Err(Error::Cancelled { results }) if !results.is_empty() => (results, Stop::Cancelled),
        Err(e) => return Err(e.into()),
    };

    if decorated {
        let title = if args.dry_run {
            format!("{} (dry run)", operation_name)
        } else {
            operation_name.to_string()
        };
        print_section_header(&title, SectionStyle::Primary);
    }
    let formatter = get_formatter_with_verb(format.as_str(), operation_name, verb);
    println!("{}", formatter.format_results(&results));

    let sync_failures = if args.sync && stop != Stop::Cancelled {
        sync_manifests(&workspace, &discovery, &results, args.dry_run, decorated)
    } else {
        0
    };

    if decorated {
        println!();
        print_outcome(&results, verb, stop, continue_on_error);
        let duration = format!("{:.2}s", start.elapsed().as_secs_f64());
        print_summary_box(
            "Summary",
            &[
                ("Modules", &results.len().to_string()),
                ("Succeeded", &success_count(&results).to_string()),
                ("Failed", &error_count(&results).to_string()),
                ("Duration", &duration),
            ],
        );
        println!();
    }

    if stop == Stop::Cancelled {
        if !decorated {
            eprintln!(
                "warning: cancelled, {} of {} modules changed",
                success_count(&results),
                results.len()
            );
        }
        std::process::exit(1);
    }

    if has_errors(&results) || sync_failures > 0 {
        if continue_on_error {
            if !decorated {
                eprintln!(
                    "warning: {} of {} modules failed, {} manifests not synced",
                    error_count(&results),
                    results.len(),
                    sync_failures
                );
            }
        } else {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Why the executor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Completed,
    FailFast,
    Cancelled,
}

fn print_outcome(results: &[ExecutionResult], verb: &str, stop: Stop, continue_on_error: bool) {
    let failed = error_count(results);
    if stop == Stop::Cancelled {
        print_warning(&format!(
            "Cancelled: {} of {} modules {}, the rest were not started",
            success_count(results),
            results.len(),
            verb
        ));
    } else if failed == 0 {
        print_success(&format!("All {} modules {}", results.len(), verb));
    } else if stop == Stop::FailFast {
        print_error("Stopped after the first failure");
    } else if continue_on_error {
        print_warning(&format!(
            "{} succeeded, {} failed",
            success_count(results),
            failed
        ));
    } else {
        print_error(&format!("{} of {} modules failed", failed, results.len()));
    }
}

/// Returns the number of manifests that could not be rewritten.
fn sync_manifests(
    workspace: &Workspace,
    discovery: &DiscoveryResult,
    results: &[ExecutionResult],
    dry_run: bool,
    decorated: bool,
) -> usize {
    let outcomes = propagate(discovery, results, &workspace.registry, dry_run);
    let failures = outcomes.iter().filter(|o| o.error.is_some()).count();
    if !decorated {
        for outcome in outcomes.iter().filter(|o| o.error.is_some()) {
            eprintln!(
                "sync failed for {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or_default()
            );
        }
        return failures;
    }

    println!();
    print_section_header("Sync", SectionStyle::Primary);
    if outcomes.is_empty() {
        print_warning("No manifests to sync");
        return failures;
    }
    for outcome in &outcomes {
        let path = outcome
            .path
            .strip_prefix(&workspace.root)
            .unwrap_or(outcome.path.as_path())
            .display();
        match &outcome.error {
            None => print_success(&format!("{} → {}", path, outcome.version)),
            Some(err) => print_error(&format!("{}: {}", path, err)),
        }
    }
    failures
}
