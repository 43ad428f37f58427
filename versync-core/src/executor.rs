//! Applies one operation across every discovered module.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::module::Module;

const SKIPPED_AFTER_FAILURE: &str = "skipped after an earlier failure";
const SKIPPED_CANCELLED: &str = "skipped: cancelled";

/// A version-changing action applied to a single module.
///
/// Returns the module's new version. The executor never inspects what an
/// operation does and never interrupts one that has started.
pub trait Operation: Send + Sync {
    fn apply(&self, module: &Module) -> Result<String>;
}

impl<F> Operation for F
where
    F: Fn(&Module) -> Result<String> + Send + Sync,
{
    fn apply(&self, module: &Module) -> Result<String> {
        self(module)
    }
}

/// Per-invocation execution policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub parallel: bool,
    /// Stop scheduling new modules after the first failure.
    pub fail_fast: bool,
}

/// Outcome of applying an operation to one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub module: Module,
    pub old_version: String,
    pub new_version: String,
    /// `None` on success.
    pub error: Option<String>,
    /// The operation was never started for this module.
    pub skipped: bool,
}

impl ExecutionResult {
    /// Creates a new successful result moving `module` to `new_version`.
    pub fn succeeded(module: &Module, new_version: impl Into<String>) -> Self {
        Self {
            module: module.clone(),
            old_version: module.version.clone(),
            new_version: new_version.into(),
            error: None,
            skipped: false,
        }
    }

    /// Creates a new failed result; the module keeps its old version.
    pub fn failed(module: &Module, message: impl Into<String>) -> Self {
        Self {
            module: module.clone(),
            old_version: module.version.clone(),
            new_version: String::new(),
            error: Some(message.into()),
            skipped: false,
        }
    }

    fn skipped(module: &Module, reason: &str) -> Self {
        Self {
            skipped: true,
            ..Self::failed(module, reason)
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// True when any result failed. Skipped results count as failures.
pub fn has_errors(results: &[ExecutionResult]) -> bool {
    results.iter().any(|r| r.error.is_some())
}

pub fn error_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| r.error.is_some()).count()
}

/// Number of results that succeeded.
pub fn success_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| r.error.is_none()).count()
}

/// Modules whose operation succeeded, with their new versions.
pub fn successful_modules(results: &[ExecutionResult]) -> Vec<(&Module, &str)> {
    results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| (&r.module, r.new_version.as_str()))
        .collect()
}

/// Runs an [`Operation`] over a module list.
///
/// `results[i]` always belongs to `modules[i]`, whatever order work completes in.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceExecutor {
    max_parallel: Option<usize>,
}

impl WorkspaceExecutor {
    /// Creates a new executor with no cap on worker threads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps worker threads in parallel mode. Defaults to one per module.
    pub fn with_max_parallel(mut self, max_parallel: Option<usize>) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// Applies `operation` to every module.
    ///
    /// Under fail-fast the first failure is escalated to `Error::FailFast`,
    /// which carries the results gathered so far. Without fail-fast the call
    /// succeeds and failures are visible only through [`has_errors`].
    ///
    /// Cancellation stops new work and returns `Error::Cancelled` with a
    /// full-length result set; modules never started are marked skipped.
    pub fn run(
        &self,
        cancel: &CancelToken,
        modules: &[Module],
        operation: &dyn Operation,
        options: ExecutionOptions,
    ) -> Result<Vec<ExecutionResult>> {
        debug!(
            modules = modules.len(),
            parallel = options.parallel,
            fail_fast = options.fail_fast,
            "running workspace operation"
        );

        if modules.is_empty() {
            return Ok(Vec::new());
        }

        if options.parallel {
            self.run_parallel(cancel, modules, operation, options)
        } else {
            self.run_sequential(cancel, modules, operation, options)
        }
    }

    fn run_sequential(
        &self,
        cancel: &CancelToken,
        modules: &[Module],
        operation: &dyn Operation,
        options: ExecutionOptions,
    ) -> Result<Vec<ExecutionResult>> {
        let mut results = Vec::with_capacity(modules.len());

        for (index, module) in modules.iter().enumerate() {
            if cancel.is_cancelled() {
                results.extend(
                    modules[index..]
                        .iter()
                        .map(|m| ExecutionResult::skipped(m, SKIPPED_CANCELLED)),
                );
                return Err(Error::Cancelled { results });
            }
            let result = apply_one(operation, module);
            let failure = result.error.clone();
            results.push(result);

            if let (true, Some(message)) = (options.fail_fast, failure) {
                return Err(Error::FailFast {
                    module: module.name.clone(),
                    message,
                    results,
                });
            }
        }

        Ok(results)
    }

    fn run_parallel(
        &self,
        cancel: &CancelToken,
        modules: &[Module],
        operation: &dyn Operation,
        options: ExecutionOptions,
    ) -> Result<Vec<ExecutionResult>> {
        let threads = self.max_parallel.unwrap_or(modules.len()).clamp(1, modules.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("versync-worker-{}", i))
            .build()
            .map_err(|e| Error::Executor(format!("failed to start worker pool: {}", e)))?;

        let abort = AtomicBool::new(false);
        let (tx, rx) = channel::unbounded();

        pool.install(|| {
            modules
                .par_iter()
                .enumerate()
                .for_each_with(tx, |tx, (index, module)| {
                    let result = if cancel.is_cancelled() {
                        ExecutionResult::skipped(module, SKIPPED_CANCELLED)
                    } else if abort.load(Ordering::SeqCst) {
                        ExecutionResult::skipped(module, SKIPPED_AFTER_FAILURE)
                    } else {
                        let result = apply_one(operation, module);
                        if options.fail_fast && !result.is_success() {
                            abort.store(true, Ordering::SeqCst);
                        }
                        result
                    };
                    let _ = tx.send((index, result));
                });
        });

        let mut slots: Vec<Option<ExecutionResult>> = vec![None; modules.len()];
        for (index, result) in rx.iter() {
            slots[index] = Some(result);
        }
        let results: Vec<ExecutionResult> = slots.into_iter().flatten().collect();

        let interrupted = results
            .iter()
            .any(|r| r.skipped && r.error.as_deref() == Some(SKIPPED_CANCELLED));
        if interrupted {
            return Err(Error::Cancelled { results });
        }

        if options.fail_fast {
            let first_failure = results
                .iter()
                .find(|r| !r.skipped && r.error.is_some())
                .map(|r| (r.module.name.clone(), r.error.clone().unwrap_or_default()));
            if let Some((module, message)) = first_failure {
                return Err(Error::FailFast {
                    module,
                    message,
                    results,
                });
            }
        }

        Ok(results)
    }
}

fn apply_one(operation: &dyn Operation, module: &Module) -> ExecutionResult {
    match operation.apply(module) {
        Ok(new_version) => {
            debug!(
                module = %module.name,
                old = %module.version,
                new = %new_version,
                "module updated"
            );
            ExecutionResult::succeeded(module, new_version)
        }
        Err(e) => {
            warn!(module = %module.name, error = %e, "operation failed");
            ExecutionResult::failed(module, e.to_string())
        }
    }
}
