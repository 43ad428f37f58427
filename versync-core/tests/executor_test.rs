use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use versync_core::error::{Error, Result};
use versync_core::{
    error_count, has_errors, success_count, CancelToken, ExecutionOptions, Module, Operation,
    WorkspaceExecutor,
};

fn modules(count: usize) -> Vec<Module> {
    (1..=count)
        .map(|i| {
            let name = format!("module-{}", i);
            Module::new(
                name.clone(),
                format!("/proj/{}/.version", name),
                format!("{}/.version", name),
                "1.0.0",
            )
        })
        .collect()
}

/// Records which modules were attempted and fails the configured ones.
struct Recording {
    fail: HashSet<String>,
    attempted: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl Recording {
    fn failing(names: &[&str]) -> Self {
        Self {
            fail: names.iter().map(|s| s.to_string()).collect(),
            attempted: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }
}

impl Operation for Recording {
    fn apply(&self, module: &Module) -> Result<String> {
        self.attempted.lock().unwrap().push(module.name.clone());
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if self.fail.contains(&module.name) {
            return Err(Error::Operation {
                module: module.name.clone(),
                message: "disk full".to_string(),
            });
        }
        Ok("1.0.1".to_string())
    }
}

fn options(parallel: bool, fail_fast: bool) -> ExecutionOptions {
    ExecutionOptions {
        parallel,
        fail_fast,
    }
}

#[test]
fn test_sequential_success_preserves_order() {
    let mods = modules(4);
    let op = Recording::failing(&[]);
    let results = WorkspaceExecutor::new()
        .run(&CancelToken::new(), &mods, &op, options(false, true))
        .unwrap();

    assert_eq!(results.len(), mods.len());
    for (result, module) in results.iter().zip(&mods) {
        assert_eq!(&result.module, module);
        assert_eq!(result.old_version, "1.0.0");
        assert_eq!(result.new_version, "1.0.1");
    }
    assert_eq!(op.attempted(), vec!["module-1", "module-2", "module-3", "module-4"]);
}

#[test]
fn test_sequential_fail_fast_never_touches_later_modules() {
    let mods = modules(3);
    let op = Recording::failing(&["module-2"]);
    let err = WorkspaceExecutor::new()
        .run(&CancelToken::new(), &mods, &op, options(false, true))
        .unwrap_err();

    assert_eq!(op.attempted(), vec!["module-1", "module-2"]);
    match err {
        Error::FailFast {
            module, results, ..
        } => {
            assert_eq!(module, "module-2");
            assert_eq!(results.len(), 2);
            assert!(results[0].is_success());
            assert!(!results[1].is_success());
        }
        other => panic!("expected fail-fast error, got {:?}", other),
    }
}

#[test]
fn test_sequential_continue_on_error_attempts_everything() {
    let mods = modules(3);
    let op = Recording::failing(&["module-2"]);
    let results = WorkspaceExecutor::new()
        .run(&CancelToken::new(), &mods, &op, options(false, false))
        .unwrap();

    assert_eq!(op.attempted().len(), 3);
    assert_eq!(results.len(), 3);
    assert!(has_errors(&results));
    assert_eq!(error_count(&results), 1);
    assert_eq!(success_count(&results), 2);
    assert_eq!(results[1].error.as_deref(), Some("Operation failed for module-2: disk full"));
}

#[test]
fn test_parallel_continue_on_error_reports_every_module() {
    let mods = modules(3);
    let op = Recording::failing(&["module-2"]);
    let results = WorkspaceExecutor::new()
        .run(&CancelToken::new(), &mods, &op, options(true, false))
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[1].error.is_some());
    assert!(has_errors(&results));
    assert_eq!(error_count(&results), 1);
    for (result, module) in results.iter().zip(&mods) {
        assert_eq!(result.module.name, module.name);
    }
}

#[test]
fn test_parallel_order_is_independent_of_completion() {
    struct SlowFirst;
    impl Operation for SlowFirst {
        fn apply(&self, module: &Module) -> Result<String> {
            if module.name == "module-1" {
                thread::sleep(Duration::from_millis(50));
            }
            Ok(format!("2.0.0-{}", module.name))
        }
    }

    let mods = modules(8);
    let results = WorkspaceExecutor::new()
        .run(&CancelToken::new(), &mods, &SlowFirst, options(true, false))
        .unwrap();

    assert_eq!(results.len(), 8);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.module, mods[i]);
        assert_eq!(result.new_version, format!("2.0.0-{}", mods[i].name));
    }
}

#[test]
fn test_parallel_fail_fast_withholds_unstarted_work() {
    let mods = modules(6);
    let op = Recording::failing(&["module-1"]);
    let err = WorkspaceExecutor::new()
        .with_max_parallel(Some(1))
        .run(&CancelToken::new(), &mods, &op, options(true, true))
        .unwrap_err();

    let results = err.partial_results().unwrap();
    assert_eq!(results.len(), mods.len());
    assert!(matches!(err, Error::FailFast { ref module, .. } if module == "module-1"));

    let attempted = op.attempted();
    let skipped = results.iter().filter(|r| r.skipped).count();
    assert_eq!(attempted.len() + skipped, mods.len());
    assert!(skipped > 0);
    for (result, module) in results.iter().zip(&mods) {
        assert_eq!(result.module.name, module.name);
        if result.skipped {
            assert!(!attempted.contains(&module.name));
        }
    }
}

#[test]
fn test_parallel_fail_fast_lets_running_work_finish() {
    let mods = modules(4);
    let op = Recording {
        fail: ["module-1".to_string()].into_iter().collect(),
        attempted: Mutex::new(Vec::new()),
        delay: Some(Duration::from_millis(20)),
    };
    let err = WorkspaceExecutor::new()
        .run(&CancelToken::new(), &mods, &op, options(true, true))
        .unwrap_err();

    let results = err.partial_results().unwrap();
    for result in results.iter().filter(|r| !r.skipped) {
        let expected_failure = result.module.name == "module-1";
        assert_eq!(result.error.is_some(), expected_failure);
    }
}

#[test]
fn test_cancelled_run_starts_nothing() {
    let counter = AtomicUsize::new(0);
    let op = |_: &Module| -> Result<String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("1.0.1".to_string())
    };
    let cancel = CancelToken::new();
    cancel.cancel();
    let mods = modules(3);

    for parallel in [false, true] {
        let err = WorkspaceExecutor::new()
            .run(&cancel, &mods, &op, options(parallel, false))
            .unwrap_err();
        let results = err.partial_results().unwrap();
        assert!(matches!(err, Error::Cancelled { .. }));
        assert_eq!(results.len(), mods.len());
        assert!(results.iter().all(|r| r.skipped));
    }

    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_sequential_cancel_mid_run_keeps_finished_results() {
    let cancel = CancelToken::new();
    let applied = AtomicUsize::new(0);
    let op = |_: &Module| -> Result<String> {
        applied.fetch_add(1, Ordering::SeqCst);
        cancel.cancel();
        Ok("1.0.1".to_string())
    };
    let mods = modules(3);

    let err = WorkspaceExecutor::new()
        .run(&cancel, &mods, &op, options(false, true))
        .unwrap_err();

    assert_eq!(applied.load(Ordering::SeqCst), 1);
    let results = err.partial_results().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert_eq!(results[0].new_version, "1.0.1");
    for (result, module) in results.iter().zip(&mods).skip(1) {
        assert_eq!(result.module.name, module.name);
        assert!(result.skipped);
        assert_eq!(result.error.as_deref(), Some("skipped: cancelled"));
    }
}

#[test]
fn test_parallel_cancel_mid_run_keeps_finished_results() {
    let cancel = CancelToken::new();
    let op = |m: &Module| -> Result<String> {
        if m.name == "module-1" {
            cancel.cancel();
        }
        Ok("1.0.1".to_string())
    };
    let mods = modules(5);

    let err = WorkspaceExecutor::new()
        .with_max_parallel(Some(1))
        .run(&cancel, &mods, &op, options(true, false))
        .unwrap_err();

    let results = err.partial_results().unwrap();
    assert!(matches!(err, Error::Cancelled { .. }));
    assert_eq!(results.len(), mods.len());
    let finished = results.iter().filter(|r| r.is_success()).count();
    let skipped = results.iter().filter(|r| r.skipped).count();
    assert!(finished >= 1);
    assert!(skipped >= 1);
    assert_eq!(finished + skipped, mods.len());
    for (result, module) in results.iter().zip(&mods) {
        assert_eq!(result.module.name, module.name);
    }
}
