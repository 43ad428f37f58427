use std::path::{Path, PathBuf};
use std::sync::Arc;

use proptest::prelude::*;
use versync_core::error::Result;
use versync_core::module::detect_mismatches;
use versync_core::path_utils::contains_segment;
use versync_core::{
    AdapterRegistry, CancelToken, Discovery, DiscoveryConfig, DiscoveryMode, ExecutionOptions,
    MemoryFileSystem, Module, WorkspaceExecutor,
};

fn gen_version() -> impl Strategy<Value = String> {
    (0u64..3, 0u64..3, 0u64..3).prop_map(|(major, minor, patch)| {
        format!("{}.{}.{}", major, minor, patch)
    })
}

fn gen_dir_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        Just("node_modules".to_string()),
        Just("vendor".to_string()),
        Just("dist".to_string()),
        Just(".git".to_string()),
    ]
}

fn gen_tree() -> impl Strategy<Value = Vec<(Vec<String>, String)>> {
    prop::collection::vec(
        (prop::collection::vec(gen_dir_name(), 0..4), gen_version()),
        0..8,
    )
}

fn module_at(rel: &str, version: &str) -> Module {
    Module::new("m", Path::new("/proj").join(rel), rel, version)
}

fn discovery(fs: MemoryFileSystem) -> Discovery {
    Discovery::new(
        DiscoveryConfig::default(),
        Arc::new(fs),
        Arc::new(AdapterRegistry::new()),
    )
}

proptest! {
    #[test]
    fn test_mode_matches_module_count(tree in gen_tree()) {
        let mut fs = MemoryFileSystem::new();
        fs.add_dir("/proj");
        for (segments, version) in &tree {
            let mut path = PathBuf::from("/proj");
            path.extend(segments);
            fs.add_file(path.join(".version"), version.clone());
        }

        let result = discovery(fs).discover(&CancelToken::new(), "/proj").unwrap();
        let expected = match result.modules.len() {
            0 => DiscoveryMode::NoModules,
            1 => DiscoveryMode::SingleModule,
            _ => DiscoveryMode::MultiModule,
        };
        prop_assert_eq!(result.mode(), expected);
    }

    #[test]
    fn test_no_module_lives_under_an_excluded_segment(tree in gen_tree()) {
        let mut fs = MemoryFileSystem::new();
        fs.add_dir("/proj");
        for (segments, version) in &tree {
            let mut path = PathBuf::from("/proj");
            path.extend(segments);
            fs.add_file(path.join(".version"), version.clone());
        }

        let config = DiscoveryConfig::default();
        let excludes = config.effective_excludes();
        let result = discovery(fs).discover(&CancelToken::new(), "/proj").unwrap();
        for module in &result.modules {
            for pattern in &excludes {
                prop_assert!(!contains_segment(&module.rel_path, pattern));
            }
        }
    }

    #[test]
    fn test_mismatches_are_exactly_the_differing_sources(
        expected in gen_version(),
        versions in prop::collection::vec(prop_oneof![gen_version(), Just(String::new())], 0..10),
    ) {
        let modules: Vec<Module> = versions
            .iter()
            .enumerate()
            .map(|(i, v)| module_at(&format!("m{:02}/.version", i), v))
            .collect();

        let mismatches = detect_mismatches(&expected, &modules, &[]);

        let expected_sources: Vec<PathBuf> = modules
            .iter()
            .filter(|m| !m.version.is_empty() && m.version != expected)
            .map(|m| m.rel_path.clone())
            .collect();
        let actual_sources: Vec<PathBuf> = mismatches.iter().map(|m| m.source.clone()).collect();
        prop_assert_eq!(actual_sources, expected_sources);

        let mut sorted = mismatches.clone();
        sorted.sort_by(|a, b| a.source.cmp(&b.source));
        prop_assert_eq!(sorted, mismatches);
    }

    #[test]
    fn test_executor_output_mirrors_input(count in 0usize..12, parallel in any::<bool>()) {
        let modules: Vec<Module> = (0..count)
            .map(|i| module_at(&format!("m{}/.version", i), "1.0.0"))
            .collect();
        let op = |m: &Module| -> Result<String> { Ok(format!("{}+{}", m.version, m.rel_path.display())) };

        let results = WorkspaceExecutor::new()
            .run(
                &CancelToken::new(),
                &modules,
                &op,
                ExecutionOptions { parallel, fail_fast: false },
            )
            .unwrap();

        prop_assert_eq!(results.len(), modules.len());
        for (result, module) in results.iter().zip(&modules) {
            prop_assert_eq!(&result.module, module);
        }
    }
}
