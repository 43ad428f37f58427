//! Registry of manifest adapters, keyed by file name.

use std::collections::HashMap;

use crate::adapter::ManifestAdapter;

/// Set of manifest adapters handed to discovery.
///
/// Built explicitly by the caller and passed in; there is no process-wide
/// registry.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn ManifestAdapter>>,
    by_filename: HashMap<&'static str, usize>,
}

impl AdapterRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
            by_filename: HashMap::new(),
        }
    }

    /// Registers an adapter. A later adapter for the same file name replaces
    /// the earlier one.
    pub fn register(&mut self, adapter: Box<dyn ManifestAdapter>) -> &mut Self {
        let filename = adapter.filename();
        match self.by_filename.get(filename) {
            Some(&idx) => self.adapters[idx] = adapter,
            None => {
                self.by_filename.insert(filename, self.adapters.len());
                self.adapters.push(adapter);
            }
        }
        self
    }

    /// Registers an adapter under its filename, replacing any previous one.
    pub fn with(mut self, adapter: impl ManifestAdapter + 'static) -> Self {
        self.register(Box::new(adapter));
        self
    }

    /// Looks up the adapter responsible for `filename`.
    pub fn get(&self, filename: &str) -> Option<&dyn ManifestAdapter> {
        self.by_filename
            .get(filename)
            .map(|&idx| self.adapters[idx].as_ref())
    }

    /// Registered file names in registration order.
    pub fn filenames(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.filename()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
