//! Manifest adapters for the file formats versync can keep in sync.

pub mod gradle;
pub mod helm;
pub mod js;
pub mod python;
pub mod rust;
mod toml_section;

pub use gradle::GradlePropertiesAdapter;
pub use helm::HelmChartAdapter;
pub use js::PackageJsonAdapter;
pub use python::PyprojectAdapter;
pub use rust::CargoAdapter;

use versync_core::adapter_registry::AdapterRegistry;

/// Registry holding every built-in adapter.
pub fn default_registry() -> AdapterRegistry {
    AdapterRegistry::new()
        .with(PackageJsonAdapter)
        .with(CargoAdapter)
        .with(PyprojectAdapter)
        .with(HelmChartAdapter)
        .with(GradlePropertiesAdapter)
}
