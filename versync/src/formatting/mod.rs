//! Terminal styling for command output.
//!
//! Everything here prints to stdout; machine-readable output bypasses it.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{print_key_value, print_summary_box};
pub use status::{print_error, print_success, print_warning};
pub use tables::{
    print_manifest_table, print_mismatch_table, print_module_table, print_sync_candidates,
    print_version_summary_table,
};
