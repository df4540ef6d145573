//! Shared plumbing for the hearth command-line binaries.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod catalog;
pub mod docs;

use tracing_subscriber::EnvFilter;

/// Initialize tracing once per binary; `RUST_LOG` controls verbosity and
/// defaults to warnings so CLI output stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
