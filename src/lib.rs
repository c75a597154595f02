// src/lib.rs
pub mod arm;
pub mod cli;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Version string generated by build.rs (package version + git hash).
include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Initialize tracing subscriber for the CLI.
/// Uses RUST_LOG env var for filtering (defaults to warn); logs go to
/// stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
