use tracing_subscriber::EnvFilter;

/// Installs the process-wide `tracing` subscriber.
///
/// Output goes to stderr so stdout stays reserved for command results.
/// Verbosity follows `RUST_LOG` (e.g. `RUST_LOG=checkout=debug`) and defaults
/// to `warn`. Calling this more than once is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
