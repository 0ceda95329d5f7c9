use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the coda broker and CLI.
///
/// Queue internals log under the `coda_core` target; the default filter
/// keeps them at `info` unless `RUST_LOG` overrides it. Thread names are
/// included because per-queue scanners run as `scanner-<queue>` threads and
/// their requeue/drop warnings should be attributable to a queue.
///
/// - Debug builds: pretty-printed human-readable output
/// - Release builds: JSON-formatted output for log aggregation
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coda=info,coda_core=info"));

    if cfg!(debug_assertions) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .json()
            .init();
    }
}
