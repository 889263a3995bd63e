use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Falls back to `info` when the filter
/// does not parse; later calls are ignored.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Invalid log filter '{}': {}; using 'info'", filter, e);
        EnvFilter::new("info")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
