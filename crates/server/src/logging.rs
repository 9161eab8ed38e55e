#![forbid(unsafe_code)]

use tracing::level_filters::LevelFilter;

/// Installs the process-wide stderr subscriber. A second call is a no-op.
pub fn init(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
