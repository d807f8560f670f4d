// Log output for the binaries.
//
// Library code only emits `tracing` events; each binary calls `init` once at
// startup to print them on stderr (stdout may carry a scene). The level comes
// from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Install the stderr subscriber. A second call (or a subscriber installed by
/// a test harness) is left in place.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialized twice");
    }
}
