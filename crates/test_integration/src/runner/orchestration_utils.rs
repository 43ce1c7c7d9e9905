use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Installs a test-friendly subscriber once per test binary.
pub fn setup_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("common_services=debug,warn"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}
