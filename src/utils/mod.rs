use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber. Honors `RUST_LOG`, with
/// engine-level info logging as the default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("runway_core=info".parse().unwrap());

        fmt().with_env_filter(filter).compact().init();
    });
}
