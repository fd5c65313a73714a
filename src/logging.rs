use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_DIRECTIVE: &str = "week_events=info,week_events_lib=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber; `RUST_LOG` overrides the default filter.
pub fn init() {
    // try_init so a second call (or a test harness subscriber) is not fatal
    let _ = fmt()
        .compact()
        .with_target(true)
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
