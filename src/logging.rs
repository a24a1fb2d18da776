use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostics go to stderr so they do not interleave with the stats report.
/// `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eye_mouse=info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
