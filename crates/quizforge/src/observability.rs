//! Tracing/log initialization for embedding applications.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the tracing subscriber and routes `log` macros through
/// it. Call once at startup; a second call is a no-op returning false.
///
/// The filter honors `RUST_LOG` and defaults to `info` with debug
/// detail for this crate.
pub fn init_tracing() -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,quizforge=debug"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    if registry.try_init().is_err() {
        return false;
    }

    // Bridge log-crate records into tracing. Fails only when another
    // logger is already installed, which try_init above rules out for
    // the common path.
    let _ = tracing_log::LogTracer::init();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        // Whichever call wins, the second must not panic.
        let first = init_tracing();
        let second = init_tracing();
        assert!(!second || first);
    }
}
