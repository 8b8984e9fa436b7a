//! Tracing subscriber setup for the tsax binary.
//!
//! The subscriber is only initialised when `TSAX_LOG` (or `RUST_LOG`) is
//! set, so there is zero overhead in normal usage. Values use the usual
//! `RUST_LOG` syntax (e.g. `debug`, `tsax_extract=trace`).
//!
//! All output goes to stderr so it never interferes with `--listFiles`
//! output on stdout.

use tracing_subscriber::EnvFilter;

/// `TSAX_LOG` takes precedence over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("TSAX_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `TSAX_LOG` nor `RUST_LOG` is set.
pub fn init_tracing() {
    let has_tsax_log = std::env::var("TSAX_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_tsax_log && !has_rust_log {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .init();
}
