//! Logging setup.

use std::env;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes tracing with a compact stderr layer, filtered by `RUST_LOG`
/// when set.
pub fn init() {
    let default_filter = if cfg!(debug_assertions) {
        "nessie=debug"
    } else {
        "nessie=info"
    }
    .parse::<Targets>()
    .expect("valid filter");
    let filter = env::var("RUST_LOG")
        .ok()
        .and_then(|var| var.parse::<Targets>().ok())
        .unwrap_or(default_filter);

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init()
    {
        eprintln!("initializing tracing failed: {err:?}");
    }
}
