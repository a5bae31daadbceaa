#![forbid(unsafe_code)]

//! JSON log output for hosts.
//!
//! All crates in the workspace log through `tracing` under `shelfgrid.*`
//! targets and never install a subscriber themselves. Hosts that have no
//! subscriber of their own can call [`init_json_logging`] once at startup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "shelfgrid=info";

/// Install a global JSON-lines subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `default_directive`. Fails if a global
/// subscriber is already set.
pub fn init_json_logging(default_directive: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .try_init()
}
