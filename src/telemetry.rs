//! Telemetry logic.
//! Support tracing and metrics.
use metrics::{Unit, counter};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

const AUTHENTICATIONS: &str = "directory_authentications_total";
const MUTATIONS: &str = "directory_mutations_total";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset or invalid.
pub fn setup_tracing() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Describe metrics emitted by the user manager.
///
/// Recording works without it; exporters just lose help text.
pub fn describe_metrics() {
    metrics::describe_counter!(
        AUTHENTICATIONS,
        Unit::Count,
        "Password checks performed against the directory."
    );
    metrics::describe_counter!(
        MUTATIONS,
        Unit::Count,
        "User creations and deletions sent to the directory."
    );
}

pub(crate) fn record_authentication(success: bool) {
    counter!(AUTHENTICATIONS, "outcome" => outcome(success)).increment(1);
}

pub(crate) fn record_mutation(operation: &'static str, success: bool) {
    counter!(MUTATIONS, "operation" => operation, "outcome" => outcome(success))
        .increment(1);
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}
