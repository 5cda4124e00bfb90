//! Telemetry initialization (tracing/tracing-subscriber), for hosts that
//! embed the engine without their own subscriber.
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,selection=debug,examset=debug").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! The engine logs under two targets: "selection" for the per-run decision
//! trail and "examset" for crate plumbing (config, stores).

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info,selection=debug,examset=debug"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Choose JSON vs pretty; don't try to store different layer types.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
