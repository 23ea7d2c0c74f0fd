//! Structured logging bootstrap. Callers that embed this crate in their own
//! binary are free to configure `tracing-subscriber` themselves; this is
//! the default used by `crt-cli` and by tests, in the shape of
//! `agentgateway`'s own `env-filter` + `json` subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Installs a process-global `tracing` subscriber reading its verbosity
/// from `RUST_LOG`, defaulting to `info`. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_span_events(FmtSpan::CLOSE)
		.try_init();
}
