//! Process-wide runtime singleton.
//!
//! `acquire()` initializes the event-loop group, DNS resolver, and client
//! bootstrap exactly once; later callers get the same handle. There's no
//! GVL to release here, just a `OnceLock` that every caller races to fill
//! and only one wins.

use std::sync::OnceLock;

use hickory_resolver::TokioResolver;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// The process-wide bundle of shared resources: the tokio runtime handle
/// driving all I/O, and a DNS resolver shared by every connection pool.
#[derive(Clone)]
pub struct Runtime {
	handle: tokio::runtime::Handle,
	resolver: std::sync::Arc<TokioResolver>,
}

impl Runtime {
	/// Returns the process-wide singleton, initializing it on first call.
	/// Concurrent first-callers observe the same handle: the `OnceLock`
	/// guarantees exactly one initializer runs and every other caller
	/// blocks until it is done.
	pub fn acquire() -> &'static Runtime {
		RUNTIME.get_or_init(Self::init)
	}

	fn init() -> Runtime {
		let handle = tokio::runtime::Handle::try_current().unwrap_or_else(|_| {
			// No runtime is currently driving us (e.g. a synchronous caller).
			// Leak a dedicated multi-thread runtime sized to the logical CPU
			// count, matching the source's "thread count ~ logical CPU count"
			// event-loop-group sizing.
			let rt = Box::leak(Box::new(
				tokio::runtime::Builder::new_multi_thread()
					.worker_threads(num_cpus::get().max(1))
					.enable_all()
					.build()
					.expect("failed to bootstrap CRT runtime"),
			));
			rt.handle().clone()
		});

		let resolver = TokioResolver::builder_tokio()
			.expect("failed to build default DNS resolver")
			.build();

		Runtime { handle, resolver: std::sync::Arc::new(resolver) }
	}

	pub fn handle(&self) -> &tokio::runtime::Handle {
		&self.handle
	}

	pub fn resolver(&self) -> &std::sync::Arc<TokioResolver> {
		&self.resolver
	}
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
