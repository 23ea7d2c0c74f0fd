//! Endpoint-to-pool registry: N concurrent lookups for the same endpoint
//! produce the same pool object.

use std::sync::Arc;

use crt_core::error::ArgumentError;

use crate::endpoint::EndpointKey;
use crate::pool::{ConnectionPool, PoolOptions};

/// Lazily creates and caches one `ConnectionPool` per distinct endpoint.
///
/// Mirrors the once-per-key lazy-init shape of `crt_core::runtime::Runtime`,
/// generalized from a single global slot to a keyed map guarded by one
/// `std::sync::Mutex`. Pool construction is cheap (no I/O happens until the
/// first request), so holding the lock across `ConnectionPool::new` is fine.
#[derive(Default)]
pub struct PoolManager {
	pools: std::sync::Mutex<hashbrown::HashMap<EndpointKey, Arc<ConnectionPool>>>,
}

impl PoolManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the pool for `endpoint`, creating it on first use. Concurrent
	/// callers racing on the same endpoint all observe the same `Arc`.
	pub fn get_or_create(&self, endpoint: &str, opts: PoolOptions) -> Result<Arc<ConnectionPool>, ArgumentError> {
		let key = EndpointKey::parse(endpoint)?;
		let mut pools = self.pools.lock().expect("pool manager mutex poisoned");
		if let Some(pool) = pools.get(&key) {
			return Ok(pool.clone());
		}
		let pool = ConnectionPool::from_key(key.clone(), opts)?;
		pools.insert(key, pool.clone());
		Ok(pool)
	}

	pub fn len(&self) -> usize {
		self.pools.lock().expect("pool manager mutex poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
