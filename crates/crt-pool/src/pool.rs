//! The per-endpoint connection pool.

use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method};
use http_body_util::{BodyExt, Full};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crt_core::error::{ArgumentError, CrtError, TransportError};

use crate::connection::{ConnState, Connection};
use crate::endpoint::EndpointKey;
use crate::headers;
use crate::proxy::ProxyConfig;
use crate::tls::{TlsContextCache, TlsKey};

/// Options accepted by `ConnectionPool::new`.
#[derive(Debug, Clone)]
pub struct PoolOptions {
	pub max_connections: usize,
	pub max_connection_idle: Duration,
	pub connect_timeout: Duration,
	pub read_timeout: Duration,
	pub ssl_verify_peer: bool,
	pub ssl_ca_bundle: Option<PathBuf>,
	pub proxy: Option<ProxyConfig>,
}

impl Default for PoolOptions {
	fn default() -> Self {
		PoolOptions {
			max_connections: 25,
			max_connection_idle: Duration::from_millis(60_000),
			connect_timeout: Duration::from_millis(60_000),
			read_timeout: Duration::from_millis(60_000),
			ssl_verify_peer: true,
			ssl_ca_bundle: None,
			proxy: None,
		}
	}
}

struct Leased {
	conn: Connection,
	_permit: OwnedSemaphorePermit,
}

/// Per-endpoint pool of HTTP/1.1 connections.
pub struct ConnectionPool {
	endpoint: EndpointKey,
	opts: PoolOptions,
	tls: Option<crate::tls::TlsContext>,
	idle: Mutex<VecDeque<Leased>>,
	semaphore: Arc<Semaphore>,
}

impl ConnectionPool {
	pub fn new(endpoint: &str, opts: PoolOptions) -> Result<Arc<Self>, ArgumentError> {
		let key = EndpointKey::parse(endpoint)?;
		Self::from_key(key, opts)
	}

	pub(crate) fn from_key(key: EndpointKey, opts: PoolOptions) -> Result<Arc<Self>, ArgumentError> {
		static TLS_CACHE: std::sync::OnceLock<TlsContextCache> = std::sync::OnceLock::new();
		let tls = if key.scheme.is_tls() {
			let cache = TLS_CACHE.get_or_init(TlsContextCache::new);
			let ctx = cache
				.get_or_create(TlsKey { verify_peer: opts.ssl_verify_peer, ca_bundle_path: opts.ssl_ca_bundle.clone() })
				.map_err(|e| ArgumentError::new(e.to_string()))?;
			Some(ctx)
		} else {
			None
		};
		let semaphore = Arc::new(Semaphore::new(opts.max_connections));
		Ok(Arc::new(ConnectionPool { endpoint: key, opts, tls, idle: Mutex::new(VecDeque::new()), semaphore }))
	}

	pub fn endpoint(&self) -> &EndpointKey {
		&self.endpoint
	}

	/// Buffered request/response.
	pub async fn request(
		&self,
		method: &str,
		path: &str,
		request_headers: &[(String, String)],
		body: Option<Bytes>,
	) -> Result<(u16, Vec<(String, String)>, Bytes), CrtError> {
		let mut collected = Vec::new();
		let (status, headers) = self
			.request_streaming(method, path, request_headers, body, |chunk| {
				collected.extend_from_slice(&chunk);
				async { Ok(()) }
			})
			.await?;
		Ok((status, headers, Bytes::from(collected)))
	}

	/// Streaming request/response: `sink` is invoked once per chunk, in
	/// strict receive order, at most once concurrently.
	pub async fn request_streaming<F, Fut>(
		&self,
		method: &str,
		path: &str,
		request_headers: &[(String, String)],
		body: Option<Bytes>,
		mut sink: F,
	) -> Result<(u16, Vec<(String, String)>), CrtError>
	where
		F: FnMut(Bytes) -> Fut,
		Fut: Future<Output = Result<(), CrtError>>,
	{
		let method = Method::from_bytes(method.as_bytes())
			.map_err(|e| ArgumentError::new(format!("invalid method: {e}")))?;
		let is_head = method == Method::HEAD;

		let mut leased = self.checkout().await?;

		let mut builder = http::Request::builder().method(method.clone()).uri(path);
		for (name, value) in request_headers {
			builder = builder.header(
				HeaderName::from_bytes(name.as_bytes())
					.map_err(|e| ArgumentError::new(format!("invalid header name {name}: {e}")))?,
				HeaderValue::from_str(value)
					.map_err(|e| ArgumentError::new(format!("invalid header value for {name}: {e}")))?,
			);
		}
		let body_bytes = body.unwrap_or_default();
		let request = builder
			.body(Full::new(body_bytes))
			.map_err(|e| ArgumentError::new(e.to_string()))?;

		let send = leased.conn.send_request.send_request(request);
		let response = match tokio::time::timeout(self.opts.read_timeout, send).await {
			Ok(Ok(response)) => response,
			Ok(Err(e)) => {
				leased.conn.state = ConnState::Closing;
				self.drop_dead(leased);
				return Err(TransportError::connection("AWS_IO_SOCKET_WRITE_FAILED", e).into());
			},
			Err(_) => {
				leased.conn.state = ConnState::Closing;
				self.drop_dead(leased);
				return Err(TransportError::timeout(
					"AWS_IO_SOCKET_TIMEOUT",
					self.opts.read_timeout.as_millis() as u64,
				)
				.into());
			},
		};

		let status = response.status().as_u16();
		let merged_headers = headers::merge(response.headers());

		if is_head {
			leased.conn.mark_used();
			self.release(leased);
			return Ok((status, merged_headers));
		}

		let mut body = response.into_body();
		loop {
			let next = tokio::time::timeout(self.opts.read_timeout, body.frame()).await;
			let frame = match next {
				Ok(Some(Ok(frame))) => frame,
				Ok(Some(Err(e))) => {
					leased.conn.state = ConnState::Closing;
					self.drop_dead(leased);
					return Err(TransportError::connection("AWS_IO_SOCKET_READ_FAILED", e).into());
				},
				Ok(None) => break,
				Err(_) => {
					leased.conn.state = ConnState::Closing;
					self.drop_dead(leased);
					return Err(TransportError::timeout(
						"AWS_IO_SOCKET_TIMEOUT",
						self.opts.read_timeout.as_millis() as u64,
					)
					.into());
				},
			};
			if let Some(chunk) = frame.data_ref() {
				let chunk = chunk.clone();
				sink(chunk).await?;
			}
		}

		leased.conn.mark_used();
		self.release(leased);
		Ok((status, merged_headers))
	}

	// A permit is held for a connection's entire lifetime in {Idle, InUse},
	// not just while a request is in flight, so the semaphore count keeps
	// the invariant: at most M connections exist at once. Idle
	// connections already carry their permit from when they were opened, so
	// reusing one must not acquire a second.
	async fn checkout(&self) -> Result<Leased, CrtError> {
		{
			let mut idle = self.idle.lock().await;
			while let Some(mut candidate) = idle.pop_front() {
				if candidate.conn.is_dead() || candidate.conn.is_idle_expired(self.opts.max_connection_idle) {
					candidate.conn.state = ConnState::Dead; // drops here, freeing its permit
					continue;
				}
				candidate.conn.state = ConnState::InUse;
				return Ok(candidate);
			}
		}

		let permit = tokio::time::timeout(self.opts.connect_timeout, self.semaphore.clone().acquire_owned())
			.await
			.map_err(|_| {
				TransportError::timeout("AWS_IO_SOCKET_TIMEOUT", self.opts.connect_timeout.as_millis() as u64)
			})?
			.expect("semaphore never closed");

		let conn = Connection::open(&self.endpoint, self.tls.as_ref(), self.opts.proxy.as_ref(), self.opts.connect_timeout)
			.await?;
		Ok(Leased { conn, _permit: permit })
	}

	fn release(&self, mut leased: Leased) {
		leased.conn.state = ConnState::Idle;
		if leased.conn.is_dead() {
			return;
		}
		if let Ok(mut idle) = self.idle.try_lock() {
			idle.push_back(leased);
		}
		// If the lock is contended, the connection (and its permit) drop
		// here; that is a conservative fallback, not a correctness issue,
		// since `checkout` always opens a fresh connection when idle is
		// momentarily unavailable.
	}

	fn drop_dead(&self, mut leased: Leased) {
		leased.conn.state = ConnState::Dead;
	}
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
