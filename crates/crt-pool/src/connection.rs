//! A single pooled HTTP/1.1 connection.

use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1::SendRequest;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crt_core::error::TransportError;

use crate::endpoint::EndpointKey;
use crate::proxy::ProxyConfig;
use crate::tls::TlsContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
	Idle,
	InUse,
	Closing,
	Dead,
}

/// One live HTTP/1.1 connection, owned exclusively by its pool.
pub struct Connection {
	pub(crate) send_request: SendRequest<Full<Bytes>>,
	pub(crate) state: ConnState,
	pub(crate) last_used_at: Instant,
	driver: tokio::task::JoinHandle<()>,
}

impl Connection {
	/// Opens a fresh connection to `endpoint`, optionally tunneling through
	/// `proxy` and/or negotiating TLS via `tls`, then performs the HTTP/1.1
	/// client handshake.
	pub async fn open(
		endpoint: &EndpointKey,
		tls: Option<&TlsContext>,
		proxy: Option<&ProxyConfig>,
		connect_timeout: std::time::Duration,
	) -> Result<Self, TransportError> {
		let connect_fut = Self::open_inner(endpoint, tls, proxy);
		match tokio::time::timeout(connect_timeout, connect_fut).await {
			Ok(result) => result,
			Err(_) => Err(TransportError::timeout(
				"AWS_IO_SOCKET_TIMEOUT",
				connect_timeout.as_millis() as u64,
			)),
		}
	}

	async fn open_inner(
		endpoint: &EndpointKey,
		tls: Option<&TlsContext>,
		proxy: Option<&ProxyConfig>,
	) -> Result<Self, TransportError> {
		let dial_target = match proxy {
			Some(p) => (p.host.as_str(), p.port),
			None => (&*endpoint.host, endpoint.port),
		};
		let mut tcp = TcpStream::connect(dial_target)
			.await
			.map_err(|e| TransportError::connection("AWS_IO_SOCKET_CONNECT_ABORTED", e))?;
		tcp.set_nodelay(true).ok();

		if let Some(p) = proxy {
			p.tunnel(&mut tcp, &format!("{}:{}", endpoint.host, endpoint.port)).await?;
		}

		if let Some(tls) = tls {
			let server_name = rustls_pki_types::ServerName::try_from(endpoint.host.to_string())
				.map_err(|e| TransportError::tls("AWS_IO_TLS_ERROR_NEGOTIATION_FAILURE", e))?;
			let connector = TlsConnector::from(tls.config.clone());
			let tls_stream = connector
				.connect(server_name, tcp)
				.await
				.map_err(|e| TransportError::tls("AWS_IO_TLS_ERROR_NEGOTIATION_FAILURE", e))?;
			Self::handshake(TokioIo::new(tls_stream)).await
		} else {
			Self::handshake(TokioIo::new(tcp)).await
		}
	}

	async fn handshake<T>(io: T) -> Result<Self, TransportError>
	where
		T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
	{
		let (send_request, conn) = hyper::client::conn::http1::handshake(io)
			.await
			.map_err(|e| TransportError::connection("AWS_IO_SOCKET_CONNECT_ABORTED", e))?;
		let driver = tokio::spawn(async move {
			if let Err(err) = conn.await {
				tracing::debug!(%err, "pooled connection driver exited");
			}
		});
		Ok(Connection { send_request, state: ConnState::Idle, last_used_at: Instant::now(), driver })
	}

	/// True once the underlying connection can no longer accept requests —
	/// either the driver task ended or hyper itself marked it closed.
	pub fn is_dead(&self) -> bool {
		self.driver.is_finished() || self.send_request.is_closed()
	}

	pub fn mark_used(&mut self) {
		self.last_used_at = Instant::now();
	}

	pub fn is_idle_expired(&self, max_idle: std::time::Duration) -> bool {
		self.last_used_at.elapsed() > max_idle
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		self.driver.abort();
	}
}
