//! HTTP proxy configuration and `CONNECT` tunneling.
//!
//! The tunnel handshake is adapted directly from
//! `crates/agentgateway/src/client/connect_tunnel.rs`: a hand-written
//! `CONNECT` request followed by hand-parsed status line, tolerated the
//! same way hyper itself tolerates it for this narrow use.

use base64::Engine;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crt_core::error::TransportError;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<String>,
}

impl ProxyConfig {
	fn basic_auth_header(&self) -> Option<String> {
		let username = self.username.as_deref()?;
		let password = self.password.as_deref().unwrap_or("");
		let encoded =
			base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
		Some(format!("Proxy-Authorization: Basic {encoded}\r\n"))
	}

	/// Performs the `CONNECT dest HTTP/1.1` handshake over an already
	/// connected socket to the proxy, leaving `conn` ready for the caller
	/// to layer TLS or HTTP/1.1 framing on top.
	pub async fn tunnel<S>(&self, conn: &mut S, dest: &str) -> Result<(), TransportError>
	where
		S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
	{
		let auth = self.basic_auth_header().unwrap_or_default();
		let request = format!("CONNECT {dest} HTTP/1.1\r\nHost: {dest}\r\n{auth}\r\n");

		conn
			.write_all(request.as_bytes())
			.await
			.map_err(|e| TransportError::proxy("AWS_IO_SOCKET_WRITE_FAILED", e))?;

		let mut buf = [0u8; 8192];
		let mut pos = 0;
		loop {
			let n = conn
				.read(&mut buf[pos..])
				.await
				.map_err(|e| TransportError::proxy("AWS_IO_SOCKET_READ_FAILED", e))?;
			if n == 0 {
				return Err(TransportError::proxy("AWS_IO_SOCKET_CLOSED", "proxy closed the tunnel"));
			}
			pos += n;

			let received = &buf[..pos];
			if received.starts_with(b"HTTP/1.1 200") || received.starts_with(b"HTTP/1.0 200") {
				if received.windows(4).any(|w| w == b"\r\n\r\n") {
					return Ok(());
				}
				if pos == buf.len() {
					return Err(TransportError::proxy("AWS_IO_TUNNEL_HEADERS_TOO_LONG", "proxy response too large"));
				}
			} else if received.starts_with(b"HTTP/1.1 407") || received.starts_with(b"HTTP/1.0 407") {
				return Err(TransportError::proxy(
					"AWS_HTTP_PROXY_CONNECT_FAILED",
					"proxy requires authentication",
				));
			} else if pos >= 12 {
				return Err(TransportError::proxy("AWS_HTTP_PROXY_CONNECT_FAILED", "proxy refused the tunnel"));
			}
		}
	}
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
