//! Endpoint keys and URL parsing.

use crt_core::error::ArgumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
	Http,
	Https,
}

impl Scheme {
	pub fn default_port(self) -> u16 {
		match self {
			Scheme::Http => 80,
			Scheme::Https => 443,
		}
	}

	pub fn is_tls(self) -> bool {
		matches!(self, Scheme::Https)
	}
}

/// `(scheme, host, port)` — two keys compare equal iff all three fields
/// compare equal. Host is case-folded at construction so `Eq`/`Hash` are
/// the identity comparison, which is what `PoolManager` relies on for pool
/// affinity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
	pub scheme: Scheme,
	pub host: Box<str>,
	pub port: u16,
}

impl EndpointKey {
	/// Parses `scheme://host[:port]`. Case-insensitive scheme, missing port
	/// filled by the scheme default, empty host or a non-http(s) scheme is
	/// an `ArgumentError`.
	pub fn parse(endpoint: &str) -> Result<Self, ArgumentError> {
		let (scheme_str, rest) = endpoint
			.split_once("://")
			.ok_or_else(|| ArgumentError::new(format!("endpoint missing scheme: {endpoint}")))?;

		let scheme = match scheme_str.to_ascii_lowercase().as_str() {
			"http" => Scheme::Http,
			"https" => Scheme::Https,
			other => {
				return Err(ArgumentError::new(format!("unsupported scheme: {other}")));
			},
		};

		// Strip any path/query the caller accidentally included; only
		// host[:port] is meaningful for an endpoint key.
		let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
		if authority.is_empty() {
			return Err(ArgumentError::new("endpoint has an empty host"));
		}

		let (host, port) = match authority.rsplit_once(':') {
			Some((host, port_str)) if !host.is_empty() => {
				let port = port_str
					.parse::<u16>()
					.map_err(|_| ArgumentError::new(format!("invalid port: {port_str}")))?;
				(host, port)
			},
			_ => (authority, scheme.default_port()),
		};

		if host.is_empty() {
			return Err(ArgumentError::new("endpoint has an empty host"));
		}

		Ok(EndpointKey { scheme, host: host.to_ascii_lowercase().into_boxed_str(), port })
	}
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
