//! Shared error taxonomy.
//!
//! Each subsystem crate defines its own `thiserror` enum and converts into
//! these shared kinds at its boundary, the same way `agentgateway`'s
//! `AIError` stays local to `llm/` but still implements `std::error::Error`
//! so it composes with `anyhow` at the call sites that need it.

use std::fmt;

/// Top-level error kind returned to callers of the pool, the executor, or
/// the meta-request engine.
#[derive(thiserror::Error, Debug)]
pub enum CrtError {
	#[error(transparent)]
	Transport(#[from] TransportError),

	#[error("service error: HTTP {status}")]
	Service(ServiceError),

	#[error(transparent)]
	Codec(#[from] CodecError),

	#[error("argument error: {0}")]
	Argument(String),
}

/// Transport-level failures, carrying the CRT-style underlying symbol so
/// operators can grep logs the same way they would against aws-crt's own
/// error codes: every variant carries the underlying symbol so it can be
/// grepped.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
	#[error("connection error ({symbol}): {message}")]
	Connection { symbol: &'static str, message: String },

	#[error("timeout ({symbol}) after {millis}ms")]
	Timeout { symbol: &'static str, millis: u64 },

	#[error("tls error ({symbol}): {message}")]
	Tls { symbol: &'static str, message: String },

	#[error("proxy error ({symbol}): {message}")]
	Proxy { symbol: &'static str, message: String },
}

impl TransportError {
	pub fn connection(symbol: &'static str, message: impl fmt::Display) -> Self {
		Self::Connection { symbol, message: message.to_string() }
	}

	pub fn timeout(symbol: &'static str, millis: u64) -> Self {
		Self::Timeout { symbol, millis }
	}

	pub fn tls(symbol: &'static str, message: impl fmt::Display) -> Self {
		Self::Tls { symbol, message: message.to_string() }
	}

	pub fn proxy(symbol: &'static str, message: impl fmt::Display) -> Self {
		Self::Proxy { symbol, message: message.to_string() }
	}

	/// True for failures a per-part retry loop should retry.
	pub fn is_retriable(&self) -> bool {
		matches!(self, Self::Connection { .. } | Self::Timeout { .. })
	}
}

/// An HTTP response with `status_code >= 400`.
#[derive(Debug)]
pub struct ServiceError {
	pub status_code: u16,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}

impl fmt::Display for ServiceError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "HTTP {}", self.status_code)
	}
}

impl std::error::Error for ServiceError {}

/// CBOR decode/encode error kinds.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	#[error("out of bytes: expected at least {needed} more, had {available}")]
	OutOfBytes { needed: usize, available: usize },

	#[error("extra bytes: {remaining} trailing byte(s) after a complete item")]
	ExtraBytes { remaining: usize },

	#[error("unknown type: {0}")]
	UnknownType(String),

	#[error("unexpected break byte outside an indefinite-length context")]
	UnexpectedBreak,

	#[error("unexpected additional information value: {0}")]
	UnexpectedAdditionalInfo(u8),
}

/// Malformed endpoints, invalid checksum algorithms, missing required
/// options, bad option combinations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("argument error: {0}")]
pub struct ArgumentError(pub String);

impl ArgumentError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

impl From<ArgumentError> for CrtError {
	fn from(e: ArgumentError) -> Self {
		CrtError::Argument(e.0)
	}
}

impl From<ServiceError> for CrtError {
	fn from(e: ServiceError) -> Self {
		CrtError::Service(e)
	}
}
