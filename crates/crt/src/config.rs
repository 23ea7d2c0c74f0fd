//! `RawConfig`/`Config` pair for the defaults callers want to tune without
//! touching code: pool sizing, multipart thresholds, and logging verbosity.
//! The same split `agentgateway` uses between its user-facing `RawConfig`
//! and its resolved `Config`.

use std::path::PathBuf;
use std::time::Duration;

use crt_pool::{PoolOptions, ProxyConfig};
use crt_transfer::S3ClientOptions;

/// What a caller may supply; every field is optional so a partial document
/// only overrides what it mentions. Unknown fields are rejected rather
/// than silently ignored.
#[derive(serde::Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawConfig {
	max_connections: Option<usize>,
	max_connection_idle_secs: Option<u64>,
	connect_timeout_secs: Option<u64>,
	read_timeout_secs: Option<u64>,
	ssl_verify_peer: Option<bool>,
	ssl_ca_bundle: Option<PathBuf>,
	proxy_url: Option<String>,
	proxy_username: Option<String>,
	proxy_password: Option<String>,

	region: Option<String>,
	part_size_bytes: Option<u64>,
	multipart_upload_threshold_bytes: Option<u64>,
	memory_limit_bytes: Option<u64>,
	max_part_retries: Option<u32>,

	/// `tracing-subscriber` `EnvFilter` directive, e.g. `"crt_pool=debug,info"`.
	log_filter: Option<String>,
}

impl RawConfig {
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}
}

/// Resolved defaults, every field populated. Construct pool/S3 options from
/// this once at startup and reuse them for every `PoolManager`/`S3Client`.
#[derive(Clone, Debug)]
pub struct Config {
	pub max_connections: usize,
	pub max_connection_idle: Duration,
	pub connect_timeout: Duration,
	pub read_timeout: Duration,
	pub ssl_verify_peer: bool,
	pub ssl_ca_bundle: Option<PathBuf>,
	pub proxy: Option<ProxyConfig>,

	pub region: String,
	pub part_size_bytes: u64,
	pub multipart_upload_threshold_bytes: u64,
	pub memory_limit_bytes: u64,
	pub max_part_retries: u32,

	pub log_filter: String,
}

impl Default for Config {
	fn default() -> Self {
		let pool = PoolOptions::default();
		let s3 = S3ClientOptions::default();
		Config {
			max_connections: pool.max_connections,
			max_connection_idle: pool.max_connection_idle,
			connect_timeout: pool.connect_timeout,
			read_timeout: pool.read_timeout,
			ssl_verify_peer: pool.ssl_verify_peer,
			ssl_ca_bundle: pool.ssl_ca_bundle,
			proxy: pool.proxy,
			region: s3.region,
			part_size_bytes: s3.part_size,
			multipart_upload_threshold_bytes: s3.multipart_upload_threshold,
			memory_limit_bytes: s3.memory_limit_in_bytes,
			max_part_retries: s3.max_part_retries,
			log_filter: "info".to_string(),
		}
	}
}

impl Config {
	/// Applies every field `raw` set over the defaults; fields `raw` leaves
	/// unset keep their default value.
	pub fn from_raw(raw: RawConfig) -> Result<Self, crt_core::error::ArgumentError> {
		let mut config = Config::default();
		if let Some(v) = raw.max_connections {
			config.max_connections = v;
		}
		if let Some(v) = raw.max_connection_idle_secs {
			config.max_connection_idle = Duration::from_secs(v);
		}
		if let Some(v) = raw.connect_timeout_secs {
			config.connect_timeout = Duration::from_secs(v);
		}
		if let Some(v) = raw.read_timeout_secs {
			config.read_timeout = Duration::from_secs(v);
		}
		if let Some(v) = raw.ssl_verify_peer {
			config.ssl_verify_peer = v;
		}
		if let Some(v) = raw.ssl_ca_bundle {
			config.ssl_ca_bundle = Some(v);
		}
		if let Some(url) = raw.proxy_url {
			let mut proxy = parse_proxy_url(&url)?;
			proxy.username = raw.proxy_username;
			proxy.password = raw.proxy_password;
			config.proxy = Some(proxy);
		}
		if let Some(v) = raw.region {
			config.region = v;
		}
		if let Some(v) = raw.part_size_bytes {
			config.part_size_bytes = v;
		}
		if let Some(v) = raw.multipart_upload_threshold_bytes {
			config.multipart_upload_threshold_bytes = v;
		}
		if let Some(v) = raw.memory_limit_bytes {
			config.memory_limit_bytes = v;
		}
		if let Some(v) = raw.max_part_retries {
			config.max_part_retries = v;
		}
		if let Some(v) = raw.log_filter {
			config.log_filter = v;
		}
		Ok(config)
	}

	pub fn pool_options(&self) -> PoolOptions {
		PoolOptions {
			max_connections: self.max_connections,
			max_connection_idle: self.max_connection_idle,
			connect_timeout: self.connect_timeout,
			read_timeout: self.read_timeout,
			ssl_verify_peer: self.ssl_verify_peer,
			ssl_ca_bundle: self.ssl_ca_bundle.clone(),
			proxy: self.proxy.clone(),
		}
	}

	pub fn s3_options(&self) -> S3ClientOptions {
		S3ClientOptions {
			region: self.region.clone(),
			part_size: self.part_size_bytes,
			multipart_upload_threshold: self.multipart_upload_threshold_bytes,
			memory_limit_in_bytes: self.memory_limit_bytes,
			max_active_connections_override: None,
			max_part_retries: self.max_part_retries,
			endpoint_override: None,
		}
	}
}

fn parse_proxy_url(url: &str) -> Result<ProxyConfig, crt_core::error::ArgumentError> {
	let (scheme, rest) = url
		.split_once("://")
		.ok_or_else(|| crt_core::error::ArgumentError::new(format!("proxy url missing scheme: {url}")))?;
	if !scheme.eq_ignore_ascii_case("http") {
		return Err(crt_core::error::ArgumentError::new(format!("unsupported proxy scheme: {scheme}")));
	}
	let (host, port) = rest
		.rsplit_once(':')
		.ok_or_else(|| crt_core::error::ArgumentError::new(format!("proxy url missing port: {url}")))?;
	let port = port
		.parse::<u16>()
		.map_err(|_| crt_core::error::ArgumentError::new(format!("invalid proxy port: {port}")))?;
	Ok(ProxyConfig { host: host.to_string(), port, username: None, password: None })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
