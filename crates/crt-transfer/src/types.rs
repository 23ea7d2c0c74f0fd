//! Shared request/response types for the S3 meta-request engine.

use std::path::PathBuf;
use std::sync::Arc;

/// `{status_code, headers, body?, checksum_validated?, error?, error_code?}`
#[derive(Debug, Clone, Default)]
pub struct Response {
	pub status_code: u16,
	pub headers: Vec<(String, String)>,
	pub body: Option<bytes::Bytes>,
	pub checksum_validated: Option<String>,
	pub error: Option<String>,
	pub error_code: u32,
}

impl Response {
	pub fn successful(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	pub(crate) fn transport_failure(error_code: u32, message: impl Into<String>) -> Self {
		Response { status_code: 0, error_code, error: Some(message.into()), ..Default::default() }
	}
}

/// Progress callback: receives a monotonically non-decreasing cumulative
/// byte count.
pub type ProgressCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumMode {
	Enabled,
}

#[derive(Default)]
pub struct GetObjectOptions {
	/// When set, the engine writes directly to this filesystem path using
	/// positional writes, one per part's byte range.
	pub response_target: Option<PathBuf>,
	pub checksum_mode: Option<ChecksumMode>,
	pub on_progress: Option<ProgressCallback>,
}

/// Where `put_object`'s body comes from. Generic streams are explicitly out
/// of scope for the engine itself — a caller's glue layer is expected to
/// spill a stream to a temp file above a size threshold before calling in,
/// so only (a) and (b) reach here.
pub enum PutBody {
	Bytes(bytes::Bytes),
	File(PathBuf),
}

#[derive(Default)]
pub struct PutObjectOptions {
	pub content_type: Option<String>,
	pub checksum_algorithm: Option<String>,
	pub on_progress: Option<ProgressCallback>,
}

/// Tuning knobs for `S3Client::new`.
#[derive(Clone)]
pub struct S3ClientOptions {
	pub region: String,
	pub part_size: u64,
	pub multipart_upload_threshold: u64,
	pub memory_limit_in_bytes: u64,
	pub max_active_connections_override: Option<usize>,
	pub max_part_retries: u32,
	/// Overrides the `https://{bucket}.s3.{region}.amazonaws.com` endpoint,
	/// for S3-compatible stores and for pointing tests at a local server.
	pub endpoint_override: Option<String>,
}

impl Default for S3ClientOptions {
	fn default() -> Self {
		S3ClientOptions {
			region: "us-east-1".to_string(),
			part_size: 8 * 1024 * 1024,
			multipart_upload_threshold: 16 * 1024 * 1024,
			memory_limit_in_bytes: 1024 * 1024 * 1024,
			max_active_connections_override: None,
			max_part_retries: 3,
			endpoint_override: None,
		}
	}
}
