//! The checksum collaborator: modeled as a small trait so the engine can
//! compute a running full-object checksum without caring which algorithm
//! was requested, the same way [`crate::signer::Signer`] and
//! [`crate::credentials::CredentialsProvider`] abstract their
//! collaborators.

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crt_core::error::ArgumentError;

/// Algorithms S3 accepts for whole-object checksums. Any other algorithm
/// name is rejected before any network I/O.
pub const SUPPORTED_ALGORITHMS: &[&str] = &["CRC32", "CRC32C", "SHA1", "SHA256"];

pub trait ChecksumAlgorithm: Send + Sync {
	/// S3's name for this algorithm, used as the `x-amz-checksum-*` header
	/// suffix and echoed back in `Response::checksum_validated`.
	fn name(&self) -> &'static str;

	fn new_state(&self) -> Box<dyn ChecksumState>;
}

/// Incremental checksum accumulator, fed part-sized chunks as they arrive so
/// the engine never has to hold the whole object in memory just to checksum
/// it, computing the full-object checksum concurrently with the transfer.
pub trait ChecksumState: Send {
	fn update(&mut self, data: &[u8]);
	fn finalize_base64(self: Box<Self>) -> String;
}

pub struct Crc32;
pub struct Crc32c;
pub struct Sha1Algorithm;
pub struct Sha256Algorithm;

impl ChecksumAlgorithm for Crc32 {
	fn name(&self) -> &'static str {
		"CRC32"
	}

	fn new_state(&self) -> Box<dyn ChecksumState> {
		Box::new(Crc32State(crc32fast::Hasher::new()))
	}
}

struct Crc32State(crc32fast::Hasher);

impl ChecksumState for Crc32State {
	fn update(&mut self, data: &[u8]) {
		self.0.update(data);
	}

	fn finalize_base64(self: Box<Self>) -> String {
		base64_u32(self.0.finalize())
	}
}

impl ChecksumAlgorithm for Crc32c {
	fn name(&self) -> &'static str {
		"CRC32C"
	}

	fn new_state(&self) -> Box<dyn ChecksumState> {
		Box::new(Crc32cState(0))
	}
}

struct Crc32cState(u32);

impl ChecksumState for Crc32cState {
	fn update(&mut self, data: &[u8]) {
		self.0 = crc32c::crc32c_append(self.0, data);
	}

	fn finalize_base64(self: Box<Self>) -> String {
		base64_u32(self.0)
	}
}

impl ChecksumAlgorithm for Sha1Algorithm {
	fn name(&self) -> &'static str {
		"SHA1"
	}

	fn new_state(&self) -> Box<dyn ChecksumState> {
		Box::new(Sha1State(Sha1::default()))
	}
}

struct Sha1State(Sha1);

impl ChecksumState for Sha1State {
	fn update(&mut self, data: &[u8]) {
		sha1::Digest::update(&mut self.0, data);
	}

	fn finalize_base64(self: Box<Self>) -> String {
		base64_bytes(&sha1::Digest::finalize(self.0))
	}
}

impl ChecksumAlgorithm for Sha256Algorithm {
	fn name(&self) -> &'static str {
		"SHA256"
	}

	fn new_state(&self) -> Box<dyn ChecksumState> {
		Box::new(Sha256State(Sha256::new()))
	}
}

struct Sha256State(Sha256);

impl ChecksumState for Sha256State {
	fn update(&mut self, data: &[u8]) {
		Digest::update(&mut self.0, data);
	}

	fn finalize_base64(self: Box<Self>) -> String {
		base64_bytes(&self.0.finalize())
	}
}

fn base64_u32(value: u32) -> String {
	base64_bytes(&value.to_be_bytes())
}

fn base64_bytes(bytes: &[u8]) -> String {
	use base64::Engine;
	base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Validates `name` against [`SUPPORTED_ALGORITHMS`] and returns the
/// matching algorithm, or an `ArgumentError` — callers must do this before
/// any network I/O.
pub fn parse_algorithm(name: &str) -> Result<Box<dyn ChecksumAlgorithm>, ArgumentError> {
	match name {
		"CRC32" => Ok(Box::new(Crc32)),
		"CRC32C" => Ok(Box::new(Crc32c)),
		"SHA1" => Ok(Box::new(Sha1Algorithm)),
		"SHA256" => Ok(Box::new(Sha256Algorithm)),
		other => Err(ArgumentError::new(format!(
			"unsupported checksum algorithm {other:?}, expected one of {SUPPORTED_ALGORITHMS:?}"
		))),
	}
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;
