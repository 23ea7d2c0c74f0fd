//! Per-part byte ranges and the retry/backoff policy.

use std::ops::Range;
use std::time::Duration;

use rand::Rng;

use crt_core::error::{CrtError, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
	pub index: u64,
	pub range: Range<u64>,
}

impl Part {
	pub fn len(&self) -> u64 {
		self.range.end - self.range.start
	}
}

/// Splits `[0, size)` into contiguous parts of at most `part_size` bytes,
/// the last part possibly shorter.
pub fn split(size: u64, part_size: u64) -> Vec<Part> {
	assert!(part_size > 0, "part_size must be nonzero");
	let mut parts = Vec::new();
	let mut offset = 0;
	let mut index = 0;
	while offset < size {
		let end = (offset + part_size).min(size);
		parts.push(Part { index, range: offset..end });
		offset = end;
		index += 1;
	}
	if parts.is_empty() {
		parts.push(Part { index: 0, range: 0..0 });
	}
	parts
}

/// True for errors a per-part retry loop should retry: connection resets,
/// 5xx, and throttling (408/429). Every other 4xx fails the meta-request
/// outright.
pub fn is_retriable(err: &CrtError) -> bool {
	match err {
		CrtError::Transport(t) => t.is_retriable(),
		CrtError::Service(s) => s.status_code >= 500 || s.status_code == 408 || s.status_code == 429,
		_ => false,
	}
}

/// Exponential backoff with full jitter: `uniform(0, base * 2^attempt)`,
/// capped at `max`.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
	let exp = base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
	let capped = exp.min(max);
	if capped.is_zero() {
		return capped;
	}
	let jittered_millis = rand::rng().random_range(0..=capped.as_millis().max(1) as u64);
	Duration::from_millis(jittered_millis)
}

pub fn connection_reset_error(message: impl std::fmt::Display) -> CrtError {
	CrtError::Transport(TransportError::connection("AWS_IO_SOCKET_CLOSED", message))
}

#[cfg(test)]
#[path = "part_tests.rs"]
mod tests;
