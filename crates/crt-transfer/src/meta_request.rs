//! The multipart GET/PUT orchestration: splitting, K-bounded parallel part
//! transfer, ordered reassembly, per-part retry, checksum validation, and
//! progress reporting.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crt_core::error::CrtError;

use crate::checksum;
use crate::client::S3Client;
use crate::part::{self, Part};
use crate::types::{GetObjectOptions, PutBody, PutObjectOptions, Response};
use crate::xml::CompletedPart;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(20);

/// Where completed part bytes go. A file destination takes positional
/// writes in whatever order parts complete; everything else reassembles
/// strictly in index order before reaching the sink or the returned body,
/// which also lets the ordered path checksum the object as it's drained.
enum Destination {
	File(Arc<std::fs::File>),
	Ordered(Mutex<ReorderBuffer>),
}

struct ReorderBuffer {
	next_index: u64,
	pending: BTreeMap<u64, Bytes>,
	sink: Option<Box<dyn FnMut(Bytes) + Send>>,
	buffered: Vec<u8>,
	checksum: Option<Box<dyn checksum::ChecksumState>>,
}

impl ReorderBuffer {
	fn accept(&mut self, index: u64, bytes: Bytes) {
		self.pending.insert(index, bytes);
		while let Some(bytes) = self.pending.remove(&self.next_index) {
			if let Some(state) = &mut self.checksum {
				state.update(&bytes);
			}
			match &mut self.sink {
				Some(sink) => sink(bytes),
				None => self.buffered.extend_from_slice(&bytes),
			}
			self.next_index += 1;
		}
	}
}

pub async fn get_object(
	client: &S3Client,
	bucket: &str,
	key: &str,
	opts: GetObjectOptions,
	chunk_sink: Option<Box<dyn FnMut(Bytes) + Send>>,
) -> Result<Response, CrtError> {
	let (head_status, head_headers, _) = match client.request("HEAD", bucket, key, "", &[], Bytes::new()).await {
		Ok(parts) => parts,
		Err(CrtError::Transport(t)) => return Ok(Response::transport_failure(1, t.to_string())),
		Err(other) => return Err(other),
	};
	if !(200..300).contains(&head_status) {
		return Ok(S3Client::service_response(head_status, head_headers, Bytes::new()));
	}
	let size = content_length(&head_headers).unwrap_or(0);

	if size <= client.opts.multipart_upload_threshold {
		return get_whole_object(client, bucket, key, opts, chunk_sink).await;
	}

	let expected_checksum = if opts.checksum_mode.is_some() { header_checksum(&head_headers) } else { None };

	let parts = part::split(size, client.opts.part_size);
	let destination =
		make_destination(&opts, chunk_sink, expected_checksum.as_ref().map(|(name, _)| name.as_str())).await?;
	let progress = opts.on_progress.clone();
	let cumulative = Arc::new(AtomicU64::new(0));

	let concurrency = effective_concurrency(client, client.opts.part_size);
	let semaphore = Arc::new(Semaphore::new(concurrency));

	let mut join_set = JoinSet::new();
	for part in parts {
		let client = client.clone();
		let bucket = bucket.to_string();
		let key = key.to_string();
		let semaphore = semaphore.clone();
		let max_retries = client.opts.max_part_retries;
		join_set.spawn(async move {
			let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
			fetch_part_with_retry(&client, &bucket, &key, part, max_retries).await
		});
	}

	let mut first_error = None;
	while let Some(joined) = join_set.join_next().await {
		match joined.expect("part task panicked") {
			Ok((part, bytes)) => {
				let len = part.len();
				deliver(&destination, &part, bytes).await?;
				let total = cumulative.fetch_add(len, Ordering::Relaxed) + len;
				if let Some(cb) = &progress {
					cb(total);
				}
			},
			Err(err) if first_error.is_none() => first_error = Some(err),
			Err(_) => {},
		}
	}
	if let Some(err) = first_error {
		return Err(err);
	}

	let (body, checksum_validated) = finish(destination, expected_checksum).await?;
	Ok(Response { status_code: 200, headers: head_headers, body, checksum_validated, error: None, error_code: 0 })
}

async fn get_whole_object(
	client: &S3Client,
	bucket: &str,
	key: &str,
	opts: GetObjectOptions,
	mut chunk_sink: Option<Box<dyn FnMut(Bytes) + Send>>,
) -> Result<Response, CrtError> {
	let (status, headers, body) = match client.request("GET", bucket, key, "", &[], Bytes::new()).await {
		Ok(parts) => parts,
		Err(CrtError::Transport(t)) => return Ok(Response::transport_failure(1, t.to_string())),
		Err(other) => return Err(other),
	};
	if !(200..300).contains(&status) {
		return Ok(S3Client::service_response(status, headers, body));
	}

	if let Some(path) = &opts.response_target {
		write_whole_file(path.clone(), body.clone()).await?;
	}
	if let Some(sink) = &mut chunk_sink {
		sink(body.clone());
	}
	if let Some(cb) = &opts.on_progress {
		cb(body.len() as u64);
	}

	let checksum_validated = if opts.checksum_mode.is_some() {
		header_checksum(&headers).and_then(|(name, expected)| {
			let algo = checksum::parse_algorithm(&name).ok()?;
			let mut state = algo.new_state();
			state.update(&body);
			(state.finalize_base64() == expected).then_some(name)
		})
	} else {
		None
	};

	let returned_body = if opts.response_target.is_some() || chunk_sink.is_some() { None } else { Some(body) };
	Ok(Response { status_code: status, headers, body: returned_body, checksum_validated, error: None, error_code: 0 })
}

async fn fetch_part_with_retry(
	client: &S3Client,
	bucket: &str,
	key: &str,
	part: Part,
	max_retries: u32,
) -> Result<(Part, Bytes), CrtError> {
	let mut attempt = 0;
	loop {
		let range_header = ("range".to_string(), format!("bytes={}-{}", part.range.start, part.range.end.saturating_sub(1)));
		match client.request("GET", bucket, key, "", &[range_header], Bytes::new()).await {
			Ok((status, _, body)) if (200..300).contains(&status) => return Ok((part, body)),
			Ok((status, headers, body)) => {
				let err = CrtError::Service(crt_core::error::ServiceError { status_code: status, headers, body: body.to_vec() });
				if attempt >= max_retries || !part::is_retriable(&err) {
					return Err(err);
				}
			},
			Err(err) => {
				if attempt >= max_retries || !part::is_retriable(&err) {
					return Err(err);
				}
			},
		}
		tokio::time::sleep(part::backoff_delay(attempt, RETRY_BASE_DELAY, RETRY_MAX_DELAY)).await;
		attempt += 1;
	}
}

pub async fn put_object(
	client: &S3Client,
	bucket: &str,
	key: &str,
	body: PutBody,
	opts: PutObjectOptions,
) -> Result<Response, CrtError> {
	let checksum_algorithm = opts.checksum_algorithm.as_deref().map(checksum::parse_algorithm).transpose()?;

	let size = match &body {
		PutBody::Bytes(bytes) => bytes.len() as u64,
		PutBody::File(path) => {
			tokio::fs::metadata(path).await.map_err(|e| CrtError::Argument(format!("reading {path:?}: {e}")))?.len()
		},
	};

	if size < client.opts.multipart_upload_threshold {
		return put_whole_object(client, bucket, key, body, opts, checksum_algorithm).await;
	}

	let upload_id = client.create_multipart_upload(bucket, key, opts.content_type.as_deref()).await?;
	match put_multipart(client, bucket, key, &upload_id, body, size, &opts).await {
		Ok(response) => Ok(response),
		Err(err) => {
			client.abort_multipart_upload(bucket, key, &upload_id).await;
			Err(err)
		},
	}
}

async fn put_whole_object(
	client: &S3Client,
	bucket: &str,
	key: &str,
	body: PutBody,
	opts: PutObjectOptions,
	checksum_algorithm: Option<Box<dyn checksum::ChecksumAlgorithm>>,
) -> Result<Response, CrtError> {
	let bytes = read_whole_body(body).await?;
	let mut headers = Vec::new();
	if let Some(ct) = &opts.content_type {
		headers.push(("content-type".to_string(), ct.clone()));
	}
	let mut checksum_name = None;
	if let Some(algo) = &checksum_algorithm {
		let mut state = algo.new_state();
		state.update(&bytes);
		let value = state.finalize_base64();
		headers.push((format!("x-amz-checksum-{}", algo.name().to_ascii_lowercase()), value));
		checksum_name = Some(algo.name().to_string());
	}

	let (status, resp_headers, resp_body) = client.request("PUT", bucket, key, "", &headers, bytes.clone()).await?;
	if !(200..300).contains(&status) {
		return Ok(S3Client::service_response(status, resp_headers, resp_body));
	}
	if let Some(cb) = &opts.on_progress {
		cb(bytes.len() as u64);
	}
	Ok(Response { status_code: status, headers: resp_headers, body: None, checksum_validated: checksum_name, error: None, error_code: 0 })
}

/// Whole-object checksums for a multipart upload are combined from per-part
/// digests using an algorithm-specific tree reduction S3 performs itself;
/// we don't reimplement that here, so multipart responses never populate
/// `checksum_validated` even when a checksum algorithm was requested.
async fn put_multipart(
	client: &S3Client,
	bucket: &str,
	key: &str,
	upload_id: &str,
	body: PutBody,
	size: u64,
	opts: &PutObjectOptions,
) -> Result<Response, CrtError> {
	let parts = part::split(size, client.opts.part_size);
	let source = Arc::new(body);
	let concurrency = effective_concurrency(client, client.opts.part_size);
	let semaphore = Arc::new(Semaphore::new(concurrency));
	let cumulative = Arc::new(AtomicU64::new(0));
	let progress = opts.on_progress.clone();

	let mut join_set = JoinSet::new();
	for part in parts {
		let client = client.clone();
		let bucket = bucket.to_string();
		let key = key.to_string();
		let upload_id = upload_id.to_string();
		let semaphore = semaphore.clone();
		let source = source.clone();
		let max_retries = client.opts.max_part_retries;
		join_set.spawn(async move {
			let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
			upload_part_with_retry(&client, &bucket, &key, &upload_id, part, &source, max_retries).await
		});
	}

	let mut completed = BTreeMap::new();
	let mut first_error = None;
	while let Some(joined) = join_set.join_next().await {
		match joined.expect("part task panicked") {
			Ok((part, etag)) => {
				completed.insert(part.index, etag);
				let total = cumulative.fetch_add(part.len(), Ordering::Relaxed) + part.len();
				if let Some(cb) = &progress {
					cb(total);
				}
			},
			Err(err) if first_error.is_none() => first_error = Some(err),
			Err(_) => {},
		}
	}
	if let Some(err) = first_error {
		return Err(err);
	}

	let completed_parts: Vec<CompletedPart> =
		completed.into_iter().map(|(index, etag)| CompletedPart { part_number: (index + 1) as u32, etag }).collect();
	client.complete_multipart_upload(bucket, key, upload_id, &completed_parts).await?;

	Ok(Response { status_code: 200, headers: Vec::new(), body: None, checksum_validated: None, error: None, error_code: 0 })
}

async fn upload_part_with_retry(
	client: &S3Client,
	bucket: &str,
	key: &str,
	upload_id: &str,
	part: Part,
	source: &PutBody,
	max_retries: u32,
) -> Result<(Part, String), CrtError> {
	let bytes = read_part(source, &part).await?;
	let mut attempt = 0;
	loop {
		match client.upload_part(bucket, key, upload_id, (part.index + 1) as u32, bytes.clone()).await {
			Ok(etag) => return Ok((part, etag)),
			Err(err) => {
				if attempt >= max_retries || !part::is_retriable(&err) {
					return Err(err);
				}
				tokio::time::sleep(part::backoff_delay(attempt, RETRY_BASE_DELAY, RETRY_MAX_DELAY)).await;
				attempt += 1;
			},
		}
	}
}

async fn read_whole_body(body: PutBody) -> Result<Bytes, CrtError> {
	match body {
		PutBody::Bytes(bytes) => Ok(bytes),
		PutBody::File(path) => {
			tokio::fs::read(&path).await.map(Bytes::from).map_err(|e| CrtError::Argument(format!("reading {path:?}: {e}")))
		},
	}
}

async fn read_part(source: &PutBody, part: &Part) -> Result<Bytes, CrtError> {
	match source {
		PutBody::Bytes(bytes) => Ok(bytes.slice(part.range.start as usize..part.range.end as usize)),
		PutBody::File(path) => {
			let path = path.clone();
			let range = part.range.clone();
			tokio::task::spawn_blocking(move || -> Result<Bytes, CrtError> {
				use std::os::unix::fs::FileExt;
				let file = std::fs::File::open(&path).map_err(|e| CrtError::Argument(format!("reading {path:?}: {e}")))?;
				let len = (range.end - range.start) as usize;
				let mut buf = vec![0u8; len];
				file.read_exact_at(&mut buf, range.start).map_err(|e| CrtError::Argument(format!("reading {path:?}: {e}")))?;
				Ok(Bytes::from(buf))
			})
			.await
			.expect("blocking read task panicked")
		},
	}
}

async fn make_destination(
	opts: &GetObjectOptions,
	chunk_sink: Option<Box<dyn FnMut(Bytes) + Send>>,
	checksum_algorithm: Option<&str>,
) -> Result<Destination, CrtError> {
	if let Some(path) = &opts.response_target {
		let file = open_for_positional_write(path.clone()).await?;
		return Ok(Destination::File(Arc::new(file)));
	}
	let checksum = checksum_algorithm.and_then(|name| checksum::parse_algorithm(name).ok()).map(|algo| algo.new_state());
	Ok(Destination::Ordered(Mutex::new(ReorderBuffer {
		next_index: 0,
		pending: BTreeMap::new(),
		sink: chunk_sink,
		buffered: Vec::new(),
		checksum,
	})))
}

async fn open_for_positional_write(path: PathBuf) -> Result<std::fs::File, CrtError> {
	tokio::task::spawn_blocking(move || {
		std::fs::OpenOptions::new()
			.create(true)
			.write(true)
			.truncate(true)
			.open(&path)
			.map_err(|e| CrtError::Argument(format!("opening {path:?}: {e}")))
	})
	.await
	.expect("blocking open task panicked")
}

async fn write_whole_file(path: PathBuf, body: Bytes) -> Result<(), CrtError> {
	tokio::fs::write(&path, &body).await.map_err(|e| CrtError::Argument(format!("writing {path:?}: {e}")))
}

async fn deliver(destination: &Destination, part: &Part, bytes: Bytes) -> Result<(), CrtError> {
	match destination {
		Destination::File(file) => {
			let file = file.clone();
			let offset = part.range.start;
			tokio::task::spawn_blocking(move || -> Result<(), CrtError> {
				use std::os::unix::fs::FileExt;
				file.write_all_at(&bytes, offset).map_err(|e| CrtError::Argument(format!("writing part at offset {offset}: {e}")))
			})
			.await
			.expect("blocking write task panicked")
		},
		Destination::Ordered(buffer) => {
			buffer.lock().await.accept(part.index, bytes);
			Ok(())
		},
	}
}

async fn finish(
	destination: Destination,
	expected_checksum: Option<(String, String)>,
) -> Result<(Option<Bytes>, Option<String>), CrtError> {
	match destination {
		Destination::File(_) => Ok((None, None)),
		Destination::Ordered(buffer) => {
			let buffer = buffer.into_inner();
			let validated = match (buffer.checksum, expected_checksum) {
				(Some(state), Some((name, expected))) => {
					if state.finalize_base64() == expected {
						Some(name)
					} else {
						None
					}
				},
				_ => None,
			};
			let body = if buffer.sink.is_some() { None } else { Some(Bytes::from(buffer.buffered)) };
			Ok((body, validated))
		},
	}
}

fn content_length(headers: &[(String, String)]) -> Option<u64> {
	headers.iter().find(|(name, _)| name.eq_ignore_ascii_case("content-length")).and_then(|(_, value)| value.parse().ok())
}

/// Recovers `(algorithm name, expected base64 value)` from an
/// `x-amz-checksum-<algo>` response header, the way S3 echoes back
/// whichever checksum it stored for the object.
fn header_checksum(headers: &[(String, String)]) -> Option<(String, String)> {
	const PREFIX: &str = "x-amz-checksum-";
	headers
		.iter()
		.find(|(name, _)| name.to_ascii_lowercase().starts_with(PREFIX))
		.map(|(name, value)| (name[PREFIX.len()..].to_ascii_uppercase(), value.clone()))
}

fn effective_concurrency(client: &S3Client, part_size: u64) -> usize {
	let by_memory = (client.opts.memory_limit_in_bytes / part_size.max(1)).max(1) as usize;
	let by_override = client.opts.max_active_connections_override.unwrap_or(by_memory);
	by_memory.min(by_override).max(1)
}

#[cfg(test)]
#[path = "meta_request_tests.rs"]
mod tests;
