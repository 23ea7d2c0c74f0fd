//! `S3Client`: endpoint/signing plumbing shared by both single-shot and
//! multipart request paths.

use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;

use crt_core::error::{CrtError, ServiceError};
use crt_pool::{PoolManager, PoolOptions};

use crate::credentials::{Credentials, CredentialsProvider};
use crate::signer::{SignRequest, Signer, SigV4Signer};
use crate::types::{Response, S3ClientOptions};
use crate::xml;

/// Cheap to clone: every field is either an `Arc` or plain config data, so a
/// spawned part task can hold its own owned copy instead of borrowing.
#[derive(Clone)]
pub struct S3Client {
	pub(crate) pool_manager: Arc<PoolManager>,
	pub(crate) credentials: Arc<dyn CredentialsProvider>,
	pub(crate) signer: Arc<dyn Signer>,
	pub(crate) opts: S3ClientOptions,
}

impl S3Client {
	pub fn new(credentials: Arc<dyn CredentialsProvider>, opts: S3ClientOptions) -> Self {
		S3Client { pool_manager: Arc::new(PoolManager::new()), credentials, signer: Arc::new(SigV4Signer), opts }
	}

	pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
		self.signer = signer;
		self
	}

	pub(crate) fn endpoint(&self, bucket: &str) -> String {
		match &self.opts.endpoint_override {
			Some(base) => base.clone(),
			None => format!("https://{bucket}.s3.{}.amazonaws.com", self.opts.region),
		}
	}

	pub(crate) fn host(&self, bucket: &str) -> String {
		match &self.opts.endpoint_override {
			Some(base) => base.trim_start_matches("https://").trim_start_matches("http://").to_string(),
			None => format!("{bucket}.s3.{}.amazonaws.com", self.opts.region),
		}
	}

	/// Resolves credentials, signs, and sends one request through the pool
	/// for `bucket`/`key`'s endpoint, returning the buffered status/headers/
	/// body. Callers translate transport and 4xx/5xx failures into their
	/// own retry or error-surface policy.
	pub(crate) async fn request(
		&self,
		method: &str,
		bucket: &str,
		key: &str,
		query: &str,
		extra_headers: &[(String, String)],
		body: Bytes,
	) -> Result<(u16, Vec<(String, String)>, Bytes), CrtError> {
		let credentials = self.credentials.credentials().await?;
		let path = if query.is_empty() { format!("/{key}") } else { format!("/{key}?{query}") };
		let headers = self.sign(method, bucket, &path, extra_headers, &body, &credentials)?;

		let pool = self.pool_manager.get_or_create(&self.endpoint(bucket), PoolOptions::default())?;
		pool.request(method, &path, &headers, if body.is_empty() { None } else { Some(body) }).await
	}

	fn sign(
		&self,
		method: &str,
		bucket: &str,
		path: &str,
		extra_headers: &[(String, String)],
		body: &Bytes,
		credentials: &Credentials,
	) -> Result<Vec<(String, String)>, CrtError> {
		let mut headers = extra_headers.to_vec();
		headers.push(("host".to_string(), self.host(bucket)));

		let signed = self.signer.sign(
			SignRequest {
				method,
				uri: path,
				headers: &headers,
				body,
				region: &self.opts.region,
				service: "s3",
				time: SystemTime::now(),
			},
			credentials,
		)?;
		headers.extend(signed);
		Ok(headers)
	}

	/// Turns a non-2xx S3 response into the response-populated error surface:
	/// `status_code >= 400`, `error_code = 0`, the XML error document left
	/// in `body`.
	pub(crate) fn service_response(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Response {
		let error = xml::parse_error_document(&body).map(|(code, message)| format!("{code}: {message}"));
		Response { status_code: status, headers, body: Some(body), error, error_code: 0, checksum_validated: None }
	}

	pub(crate) async fn create_multipart_upload(
		&self,
		bucket: &str,
		key: &str,
		content_type: Option<&str>,
	) -> Result<String, CrtError> {
		let mut headers = Vec::new();
		if let Some(ct) = content_type {
			headers.push(("content-type".to_string(), ct.to_string()));
		}
		let (status, headers, body) = self.request("POST", bucket, key, "uploads", &headers, Bytes::new()).await?;
		if !(200..300).contains(&status) {
			return Err(service_error(status, headers, body));
		}
		xml::parse_upload_id(&body)
	}

	pub(crate) async fn upload_part(
		&self,
		bucket: &str,
		key: &str,
		upload_id: &str,
		part_number: u32,
		body: Bytes,
	) -> Result<String, CrtError> {
		let query = format!("partNumber={part_number}&uploadId={upload_id}");
		let (status, headers, resp_body) = self.request("PUT", bucket, key, &query, &[], body).await?;
		if !(200..300).contains(&status) {
			return Err(service_error(status, headers, resp_body));
		}
		headers
			.into_iter()
			.find(|(name, _)| name.eq_ignore_ascii_case("etag"))
			.map(|(_, value)| value)
			.ok_or_else(|| CrtError::Argument("UploadPart response missing ETag".into()))
	}

	pub(crate) async fn complete_multipart_upload(
		&self,
		bucket: &str,
		key: &str,
		upload_id: &str,
		parts: &[xml::CompletedPart],
	) -> Result<(), CrtError> {
		let query = format!("uploadId={upload_id}");
		let body = xml::build_complete_multipart_upload_body(parts);
		let (status, headers, resp_body) =
			self.request("POST", bucket, key, &query, &[], Bytes::from(body)).await?;
		if !(200..300).contains(&status) {
			return Err(service_error(status, headers, resp_body));
		}
		Ok(())
	}

	/// Best-effort: failures here are logged, not propagated, since this
	/// already runs on the cleanup path after a terminal failure.
	pub(crate) async fn abort_multipart_upload(&self, bucket: &str, key: &str, upload_id: &str) {
		let query = format!("uploadId={upload_id}");
		if let Err(err) = self.request("DELETE", bucket, key, &query, &[], Bytes::new()).await {
			tracing::warn!(%err, bucket, key, upload_id, "AbortMultipartUpload failed");
		}
	}
}

fn service_error(status: u16, headers: Vec<(String, String)>, body: Bytes) -> CrtError {
	CrtError::Service(ServiceError { status_code: status, headers, body: body.to_vec() })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
