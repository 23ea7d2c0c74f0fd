//! The signing collaborator: treated as
//! `sign(request, credentials, region, service, time) -> signed_request`.

use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;

use crt_core::error::CrtError;

use crate::credentials::Credentials;

pub struct SignRequest<'a> {
	pub method: &'a str,
	pub uri: &'a str,
	pub headers: &'a [(String, String)],
	pub body: &'a [u8],
	pub region: &'a str,
	pub service: &'a str,
	pub time: std::time::SystemTime,
}

pub trait Signer: Send + Sync {
	/// Returns the headers to add (SigV4's `Authorization`, `x-amz-date`,
	/// and (when applicable) `x-amz-security-token`) for the given request.
	fn sign(&self, request: SignRequest<'_>, credentials: &Credentials) -> Result<Vec<(String, String)>, CrtError>;
}

/// Adapter over `aws-sigv4`, the SigV4 implementation `agentgateway` already
/// vendors for its own outbound control-plane calls.
pub struct SigV4Signer;

impl Signer for SigV4Signer {
	fn sign(&self, request: SignRequest<'_>, credentials: &Credentials) -> Result<Vec<(String, String)>, CrtError> {
		let identity = aws_credential_types::Credentials::new(
			&credentials.access_key_id,
			&credentials.secret_access_key,
			credentials.session_token.clone(),
			None,
			"crt-transfer",
		)
		.into();

		let params = v4::SigningParams::builder()
			.identity(&identity)
			.region(request.region)
			.name(request.service)
			.time(request.time)
			.settings(SigningSettings::default())
			.build()
			.map_err(|e| CrtError::Argument(format!("sigv4 signing params: {e}")))?
			.into();

		let signable = SignableRequest::new(
			request.method,
			request.uri,
			request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
			SignableBody::Bytes(request.body),
		)
		.map_err(|e| CrtError::Argument(format!("sigv4 signable request: {e}")))?;

		let (instructions, _signature) = aws_sigv4::http_request::sign(signable, &params)
			.map_err(|e| CrtError::Argument(format!("sigv4 signing failed: {e}")))?
			.into_parts();

		Ok(instructions
			.headers()
			.map(|(name, value)| (name.to_string(), value.to_string()))
			.collect())
	}
}

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;
