//! The credentials collaborator: any object exposing a `credentials()`
//! operation yielding `{access_key_id, secret_access_key, session_token?}`.

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;

use crt_core::error::CrtError;

/// A resolved credentials snapshot, captured once per meta-request so a
/// background refresh never rewrites an in-flight signature.
#[derive(Clone)]
pub struct Credentials {
	pub access_key_id: String,
	pub secret_access_key: String,
	pub session_token: Option<String>,
}

#[async_trait]
pub trait CredentialsProvider: Send + Sync {
	async fn credentials(&self) -> Result<Credentials, CrtError>;
}

/// Adapter over `aws-credential-types`/`aws-config`'s provider chain — the
/// same crates this repository's teacher already depends on for its own
/// control-plane auth.
pub struct DefaultCredentialsProvider<P> {
	inner: P,
}

impl<P> DefaultCredentialsProvider<P> {
	pub fn new(inner: P) -> Self {
		Self { inner }
	}
}

#[async_trait]
impl<P> CredentialsProvider for DefaultCredentialsProvider<P>
where
	P: ProvideCredentials + Send + Sync,
{
	async fn credentials(&self) -> Result<Credentials, CrtError> {
		let creds = self
			.inner
			.provide_credentials()
			.await
			.map_err(|e| CrtError::Argument(format!("failed to resolve credentials: {e}")))?;
		Ok(Credentials {
			access_key_id: creds.access_key_id().to_string(),
			secret_access_key: creds.secret_access_key().to_string(),
			session_token: creds.session_token().map(str::to_string),
		})
	}
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
