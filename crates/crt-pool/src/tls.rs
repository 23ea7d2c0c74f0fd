//! TLS context cache. Keyed by `(verify_peer, ca_bundle_path)`, built on
//! `rustls`, following the `RootCert`/`PerAlpnConfig` shape of
//! `crates/agentgateway/src/control/mod.rs` and `src/http/backendtls.rs`.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

use crt_core::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TlsKey {
	pub verify_peer: bool,
	pub ca_bundle_path: Option<PathBuf>,
}

/// An opaque TLS context suitable for the HTTP layer.
#[derive(Clone)]
pub struct TlsContext {
	pub config: Arc<ClientConfig>,
}

/// Process-wide cache of TLS contexts, one per distinct `(verify_peer,
/// ca_bundle_path)` combination.
///
/// macOS cannot honor a custom CA bundle through a uniform TLS API on some
/// platform-native TLS backends — this implementation sidesteps that
/// entirely by using `rustls` everywhere, so the limitation never
/// triggers here. That decision is recorded in `DESIGN.md`.
#[derive(Default)]
pub struct TlsContextCache {
	entries: Mutex<hashbrown::HashMap<TlsKey, TlsContext>>,
}

impl TlsContextCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get_or_create(&self, key: TlsKey) -> Result<TlsContext, TransportError> {
		if let Some(ctx) = self.entries.lock().get(&key) {
			return Ok(ctx.clone());
		}
		let ctx = Self::build(&key)?;
		self.entries.lock().insert(key, ctx.clone());
		Ok(ctx)
	}

	fn build(key: &TlsKey) -> Result<TlsContext, TransportError> {
		let builder = ClientConfig::builder();

		let config = if !key.verify_peer {
			builder
				.dangerous()
				.with_custom_certificate_verifier(Arc::new(NoVerifier))
				.with_no_client_auth()
		} else if let Some(path) = &key.ca_bundle_path {
			let mut roots = RootCertStore::empty();
			let pem = std::fs::read(path).map_err(|e| {
				TransportError::tls("AWS_IO_TLS_CTX_ERROR", format!("reading CA bundle {path:?}: {e}"))
			})?;
			let certs = rustls_pemfile::certs(&mut Cursor::new(pem))
				.collect::<Result<Vec<_>, _>>()
				.map_err(|e| TransportError::tls("AWS_IO_TLS_CTX_ERROR", e))?;
			let (added, _) = roots.add_parsable_certificates(certs);
			if added == 0 {
				return Err(TransportError::tls(
					"AWS_IO_TLS_CTX_ERROR",
					"CA bundle contained no parsable certificates",
				));
			}
			builder.with_root_certificates(roots).with_no_client_auth()
		} else {
			let mut roots = RootCertStore::empty();
			let native = rustls_native_certs::load_native_certs();
			for err in &native.errors {
				tracing::debug!(%err, "ignoring unreadable native cert");
			}
			roots.add_parsable_certificates(native.certs);
			builder.with_root_certificates(roots).with_no_client_auth()
		};

		Ok(TlsContext { config: Arc::new(config) })
	}
}

/// Accepts any server certificate. Used when `verify_peer = false`; the
/// handshake must not fail on unknown or self-signed certificates.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
	fn verify_server_cert(
		&self,
		_end_entity: &CertificateDer<'_>,
		_intermediates: &[CertificateDer<'_>],
		_server_name: &ServerName<'_>,
		_ocsp_response: &[u8],
		_now: UnixTime,
	) -> Result<ServerCertVerified, rustls::Error> {
		Ok(ServerCertVerified::assertion())
	}

	fn verify_tls12_signature(
		&self,
		_message: &[u8],
		_cert: &CertificateDer<'_>,
		_dss: &DigitallySignedStruct,
	) -> Result<HandshakeSignatureValid, rustls::Error> {
		Ok(HandshakeSignatureValid::assertion())
	}

	fn verify_tls13_signature(
		&self,
		_message: &[u8],
		_cert: &CertificateDer<'_>,
		_dss: &DigitallySignedStruct,
	) -> Result<HandshakeSignatureValid, rustls::Error> {
		Ok(HandshakeSignatureValid::assertion())
	}

	fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
		vec![
			SignatureScheme::RSA_PKCS1_SHA256,
			SignatureScheme::RSA_PKCS1_SHA384,
			SignatureScheme::RSA_PKCS1_SHA512,
			SignatureScheme::ECDSA_NISTP256_SHA256,
			SignatureScheme::ECDSA_NISTP384_SHA384,
			SignatureScheme::ED25519,
			SignatureScheme::RSA_PSS_SHA256,
			SignatureScheme::RSA_PSS_SHA384,
			SignatureScheme::RSA_PSS_SHA512,
		]
	}
}

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tests;
