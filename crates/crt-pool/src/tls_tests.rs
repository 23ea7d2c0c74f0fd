use super::*;

#[test]
fn caches_context_by_key() {
	let cache = TlsContextCache::new();
	let key = TlsKey { verify_peer: true, ca_bundle_path: None };
	let a = cache.get_or_create(key.clone()).unwrap();
	let b = cache.get_or_create(key).unwrap();
	assert!(Arc::ptr_eq(&a.config, &b.config));
}

#[test]
fn distinct_keys_get_distinct_contexts() {
	let cache = TlsContextCache::new();
	let trusted = cache
		.get_or_create(TlsKey { verify_peer: true, ca_bundle_path: None })
		.unwrap();
	let insecure = cache
		.get_or_create(TlsKey { verify_peer: false, ca_bundle_path: None })
		.unwrap();
	assert!(!Arc::ptr_eq(&trusted.config, &insecure.config));
}

#[test]
fn missing_ca_bundle_file_is_a_tls_error() {
	let cache = TlsContextCache::new();
	let key = TlsKey {
		verify_peer: true,
		ca_bundle_path: Some(PathBuf::from("/nonexistent/ca-bundle.pem")),
	};
	let err = cache.get_or_create(key).unwrap_err();
	assert!(matches!(err, TransportError::Tls { .. }));
}

#[test]
fn custom_ca_bundle_is_loaded() {
	let cert = rcgen::generate_simple_self_signed(vec!["example.com".into()]).unwrap();
	let pem = cert.cert.pem();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("ca.pem");
	std::fs::write(&path, pem).unwrap();

	let cache = TlsContextCache::new();
	let ctx = cache
		.get_or_create(TlsKey { verify_peer: true, ca_bundle_path: Some(path) })
		.unwrap();
	let default_ctx = cache
		.get_or_create(TlsKey { verify_peer: true, ca_bundle_path: None })
		.unwrap();
	assert!(!Arc::ptr_eq(&ctx.config, &default_ctx.config));
}
