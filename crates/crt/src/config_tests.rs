use super::*;

#[test]
fn defaults_match_the_pool_and_s3_client_defaults() {
	let config = Config::default();
	assert_eq!(config.max_connections, 25);
	assert_eq!(config.region, "us-east-1");
	assert_eq!(config.log_filter, "info");
}

#[test]
fn raw_config_rejects_unknown_fields() {
	let err = RawConfig::from_json(r#"{"notAField": 1}"#).unwrap_err();
	assert!(err.to_string().contains("unknown field"));
}

#[test]
fn raw_config_only_overrides_fields_it_sets() {
	let raw = RawConfig::from_json(r#"{"maxConnections": 5, "region": "eu-west-1"}"#).unwrap();
	let config = Config::from_raw(raw).unwrap();
	assert_eq!(config.max_connections, 5);
	assert_eq!(config.region, "eu-west-1");
	assert_eq!(config.connect_timeout, Duration::from_secs(60));
}

#[test]
fn proxy_url_without_scheme_is_rejected() {
	let raw = RawConfig::from_json(r#"{"proxyUrl": "proxy.internal:8080"}"#).unwrap();
	assert!(Config::from_raw(raw).is_err());
}

#[test]
fn proxy_url_is_parsed_into_host_and_port() {
	let raw = RawConfig::from_json(r#"{"proxyUrl": "http://proxy.internal:8080"}"#).unwrap();
	let config = Config::from_raw(raw).unwrap();
	let proxy = config.proxy.unwrap();
	assert_eq!(proxy.host, "proxy.internal");
	assert_eq!(proxy.port, 8080);
}

#[test]
fn pool_options_and_s3_options_reflect_the_resolved_config() {
	let config = Config::default();
	assert_eq!(config.pool_options().max_connections, config.max_connections);
	assert_eq!(config.s3_options().region, config.region);
}
