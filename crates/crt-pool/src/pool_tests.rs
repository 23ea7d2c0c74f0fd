use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn pool_for(endpoint: &str) -> Arc<ConnectionPool> {
	ConnectionPool::new(endpoint, PoolOptions::default()).unwrap()
}

#[tokio::test]
async fn buffered_request_round_trips_body_and_status() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/hello"))
		.respond_with(ResponseTemplate::new(200).set_body_string("hi there"))
		.mount(&server)
		.await;

	let pool = pool_for(&format!("http://{}", server.address()));
	let (status, _headers, body) = pool.request("GET", "/hello", &[], None).await.unwrap();
	assert_eq!(status, 200);
	assert_eq!(&body[..], b"hi there");
}

#[tokio::test]
async fn head_request_never_surfaces_a_body() {
	let server = MockServer::start().await;
	Mock::given(method("HEAD"))
		.and(path("/head"))
		.respond_with(ResponseTemplate::new(200).insert_header("content-length", "5"))
		.mount(&server)
		.await;

	let pool = pool_for(&format!("http://{}", server.address()));
	let (status, _headers, body) = pool.request("HEAD", "/head", &[], None).await.unwrap();
	assert_eq!(status, 200);
	assert!(body.is_empty());
}

#[tokio::test]
async fn streaming_sink_receives_chunks_in_order() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/stream"))
		.respond_with(ResponseTemplate::new(200).set_body_string("abcdef"))
		.mount(&server)
		.await;

	let pool = pool_for(&format!("http://{}", server.address()));
	let collected = std::sync::Arc::new(tokio::sync::Mutex::new(Vec::new()));
	let collected2 = collected.clone();
	let (status, _headers) = pool
		.request_streaming("GET", "/stream", &[], None, move |chunk| {
			let collected = collected2.clone();
			async move {
				collected.lock().await.extend_from_slice(&chunk);
				Ok(())
			}
		})
		.await
		.unwrap();
	assert_eq!(status, 200);
	assert_eq!(&collected.lock().await[..], b"abcdef");
}

#[tokio::test]
async fn same_endpoint_reuses_a_pooled_connection() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/ping"))
		.respond_with(ResponseTemplate::new(200).set_body_string("pong"))
		.mount(&server)
		.await;

	let pool = pool_for(&format!("http://{}", server.address()));
	pool.request("GET", "/ping", &[], None).await.unwrap();
	pool.request("GET", "/ping", &[], None).await.unwrap();

	assert_eq!(pool.idle.lock().await.len(), 1);
}

#[tokio::test]
async fn connect_timeout_surfaces_as_transport_timeout() {
	// TEST-NET-1 (RFC 5737), guaranteed unroutable: the connect attempt
	// hangs rather than refusing, so it reliably exercises the timeout path.
	let opts = PoolOptions { connect_timeout: Duration::from_millis(50), ..Default::default() };
	let pool = ConnectionPool::new("http://192.0.2.1:81", opts).unwrap();
	let err = pool.request("GET", "/", &[], None).await.unwrap_err();
	assert!(matches!(err, CrtError::Transport(TransportError::Timeout { .. })));
}
