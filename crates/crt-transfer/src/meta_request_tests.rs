use async_trait::async_trait;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::credentials::{Credentials, CredentialsProvider};
use crate::types::S3ClientOptions;

struct StaticCredentials;

#[async_trait]
impl CredentialsProvider for StaticCredentials {
	async fn credentials(&self) -> Result<Credentials, CrtError> {
		Ok(Credentials {
			access_key_id: "AKIDEXAMPLE".to_string(),
			secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string(),
			session_token: None,
		})
	}
}

fn client_for(server: &MockServer, part_size: u64, threshold: u64) -> S3Client {
	let opts = S3ClientOptions {
		endpoint_override: Some(server.uri()),
		part_size,
		multipart_upload_threshold: threshold,
		..Default::default()
	};
	S3Client::new(Arc::new(StaticCredentials), opts)
}

#[tokio::test]
async fn get_object_below_threshold_fetches_the_whole_body() {
	let server = MockServer::start().await;
	Mock::given(method("HEAD"))
		.respond_with(ResponseTemplate::new(200).insert_header("content-length", "5"))
		.mount(&server)
		.await;
	Mock::given(method("GET")).respond_with(ResponseTemplate::new(200).set_body_string("hello")).mount(&server).await;

	let client = client_for(&server, 4, 16);
	let response = get_object(&client, "bucket", "key", GetObjectOptions::default(), None).await.unwrap();
	assert_eq!(response.body.unwrap(), Bytes::from_static(b"hello"));
}

#[tokio::test]
async fn get_object_above_threshold_splits_into_ranged_parts() {
	let server = MockServer::start().await;
	let body = "0123456789";
	Mock::given(method("HEAD"))
		.respond_with(ResponseTemplate::new(200).insert_header("content-length", &body.len().to_string()))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/key"))
		.and(header("range", "bytes=0-3"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[0..4]))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/key"))
		.and(header("range", "bytes=4-7"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[4..8]))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/key"))
		.and(header("range", "bytes=8-9"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[8..10]))
		.mount(&server)
		.await;

	let client = client_for(&server, 4, 4);
	let response = get_object(&client, "bucket", "key", GetObjectOptions::default(), None).await.unwrap();
	assert_eq!(response.body.unwrap(), Bytes::from_static(body.as_bytes()));
}

#[tokio::test]
async fn get_object_reports_cumulative_progress() {
	let server = MockServer::start().await;
	let body = "01234567";
	Mock::given(method("HEAD"))
		.respond_with(ResponseTemplate::new(200).insert_header("content-length", &body.len().to_string()))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(header("range", "bytes=0-3"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[0..4]))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(header("range", "bytes=4-7"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[4..8]))
		.mount(&server)
		.await;

	let client = client_for(&server, 4, 4);
	let total = Arc::new(AtomicU64::new(0));
	let total2 = total.clone();
	let opts = GetObjectOptions { on_progress: Some(Arc::new(move |n| { total2.fetch_max(n, Ordering::Relaxed); })), ..Default::default() };
	let response = get_object(&client, "bucket", "key", opts, None).await.unwrap();
	assert!(response.successful());
	assert_eq!(total.load(Ordering::Relaxed), 8);
}

#[tokio::test]
async fn get_object_writes_to_a_file_target_by_byte_offset() {
	let server = MockServer::start().await;
	let body = "abcdefgh";
	Mock::given(method("HEAD"))
		.respond_with(ResponseTemplate::new(200).insert_header("content-length", &body.len().to_string()))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(header("range", "bytes=0-3"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[0..4]))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(header("range", "bytes=4-7"))
		.respond_with(ResponseTemplate::new(206).set_body_string(&body[4..8]))
		.mount(&server)
		.await;

	let dir = tempdir().unwrap();
	let target = dir.path().join("downloaded");
	let client = client_for(&server, 4, 4);
	let opts = GetObjectOptions { response_target: Some(target.clone()), ..Default::default() };
	let response = get_object(&client, "bucket", "key", opts, None).await.unwrap();
	assert!(response.body.is_none());
	assert_eq!(tokio::fs::read(&target).await.unwrap(), body.as_bytes());
}

#[tokio::test]
async fn get_object_head_failure_surfaces_as_service_response() {
	let server = MockServer::start().await;
	Mock::given(method("HEAD")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

	let client = client_for(&server, 4, 4);
	let response = get_object(&client, "bucket", "missing", GetObjectOptions::default(), None).await.unwrap();
	assert_eq!(response.status_code, 404);
}

#[tokio::test]
async fn put_object_below_threshold_sends_one_request() {
	let server = MockServer::start().await;
	Mock::given(method("PUT")).and(path("/key")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

	let client = client_for(&server, 4, 16);
	let response = put_object(&client, "bucket", "key", PutBody::Bytes(Bytes::from_static(b"hello")), PutObjectOptions::default())
		.await
		.unwrap();
	assert!(response.successful());
}

#[tokio::test]
async fn put_object_above_threshold_runs_the_multipart_protocol() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/key"))
		.respond_with(ResponseTemplate::new(200).set_body_string(
			r#"<InitiateMultipartUploadResult><UploadId>upload-1</UploadId></InitiateMultipartUploadResult>"#,
		))
		.mount(&server)
		.await;
	Mock::given(method("PUT"))
		.and(path("/key"))
		.respond_with(ResponseTemplate::new(200).insert_header("etag", "\"etag\""))
		.mount(&server)
		.await;

	let client = client_for(&server, 4, 4);
	let response = put_object(
		&client,
		"bucket",
		"key",
		PutBody::Bytes(Bytes::from_static(b"0123456789")),
		PutObjectOptions::default(),
	)
	.await
	.unwrap();
	assert!(response.successful());
}

#[tokio::test]
async fn put_object_multipart_aborts_on_part_failure() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/key"))
		.respond_with(ResponseTemplate::new(200).set_body_string(
			r#"<InitiateMultipartUploadResult><UploadId>upload-1</UploadId></InitiateMultipartUploadResult>"#,
		))
		.mount(&server)
		.await;
	Mock::given(method("PUT")).and(path("/key")).respond_with(ResponseTemplate::new(403)).mount(&server).await;
	Mock::given(method("DELETE")).and(path("/key")).respond_with(ResponseTemplate::new(204)).mount(&server).await;

	let client = client_for(&server, 4, 4);
	let err = put_object(
		&client,
		"bucket",
		"key",
		PutBody::Bytes(Bytes::from_static(b"0123456789")),
		PutObjectOptions::default(),
	)
	.await
	.unwrap_err();
	assert!(matches!(err, CrtError::Service(_)));
}

#[test]
fn part_split_matches_expected_byte_ranges() {
	let parts = part::split(10, 4);
	assert_eq!(parts.len(), 3);
	assert_eq!(parts[0].range, 0..4);
	assert_eq!(parts[2].range, 8..10);
}
