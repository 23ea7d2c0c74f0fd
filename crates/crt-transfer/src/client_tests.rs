use async_trait::async_trait;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::credentials::Credentials;
use crate::types::S3ClientOptions;
use crate::xml::CompletedPart;

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

fn client_for(server: &MockServer) -> S3Client {
	let opts = S3ClientOptions { endpoint_override: Some(server.uri()), ..Default::default() };
	S3Client::new(Arc::new(StaticCredentials), opts)
}

#[tokio::test]
async fn request_signs_and_reaches_the_endpoint() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/my-object"))
		.respond_with(ResponseTemplate::new(200).set_body_string("hello"))
		.mount(&server)
		.await;

	let client = client_for(&server);
	let (status, _headers, body) = client.request("GET", "bucket", "my-object", "", &[], Bytes::new()).await.unwrap();
	assert_eq!(status, 200);
	assert_eq!(&body[..], b"hello");
}

#[tokio::test]
async fn request_includes_a_sigv4_authorization_header() {
	let server = MockServer::start().await;
	Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

	let client = client_for(&server);
	let headers = client.sign("GET", "bucket", "/my-object", &[], &Bytes::new(), &Credentials {
		access_key_id: "AKIDEXAMPLE".to_string(),
		secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string(),
		session_token: None,
	})
	.unwrap();
	assert!(headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("authorization")));
}

#[tokio::test]
async fn create_multipart_upload_parses_the_upload_id() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/my-object"))
		.and(query_param("uploads", ""))
		.respond_with(ResponseTemplate::new(200).set_body_string(
			r#"<InitiateMultipartUploadResult><UploadId>abc123</UploadId></InitiateMultipartUploadResult>"#,
		))
		.mount(&server)
		.await;

	let client = client_for(&server);
	let upload_id = client.create_multipart_upload("bucket", "my-object", None).await.unwrap();
	assert_eq!(upload_id, "abc123");
}

#[tokio::test]
async fn upload_part_returns_the_etag() {
	let server = MockServer::start().await;
	Mock::given(method("PUT"))
		.and(path("/my-object"))
		.respond_with(ResponseTemplate::new(200).insert_header("etag", "\"partetag\""))
		.mount(&server)
		.await;

	let client = client_for(&server);
	let etag = client.upload_part("bucket", "my-object", "abc123", 1, Bytes::from_static(b"payload")).await.unwrap();
	assert_eq!(etag, "\"partetag\"");
}

#[tokio::test]
async fn upload_part_missing_etag_is_an_argument_error() {
	let server = MockServer::start().await;
	Mock::given(method("PUT")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

	let client = client_for(&server);
	let err = client.upload_part("bucket", "my-object", "abc123", 1, Bytes::new()).await.unwrap_err();
	assert!(matches!(err, CrtError::Argument(_)));
}

#[tokio::test]
async fn complete_multipart_upload_posts_the_part_list() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/my-object"))
		.and(query_param("uploadId", "abc123"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<CompleteMultipartUploadResult/>"))
		.mount(&server)
		.await;

	let client = client_for(&server);
	let parts = vec![CompletedPart { part_number: 1, etag: "\"aaa\"".to_string() }];
	client.complete_multipart_upload("bucket", "my-object", "abc123", &parts).await.unwrap();
}

#[tokio::test]
async fn non_2xx_response_is_surfaced_via_service_response() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(404).set_body_string(
			r#"<Error><Code>NoSuchKey</Code><Message>not here</Message></Error>"#,
		))
		.mount(&server)
		.await;

	let client = client_for(&server);
	let (status, headers, body) = client.request("GET", "bucket", "missing", "", &[], Bytes::new()).await.unwrap();
	let response = S3Client::service_response(status, headers, body);
	assert_eq!(response.status_code, 404);
	assert!(response.error.unwrap().contains("NoSuchKey"));
}

#[tokio::test]
async fn abort_multipart_upload_is_best_effort_on_failure() {
	let server = MockServer::start().await;
	Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

	let client = client_for(&server);
	client.abort_multipart_upload("bucket", "my-object", "abc123").await;
}
