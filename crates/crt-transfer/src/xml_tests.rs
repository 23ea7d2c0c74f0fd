use super::*;

const CREATE_MULTIPART_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult>
  <Bucket>example-bucket</Bucket>
  <Key>example-key</Key>
  <UploadId>abc123upload</UploadId>
</InitiateMultipartUploadResult>"#;

#[test]
fn parses_upload_id_from_create_multipart_response() {
	assert_eq!(parse_upload_id(CREATE_MULTIPART_RESPONSE.as_bytes()).unwrap(), "abc123upload");
}

#[test]
fn missing_upload_id_is_an_error() {
	assert!(parse_upload_id(b"<Foo/>").is_err());
}

#[test]
fn complete_multipart_body_lists_parts_with_etags() {
	let body = build_complete_multipart_upload_body(&[
		CompletedPart { part_number: 1, etag: "\"aaa\"".into() },
		CompletedPart { part_number: 2, etag: "\"bbb\"".into() },
	]);
	let text = String::from_utf8(body).unwrap();
	assert!(text.contains("<PartNumber>1</PartNumber><ETag>\"aaa\"</ETag>"));
	assert!(text.contains("<PartNumber>2</PartNumber><ETag>\"bbb\"</ETag>"));
}

#[test]
fn parses_error_document_code_and_message() {
	let xml = r#"<Error><Code>NoSuchKey</Code><Message>The key does not exist.</Message></Error>"#;
	let (code, message) = parse_error_document(xml.as_bytes()).unwrap();
	assert_eq!(code, "NoSuchKey");
	assert_eq!(message, "The key does not exist.");
}
