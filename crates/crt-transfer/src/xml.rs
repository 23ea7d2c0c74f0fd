//! Minimal S3 REST XML for the four multipart operations: CreateMultipartUpload,
//! UploadPart, CompleteMultipartUpload, AbortMultipartUpload.

use quick_xml::events::Event;
use quick_xml::Reader;

use crt_core::error::CrtError;

/// One completed part, as required by `CompleteMultipartUploadRequest`.
pub struct CompletedPart {
	pub part_number: u32,
	pub etag: String,
}

/// Extracts `<UploadId>` from a `CreateMultipartUploadResult` document.
pub fn parse_upload_id(body: &[u8]) -> Result<String, CrtError> {
	read_text_element(body, "UploadId")
		.ok_or_else(|| CrtError::Argument("CreateMultipartUpload response missing UploadId".into()))
}

/// Builds the `CompleteMultipartUpload` request body, parts in ascending
/// part-number order as S3 requires.
pub fn build_complete_multipart_upload_body(parts: &[CompletedPart]) -> Vec<u8> {
	let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><CompleteMultipartUpload>"#);
	for part in parts {
		body.push_str(&format!(
			"<Part><PartNumber>{}</PartNumber><ETag>{}</ETag></Part>",
			part.part_number,
			escape(&part.etag)
		));
	}
	body.push_str("</CompleteMultipartUpload>");
	body.into_bytes()
}

/// Parses an S3 `<Error>` document (returned on 4xx/5xx responses) into
/// `(code, message)`, when the body is one.
pub fn parse_error_document(body: &[u8]) -> Option<(String, String)> {
	let code = read_text_element(body, "Code")?;
	let message = read_text_element(body, "Message").unwrap_or_default();
	Some((code, message))
}

fn read_text_element(body: &[u8], tag: &str) -> Option<String> {
	let mut reader = Reader::from_reader(body);
	reader.config_mut().trim_text(true);
	let mut buf = Vec::new();
	let mut in_target = false;
	loop {
		match reader.read_event_into(&mut buf) {
			Ok(Event::Start(e)) if e.local_name().as_ref() == tag.as_bytes() => {
				in_target = true;
			},
			Ok(Event::Text(t)) if in_target => {
				return t.unescape().ok().map(|cow| cow.into_owned());
			},
			Ok(Event::End(e)) if e.local_name().as_ref() == tag.as_bytes() => {
				in_target = false;
			},
			Ok(Event::Eof) => return None,
			Err(_) => return None,
			_ => {},
		}
		buf.clear();
	}
}

fn escape(s: &str) -> String {
	s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
