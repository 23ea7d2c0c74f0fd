use std::time::{Duration, SystemTime};

use super::*;
use crate::credentials::Credentials;

#[test]
fn sigv4_signer_produces_an_authorization_header() {
	let signer = SigV4Signer;
	let credentials = Credentials {
		access_key_id: "AKIDEXAMPLE".into(),
		secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".into(),
		session_token: None,
	};
	let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

	let headers = signer
		.sign(
			SignRequest {
				method: "GET",
				uri: "https://examplebucket.s3.amazonaws.com/test.txt",
				headers: &[],
				body: b"",
				region: "us-east-1",
				service: "s3",
				time,
			},
			&credentials,
		)
		.unwrap();

	assert!(headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("authorization")));
	assert!(headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("x-amz-date")));
}
