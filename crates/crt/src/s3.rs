//! Re-exports the S3 meta-request engine.

pub use crt_transfer::{
	get_object, put_object, ChecksumMode, CredentialsProvider, Credentials, DefaultCredentialsProvider,
	GetObjectOptions, ProgressCallback, PutBody, PutObjectOptions, Response, S3Client, S3ClientOptions, Signer,
	SigV4Signer,
};
