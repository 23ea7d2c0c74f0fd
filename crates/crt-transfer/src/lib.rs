//! The S3 meta-request engine: a connection-pool-backed client that splits
//! large objects into parts, transfers them concurrently, retries failed
//! parts, and reassembles or positions the results — plus its out-of-scope
//! collaborators (checksums, credentials, signing) modeled as traits with
//! default ecosystem-backed adapters.

mod checksum;
mod client;
mod credentials;
mod meta_request;
mod part;
mod signer;
mod types;
mod xml;

pub use checksum::{ChecksumAlgorithm, ChecksumState, SUPPORTED_ALGORITHMS};
pub use client::S3Client;
pub use credentials::{Credentials, CredentialsProvider, DefaultCredentialsProvider};
pub use meta_request::{get_object, put_object};
pub use part::Part;
pub use signer::{SignRequest, Signer, SigV4Signer};
pub use types::{ChecksumMode, GetObjectOptions, ProgressCallback, PutBody, PutObjectOptions, Response, S3ClientOptions};
pub use xml::CompletedPart;
