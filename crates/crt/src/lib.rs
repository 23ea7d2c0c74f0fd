//! Public facade: the connection pool, the S3 meta-request engine, and the
//! CBOR codec, plus the `Config`/`RawConfig` pair callers use to tune
//! defaults for all three.

pub mod cbor;
pub mod config;
pub mod pool;
pub mod s3;

pub use config::{Config, RawConfig};
