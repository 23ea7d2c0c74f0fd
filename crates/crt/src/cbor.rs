//! Re-exports the RFC 8949 CBOR codec.

pub use crt_cbor::{decode, encode, Value};
