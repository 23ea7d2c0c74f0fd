//! An RFC 8949 CBOR codec tuned for one-shot encode/decode of typed value
//! trees. Streaming decode across a network boundary is out of scope;
//! `decode` always consumes one complete, already-buffered item.

mod decode;
mod encode;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use value::Value;
