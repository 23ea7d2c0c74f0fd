//! RFC 8949 encoder.

use bytes::{BufMut, Bytes, BytesMut};

use crt_core::error::CodecError;

use crate::value::Value;

const MAJOR_UINT: u8 = 0;
const MAJOR_NEGINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEFINED: u8 = 23;
const SIMPLE_F32: u8 = 26;
const SIMPLE_F64: u8 = 27;

const TAG_BIGNUM_POS: u64 = 2;
const TAG_BIGNUM_NEG: u64 = 3;

/// Encodes `value` to a complete RFC 8949 byte string.
pub fn encode(value: &Value) -> Result<Bytes, CodecError> {
	let mut buf = BytesMut::new();
	write_value(&mut buf, value)?;
	Ok(buf.freeze())
}

fn write_header(buf: &mut BytesMut, major: u8, argument: u64) {
	let major = major << 5;
	if argument < 24 {
		buf.put_u8(major | argument as u8);
	} else if argument <= u8::MAX as u64 {
		buf.put_u8(major | 24);
		buf.put_u8(argument as u8);
	} else if argument <= u16::MAX as u64 {
		buf.put_u8(major | 25);
		buf.put_u16(argument as u16);
	} else if argument <= u32::MAX as u64 {
		buf.put_u8(major | 26);
		buf.put_u32(argument as u32);
	} else {
		buf.put_u8(major | 27);
		buf.put_u64(argument);
	}
}

fn write_value(buf: &mut BytesMut, value: &Value) -> Result<(), CodecError> {
	match value {
		Value::Uint64(n) => write_header(buf, MAJOR_UINT, *n),
		Value::NegInt(n) => write_header(buf, MAJOR_NEGINT, *n),
		Value::Bignum(negative, bytes) => {
			let tag = if *negative { TAG_BIGNUM_NEG } else { TAG_BIGNUM_POS };
			write_header(buf, MAJOR_TAG, tag);
			write_header(buf, MAJOR_BYTES, bytes.len() as u64);
			buf.put_slice(bytes);
		},
		Value::F32(f) => {
			buf.put_u8((MAJOR_SIMPLE << 5) | SIMPLE_F32);
			buf.put_f32(*f);
		},
		Value::F64(f) => {
			buf.put_u8((MAJOR_SIMPLE << 5) | SIMPLE_F64);
			buf.put_f64(*f);
		},
		Value::TextString(s) => {
			write_header(buf, MAJOR_TEXT, s.len() as u64);
			buf.put_slice(s.as_bytes());
		},
		Value::ByteString(bytes) => {
			write_header(buf, MAJOR_BYTES, bytes.len() as u64);
			buf.put_slice(bytes);
		},
		Value::Array(items) => {
			write_header(buf, MAJOR_ARRAY, items.len() as u64);
			for item in items {
				write_value(buf, item)?;
			}
		},
		Value::Map(pairs) => {
			write_header(buf, MAJOR_MAP, pairs.len() as u64);
			for (k, v) in pairs {
				write_value(buf, k)?;
				write_value(buf, v)?;
			}
		},
		Value::Tag(tag, inner) => {
			write_header(buf, MAJOR_TAG, *tag);
			write_value(buf, inner)?;
		},
		Value::Bool(b) => {
			buf.put_u8((MAJOR_SIMPLE << 5) | if *b { SIMPLE_TRUE } else { SIMPLE_FALSE });
		},
		Value::Null => buf.put_u8((MAJOR_SIMPLE << 5) | SIMPLE_NULL),
		Value::Undefined => buf.put_u8((MAJOR_SIMPLE << 5) | SIMPLE_UNDEFINED),
	}
	Ok(())
}

#[cfg(test)]
#[path = "encode_tests.rs"]
mod tests;
