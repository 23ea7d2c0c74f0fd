//! RFC 8949 decoder.

use bytes::Buf;

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
const SIMPLE_F16: u8 = 25;
const SIMPLE_F32: u8 = 26;
const SIMPLE_F64: u8 = 27;
const BREAK: u8 = 0xff;

const TAG_BIGNUM_POS: u64 = 2;
const TAG_BIGNUM_NEG: u64 = 3;

/// Decodes exactly one complete item from `input`. Trailing bytes after a
/// complete item are an error.
pub fn decode(input: &[u8]) -> Result<Value, CodecError> {
	let mut cursor = &input[..];
	let value = decode_item(&mut cursor)?;
	if cursor.has_remaining() {
		return Err(CodecError::ExtraBytes { remaining: cursor.remaining() });
	}
	Ok(value)
}

fn need(buf: &[u8], n: usize) -> Result<(), CodecError> {
	if buf.len() < n {
		Err(CodecError::OutOfBytes { needed: n, available: buf.len() })
	} else {
		Ok(())
	}
}

/// Reads the major-type byte and its argument. Returns `None` when the byte
/// is a break (`0xff`), which is only valid inside an indefinite-length
/// container and is rejected by every other caller.
fn read_header(buf: &mut &[u8]) -> Result<Option<(u8, Header)>, CodecError> {
	need(buf, 1)?;
	let initial = buf[0];
	if initial == BREAK {
		buf.advance(1);
		return Ok(None);
	}
	let major = initial >> 5;
	let additional = initial & 0x1f;
	buf.advance(1);

	// Major type 7's additional-info nibble selects a simple-value/float
	// width rather than encoding an argument integer directly; its payload
	// bytes (if any) are read by `decode_simple`, not here.
	if major == MAJOR_SIMPLE {
		return match additional {
			0..=27 => Ok(Some((major, Header::Value(additional as u64)))),
			28..=30 => Err(CodecError::UnexpectedAdditionalInfo(additional)),
			_ => unreachable!("additional info is masked to 5 bits"),
		};
	}

	let header = match additional {
		0..=23 => Header::Value(additional as u64),
		24 => {
			need(buf, 1)?;
			let v = buf[0] as u64;
			buf.advance(1);
			Header::Value(v)
		},
		25 => {
			need(buf, 2)?;
			let v = u16::from_be_bytes([buf[0], buf[1]]) as u64;
			buf.advance(2);
			Header::Value(v)
		},
		26 => {
			need(buf, 4)?;
			let v = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as u64;
			buf.advance(4);
			Header::Value(v)
		},
		27 => {
			need(buf, 8)?;
			let mut bytes = [0u8; 8];
			bytes.copy_from_slice(&buf[..8]);
			buf.advance(8);
			Header::Value(u64::from_be_bytes(bytes))
		},
		28..=30 => return Err(CodecError::UnexpectedAdditionalInfo(additional)),
		31 => Header::Indefinite,
		_ => unreachable!("additional info is masked to 5 bits"),
	};
	Ok(Some((major, header)))
}

enum Header {
	Value(u64),
	Indefinite,
}

fn decode_item(buf: &mut &[u8]) -> Result<Value, CodecError> {
	let (major, header) = match read_header(buf)? {
		Some(parts) => parts,
		None => return Err(CodecError::UnexpectedBreak),
	};
	decode_body(buf, major, header)
}

fn decode_body(buf: &mut &[u8], major: u8, header: Header) -> Result<Value, CodecError> {
	match major {
		MAJOR_UINT => Ok(Value::Uint64(expect_value(header)?)),
		MAJOR_NEGINT => Ok(Value::NegInt(expect_value(header)?)),
		MAJOR_BYTES => Ok(Value::ByteString(read_bytes_or_chunks(buf, header)?)),
		MAJOR_TEXT => {
			let bytes = read_bytes_or_chunks(buf, header)?;
			let text = String::from_utf8(bytes)
				.map_err(|e| CodecError::UnknownType(format!("invalid utf-8 text string: {e}")))?;
			Ok(Value::TextString(text))
		},
		MAJOR_ARRAY => decode_array(buf, header),
		MAJOR_MAP => decode_map(buf, header),
		MAJOR_TAG => decode_tag(buf, expect_value(header)?),
		MAJOR_SIMPLE => decode_simple(buf, header),
		_ => unreachable!("major type is masked to 3 bits"),
	}
}

fn expect_value(header: Header) -> Result<u64, CodecError> {
	match header {
		Header::Value(v) => Ok(v),
		Header::Indefinite => {
			Err(CodecError::UnknownType("indefinite length is not valid for this major type".into()))
		},
	}
}

fn read_bytes_or_chunks(buf: &mut &[u8], header: Header) -> Result<Vec<u8>, CodecError> {
	match header {
		Header::Value(len) => {
			let len = len as usize;
			need(buf, len)?;
			let out = buf[..len].to_vec();
			buf.advance(len);
			Ok(out)
		},
		Header::Indefinite => {
			let mut out = Vec::new();
			loop {
				match read_header(buf)? {
					None => break,
					Some((_major, chunk_header)) => {
						let len = expect_value(chunk_header)? as usize;
						need(buf, len)?;
						out.extend_from_slice(&buf[..len]);
						buf.advance(len);
					},
				}
			}
			Ok(out)
		},
	}
}

fn decode_array(buf: &mut &[u8], header: Header) -> Result<Value, CodecError> {
	let mut items = Vec::new();
	match header {
		Header::Value(count) => {
			for _ in 0..count {
				items.push(decode_item(buf)?);
			}
		},
		Header::Indefinite => loop {
			need(buf, 1)?;
			if buf[0] == BREAK {
				buf.advance(1);
				break;
			}
			items.push(decode_item(buf)?);
		},
	}
	Ok(Value::Array(items))
}

fn decode_map(buf: &mut &[u8], header: Header) -> Result<Value, CodecError> {
	let mut pairs = Vec::new();
	match header {
		Header::Value(count) => {
			for _ in 0..count {
				let key = decode_item(buf)?;
				let value = decode_item(buf)?;
				pairs.push((key, value));
			}
		},
		Header::Indefinite => loop {
			need(buf, 1)?;
			if buf[0] == BREAK {
				buf.advance(1);
				break;
			}
			let key = decode_item(buf)?;
			let value = decode_item(buf)?;
			pairs.push((key, value));
		},
	}
	Ok(Value::Map(pairs))
}

fn decode_tag(buf: &mut &[u8], tag: u64) -> Result<Value, CodecError> {
	let (inner_major, inner_header) = match read_header(buf)? {
		Some(parts) => parts,
		None => return Err(CodecError::UnexpectedBreak),
	};
	if tag == TAG_BIGNUM_POS || tag == TAG_BIGNUM_NEG {
		if inner_major != MAJOR_BYTES {
			return Err(CodecError::UnknownType("bignum tag must wrap a byte string".into()));
		}
		let bytes = read_bytes_or_chunks(buf, inner_header)?;
		return Ok(Value::Bignum(tag == TAG_BIGNUM_NEG, bytes));
	}
	let inner = decode_body(buf, inner_major, inner_header)?;
	Ok(Value::tag(tag, inner))
}

fn decode_simple(buf: &mut &[u8], header: Header) -> Result<Value, CodecError> {
	let additional = match header {
		Header::Value(v) => v,
		Header::Indefinite => return Err(CodecError::UnexpectedBreak),
	};
	match additional as u8 {
		SIMPLE_FALSE => Ok(Value::Bool(false)),
		SIMPLE_TRUE => Ok(Value::Bool(true)),
		SIMPLE_NULL => Ok(Value::Null),
		SIMPLE_UNDEFINED => Ok(Value::Undefined),
		24 => {
			need(buf, 1)?;
			let code = buf[0];
			buf.advance(1);
			Err(CodecError::UnknownType(format!("unsupported simple value {code}")))
		},
		SIMPLE_F16 => {
			need(buf, 2)?;
			let bits = u16::from_be_bytes([buf[0], buf[1]]);
			buf.advance(2);
			Ok(Value::F32(f16_to_f32(bits)))
		},
		SIMPLE_F32 => {
			need(buf, 4)?;
			let mut bytes = [0u8; 4];
			bytes.copy_from_slice(&buf[..4]);
			buf.advance(4);
			Ok(Value::F32(f32::from_be_bytes(bytes)))
		},
		SIMPLE_F64 => {
			need(buf, 8)?;
			let mut bytes = [0u8; 8];
			bytes.copy_from_slice(&buf[..8]);
			buf.advance(8);
			Ok(Value::F64(f64::from_be_bytes(bytes)))
		},
		other => Err(CodecError::UnknownType(format!("unsupported simple value {other}"))),
	}
}

/// Minimal IEEE-754 binary16 -> binary32 conversion; CBOR permits half-float
/// floats (additional info 25) and we normalize them to `Value::F32` rather
/// than adding a fourth float width to the value model.
fn f16_to_f32(bits: u16) -> f32 {
	let sign = ((bits >> 15) & 1) as u32;
	let exponent = ((bits >> 10) & 0x1f) as u32;
	let mantissa = (bits & 0x3ff) as u32;

	let (exp32, mantissa32) = if exponent == 0 {
		if mantissa == 0 {
			(0, 0)
		} else {
			// Subnormal half-float: normalize into a normal f32.
			let mut exp = -1i32;
			let mut m = mantissa;
			while m & 0x400 == 0 {
				m <<= 1;
				exp -= 1;
			}
			m &= 0x3ff;
			(((exp + 127 - 15) as u32) & 0xff, m << 13)
		}
	} else if exponent == 0x1f {
		(0xff, mantissa << 13)
	} else {
		((exponent + 127 - 15) & 0xff, mantissa << 13)
	};

	let bits32 = (sign << 31) | (exp32 << 23) | mantissa32;
	f32::from_bits(bits32)
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
