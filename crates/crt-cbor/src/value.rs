//! The CBOR value model.

/// A decoded or to-be-encoded CBOR item.
///
/// `Map` is a `Vec` of pairs rather than a `HashMap` so that insertion order
/// is preserved and duplicate keys pass through a decode/encode round trip
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Uint64(u64),
	/// Negative integer with magnitude `n`; the represented value is `-1 - n`
	/// (RFC 8949 §3.1 major type 1).
	NegInt(u64),
	/// Arbitrary-precision integer: `sign` is `true` for negative, `bytes` is
	/// the big-endian magnitude (RFC 8949 §3.4.3, tags 2/3).
	Bignum(bool, Vec<u8>),
	F32(f32),
	F64(f64),
	TextString(String),
	ByteString(Vec<u8>),
	Array(Vec<Value>),
	Map(Vec<(Value, Value)>),
	Tag(u64, Box<Value>),
	Bool(bool),
	Null,
	Undefined,
}

impl Value {
	/// Picks the narrower of f32/f64 that round-trips `v` exactly: if an
	/// exact round-trip to f32 succeeds, emit 4 bytes, else 8. NaN always
	/// encodes as f64; bit-exact NaN round-tripping through f32 is not
	/// guaranteed, and only representability matters here, not
	/// canonicalization to a particular width.
	pub fn from_f64(v: f64) -> Value {
		if v.is_nan() {
			return Value::F64(v);
		}
		let narrowed = v as f32;
		if narrowed as f64 == v {
			Value::F32(narrowed)
		} else {
			Value::F64(v)
		}
	}

	pub fn tag(tag: u64, inner: Value) -> Value {
		Value::Tag(tag, Box::new(inner))
	}

	pub fn as_map(&self) -> Option<&[(Value, Value)]> {
		match self {
			Value::Map(pairs) => Some(pairs),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Value::TextString(s) => Some(s),
			_ => None,
		}
	}
}
