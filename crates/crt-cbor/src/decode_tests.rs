use assert_matches::assert_matches;

use super::*;
use crate::value::Value;

#[test]
fn small_uint_fast_path() {
	let value = decode(&[0x0a]).unwrap();
	assert_eq!(value, Value::Uint64(10));
}

#[test]
fn short_text_string_fast_path() {
	let value = decode(b"\x64IETF").unwrap();
	assert_eq!(value, Value::TextString("IETF".into()));
}

#[test]
fn negint_decodes_to_the_magnitude_form() {
	let value = decode(&[0x29]).unwrap();
	assert_eq!(value, Value::NegInt(9));
}

#[test]
fn indefinite_length_array_terminates_on_break() {
	// [_ 1, 2] : 0x9f 01 02 ff
	let value = decode(&[0x9f, 0x01, 0x02, 0xff]).unwrap();
	assert_eq!(value, Value::Array(vec![Value::Uint64(1), Value::Uint64(2)]));
}

#[test]
fn indefinite_length_text_string_concatenates_chunks() {
	// (_ "IE", "TF") : 0x7f 62 "IE" 62 "TF" ff
	let mut bytes = vec![0x7f, 0x62];
	bytes.extend_from_slice(b"IE");
	bytes.push(0x62);
	bytes.extend_from_slice(b"TF");
	bytes.push(0xff);
	let value = decode(&bytes).unwrap();
	assert_eq!(value, Value::TextString("IETF".into()));
}

#[test]
fn break_outside_an_indefinite_context_is_an_error() {
	let err = decode(&[0xff]).unwrap_err();
	assert_matches!(err, CodecError::UnexpectedBreak);
}

#[test]
fn trailing_bytes_after_a_complete_item_are_rejected() {
	let err = decode(&[0x0a, 0x0b]).unwrap_err();
	assert_matches!(err, CodecError::ExtraBytes { remaining: 1 });
}

#[test]
fn truncated_input_is_out_of_bytes() {
	// header says "2-byte byte string" but only one byte follows.
	let err = decode(&[0x42, 0x01]).unwrap_err();
	assert_matches!(err, CodecError::OutOfBytes { .. });
}

#[test]
fn reserved_additional_info_is_rejected() {
	let err = decode(&[0x1c]).unwrap_err();
	assert_matches!(err, CodecError::UnexpectedAdditionalInfo(28));
}

#[test]
fn bignum_tag_round_trips_through_encode() {
	let value = Value::Bignum(false, vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
	let bytes = crate::encode::encode(&value).unwrap();
	let decoded = decode(&bytes).unwrap();
	assert_eq!(decoded, value);
}

#[test]
fn nested_array_and_map_round_trip() {
	let value = Value::Map(vec![(
		Value::TextString("items".into()),
		Value::Array(vec![Value::Uint64(1), Value::Bool(true), Value::Null]),
	)]);
	let bytes = crate::encode::encode(&value).unwrap();
	let decoded = decode(&bytes).unwrap();
	assert_eq!(decoded, value);
}

#[test]
fn f32_and_f64_round_trip() {
	for value in [Value::F32(1.5), Value::F64(std::f64::consts::PI)] {
		let bytes = crate::encode::encode(&value).unwrap();
		assert_eq!(decode(&bytes).unwrap(), value);
	}
}

#[test]
fn undefined_round_trips() {
	let bytes = crate::encode::encode(&Value::Undefined).unwrap();
	assert_eq!(decode(&bytes).unwrap(), Value::Undefined);
}
