//! Additive-key XOR obfuscation.
//!
//! Several of the game's records are stored XOR'd with a position-keyed
//! stream: byte `i` of a region is `plain[i] ^ ((key + i) & 0xFF)`. The
//! transform is an involution, so one routine covers both directions.
//! Bit-packing happens first; the stream is applied to the finished
//! record bytes.

use super::{
	CodecError, Cursor, Descriptor, Schema, StructValue, Value, decode_descriptor, decode_struct,
	encode_descriptor, encode_struct,
};

/// Applies the XOR stream to a region in place.
pub fn crypt_in_place(data: &mut [u8], key: u8) {
	for (i, b) in data.iter_mut().enumerate() {
		*b ^= key.wrapping_add(i as u8);
	}
}

/// Applies the XOR stream to a copy of the region.
pub fn crypt_bytes(data: &[u8], key: u8) -> Vec<u8> {
	let mut out = data.to_vec();
	crypt_in_place(&mut out, key);
	out
}

/// Decodes one obfuscated record: reads `schema.size_bytes()` bytes,
/// strips the stream, then decodes as usual.
pub fn decode_struct_encrypted(
	schema: &Schema,
	cur: &mut Cursor,
	key: u8,
) -> Result<StructValue, CodecError> {
	let mut region = cur.read_bytes(schema.size_bytes())?.to_vec();
	crypt_in_place(&mut region, key);
	decode_struct(schema, &mut Cursor::new(region))
}

/// Encodes one record and writes it through the stream.
pub fn encode_struct_encrypted(
	schema: &Schema,
	value: &StructValue,
	cur: &mut Cursor,
	key: u8,
) -> Result<(), CodecError> {
	let mut plain = Cursor::empty();
	encode_struct(schema, value, &mut plain)?;
	let mut region = plain.into_inner();
	crypt_in_place(&mut region, key);
	cur.write_bytes(&region);
	Ok(())
}

/// Decodes one obfuscated non-struct member.
pub fn decode_member_encrypted(
	desc: &Descriptor,
	cur: &mut Cursor,
	key: u8,
) -> Result<Value, CodecError> {
	let mut region = cur.read_bytes(desc.size_bits() / 8)?.to_vec();
	crypt_in_place(&mut region, key);
	decode_descriptor(desc, &mut Cursor::new(region))
}

/// Encodes one member through the stream.
pub fn encode_member_encrypted(
	desc: &Descriptor,
	value: &Value,
	cur: &mut Cursor,
	key: u8,
) -> Result<(), CodecError> {
	let mut plain = Cursor::empty();
	encode_descriptor(desc, value, &mut plain, "<member>")?;
	let mut region = plain.into_inner();
	crypt_in_place(&mut region, key);
	cur.write_bytes(&region);
	Ok(())
}

/// Decodes an array whose whole byte region is one XOR stream.
pub fn decode_array_encrypted(
	elem: &Descriptor,
	n: usize,
	cur: &mut Cursor,
	key: u8,
) -> Result<Vec<Value>, CodecError> {
	let mut region = cur.read_bytes(elem.size_bits() / 8 * n)?.to_vec();
	crypt_in_place(&mut region, key);
	let mut plain = Cursor::new(region);
	let mut out = Vec::with_capacity(n);
	for _ in 0..n {
		out.push(decode_descriptor(elem, &mut plain)?);
	}
	Ok(out)
}

/// Encodes an array as one XOR stream over its whole byte region.
pub fn encode_array_encrypted(
	elem: &Descriptor,
	values: &[Value],
	cur: &mut Cursor,
	key: u8,
) -> Result<(), CodecError> {
	let mut plain = Cursor::empty();
	for (i, v) in values.iter().enumerate() {
		encode_descriptor(elem, v, &mut plain, &format!("[{i}]"))?;
	}
	let mut region = plain.into_inner();
	crypt_in_place(&mut region, key);
	cur.write_bytes(&region);
	Ok(())
}

/// Decodes `n` obfuscated records; the stream restarts at `key` for each
/// record, the way the map stores its sector, wall, and sprite arrays.
pub fn decode_struct_array_encrypted(
	schema: &Schema,
	n: usize,
	cur: &mut Cursor,
	key: u8,
) -> Result<Vec<StructValue>, CodecError> {
	let mut out = Vec::with_capacity(n);
	for _ in 0..n {
		out.push(decode_struct_encrypted(schema, cur, key)?);
	}
	Ok(out)
}

/// Encodes `n` records, restarting the stream at `key` for each.
pub fn encode_struct_array_encrypted(
	schema: &Schema,
	values: &[StructValue],
	cur: &mut Cursor,
	key: u8,
) -> Result<(), CodecError> {
	for v in values {
		encode_struct_encrypted(schema, v, cur, key)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_stream_bytes() {
		let mut data = b"ABC".to_vec();
		crypt_in_place(&mut data, 0x10);
		assert_eq!(data, vec![0x51, 0x53, 0x51]);
		crypt_in_place(&mut data, 0x10);
		assert_eq!(data, b"ABC");
	}

	#[test]
	fn stream_is_involutive_across_the_key_wrap() {
		let original: Vec<u8> = (0..600).map(|i| (i * 7) as u8).collect();
		let crypted = crypt_bytes(&original, 0xF3);
		assert_ne!(crypted, original);
		assert_eq!(crypt_bytes(&crypted, 0xF3), original);
	}

	#[test]
	fn encrypted_struct_round_trips() {
		let schema = Schema::new("T")
			.field("x", Descriptor::I32)
			.field("tile", Descriptor::Partial { parent_bits: 16, width: 12 })
			.field("flags", Descriptor::Partial { parent_bits: 16, width: 4 });
		let mut v = schema.default_value();
		v.set_int("x", -123_456);
		v.set_int("tile", 0x7FF);
		v.set_int("flags", 0b1010);

		let mut cur = Cursor::empty();
		encode_struct_encrypted(&schema, &v, &mut cur, 0x77).unwrap();
		assert_eq!(cur.len(), schema.size_bytes());

		let mut back = Cursor::new(cur.into_inner());
		let decoded = decode_struct_encrypted(&schema, &mut back, 0x77).unwrap();
		assert_eq!(decoded, v);
	}

	#[test]
	fn struct_array_restarts_key_per_record() {
		let schema = Schema::new("T").field("v", Descriptor::U16);
		let mut v0 = schema.default_value();
		v0.set_int("v", 0x1111);
		let mut v1 = schema.default_value();
		v1.set_int("v", 0x1111);

		let mut cur = Cursor::empty();
		encode_struct_array_encrypted(&schema, &[v0, v1], &mut cur, 0x20).unwrap();
		// Identical records produce identical bytes because the stream
		// restarts at the record boundary.
		let bytes = cur.as_slice();
		assert_eq!(&bytes[0..2], &bytes[2..4]);

		let mut back = Cursor::from_slice(bytes);
		let decoded = decode_struct_array_encrypted(&schema, 2, &mut back, 0x20).unwrap();
		assert_eq!(decoded[0].int("v"), 0x1111);
		assert_eq!(decoded[1].int("v"), 0x1111);
	}

	#[test]
	fn whole_array_uses_one_stream() {
		let elem = Descriptor::U8;
		let values = vec![Value::Int(0), Value::Int(0), Value::Int(0)];
		let mut cur = Cursor::empty();
		encode_array_encrypted(&elem, &values, &mut cur, 0x10).unwrap();
		assert_eq!(cur.as_slice(), &[0x10, 0x11, 0x12]);
		let mut back = Cursor::from_slice(cur.as_slice());
		let decoded = decode_array_encrypted(&elem, 3, &mut back, 0x10).unwrap();
		assert_eq!(decoded, values);
	}
}
