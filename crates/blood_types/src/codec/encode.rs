//! Schema-driven encoding.

use encoding_rs::WINDOWS_1252;

use super::decode::partial_group_end;
use super::{CodecError, Cursor, Descriptor, Schema, StructValue, Value};

/// Encodes one record at the cursor, mirroring [`super::decode_struct`].
///
/// Partial members are masked to their width and packed LSB-first into
/// one underlying integer; a value that does not fit its width fails with
/// [`CodecError::Overflow`] before anything is written for that group.
pub fn encode_struct(
	schema: &Schema,
	value: &StructValue,
	cur: &mut Cursor,
) -> Result<(), CodecError> {
	let members = schema.members();
	let mut i = 0;
	while i < members.len() {
		match members[i].desc {
			Descriptor::Partial {
				parent_bits, ..
			} => {
				let end = partial_group_end(schema, i)?;
				let mut raw = 0u64;
				let mut shift = 0u32;
				for m in &members[i..end] {
					if let Descriptor::Partial {
						width, ..
					} = m.desc
					{
						let path = schema.path(&m.name);
						let v = member_int(value, schema, &m.name)?;
						let mask = (1u64 << width) - 1;
						if v < 0 || (v as u64) & !mask != 0 {
							return Err(CodecError::overflow(
								path,
								format!("{v} exceeds a {width}-bit field"),
							));
						}
						raw |= (v as u64) << shift;
						shift += u32::from(width);
					}
				}
				cur.write_uint(raw, usize::from(parent_bits) / 8);
				i = end;
			}
			ref desc => {
				let path = schema.path(&members[i].name);
				let v = value
					.get(&members[i].name)
					.ok_or_else(|| CodecError::schema(&path, "missing member in value"))?;
				encode_descriptor(desc, v, cur, &path)?;
				i += 1;
			}
		}
	}
	Ok(())
}

/// Encodes `n` back-to-back elements of the given descriptor.
pub fn encode_array(
	elem: &Descriptor,
	values: &[Value],
	cur: &mut Cursor,
) -> Result<(), CodecError> {
	for (i, v) in values.iter().enumerate() {
		encode_descriptor(elem, v, cur, &format!("[{i}]"))?;
	}
	Ok(())
}

/// Encodes a single non-partial descriptor at the cursor.
pub fn encode_descriptor(
	desc: &Descriptor,
	value: &Value,
	cur: &mut Cursor,
	path: &str,
) -> Result<(), CodecError> {
	match desc {
		Descriptor::U8 => write_int(cur, value, 0, 0xFF, 1, path),
		Descriptor::I8 => write_int(cur, value, i64::from(i8::MIN), i64::from(i8::MAX), 1, path),
		Descriptor::U16 => write_int(cur, value, 0, 0xFFFF, 2, path),
		Descriptor::I16 => {
			write_int(cur, value, i64::from(i16::MIN), i64::from(i16::MAX), 2, path)
		}
		Descriptor::U32 => write_int(cur, value, 0, 0xFFFF_FFFF, 4, path),
		Descriptor::I32 => {
			write_int(cur, value, i64::from(i32::MIN), i64::from(i32::MAX), 4, path)
		}
		Descriptor::Bytes(n) => {
			let b = value
				.as_bytes()
				.ok_or_else(|| CodecError::schema(path, "expected a blob value"))?;
			if b.len() != *n {
				return Err(CodecError::overflow(
					path,
					format!("blob is {} bytes, field holds {n}", b.len()),
				));
			}
			cur.write_bytes(b);
			Ok(())
		}
		Descriptor::Str(n) => {
			let s = value
				.as_str()
				.ok_or_else(|| CodecError::schema(path, "expected a string value"))?;
			let (encoded, _, _) = WINDOWS_1252.encode(s);
			if encoded.len() > *n {
				return Err(CodecError::overflow(
					path,
					format!("string is {} bytes, field holds {n}", encoded.len()),
				));
			}
			cur.write_bytes(&encoded);
			cur.write_bytes(&vec![0u8; n - encoded.len()]);
			Ok(())
		}
		Descriptor::Array(inner, n) => {
			let list = value
				.as_list()
				.ok_or_else(|| CodecError::schema(path, "expected an array value"))?;
			if list.len() != *n {
				return Err(CodecError::overflow(
					path,
					format!("array has {} elements, field holds {n}", list.len()),
				));
			}
			for (i, v) in list.iter().enumerate() {
				encode_descriptor(inner, v, cur, &format!("{path}[{i}]"))?;
			}
			Ok(())
		}
		Descriptor::Nested(schema) => {
			let nested = value
				.as_struct()
				.ok_or_else(|| CodecError::schema(path, "expected a nested record"))?;
			encode_struct(schema, nested, cur)
		}
		Descriptor::Partial { .. } => Err(CodecError::schema(
			path,
			"partial integers only exist inside a struct member list",
		)),
	}
}

fn write_int(
	cur: &mut Cursor,
	value: &Value,
	min: i64,
	max: i64,
	size: usize,
	path: &str,
) -> Result<(), CodecError> {
	let v = value
		.as_int()
		.ok_or_else(|| CodecError::schema(path, "expected an integer value"))?;
	if v < min || v > max {
		return Err(CodecError::overflow(path, format!("{v} is outside [{min}, {max}]")));
	}
	cur.write_uint(v as u64, size);
	Ok(())
}

fn member_int(value: &StructValue, schema: &Schema, name: &str) -> Result<i64, CodecError> {
	value
		.get(name)
		.and_then(Value::as_int)
		.ok_or_else(|| CodecError::schema(schema.path(name), "missing integer member in value"))
}

#[cfg(test)]
mod tests {
	use super::super::{decode_struct, encode_struct};
	use super::*;

	fn stat_schema() -> Schema {
		let bit = || Descriptor::Partial {
			parent_bits: 16,
			width: 1,
		};
		Schema::new("Stat")
			.field("a", bit())
			.field("b", bit())
			.field("c", bit())
			.field("d", bit())
			.field("e", bit())
			.field("f", bit())
			.field("g", bit())
			.field("h", Descriptor::Partial { parent_bits: 16, width: 2 })
			.field("r", Descriptor::Partial { parent_bits: 16, width: 7 })
	}

	#[test]
	fn stat_word_round_trips_to_same_bytes() {
		let schema = stat_schema();
		let mut cur = Cursor::new(vec![0x35, 0x00]);
		let v = decode_struct(&schema, &mut cur).unwrap();
		let mut out = Cursor::empty();
		encode_struct(&schema, &v, &mut out).unwrap();
		assert_eq!(out.as_slice(), &[0x35, 0x00]);
	}

	#[test]
	fn packed_integer_matches_shift_sum() {
		// Property: the encoded integer is the sum of each member masked
		// to its width and shifted by the widths before it.
		let schema = Schema::new("T")
			.field("a", Descriptor::Partial { parent_bits: 32, width: 5 })
			.field("b", Descriptor::Partial { parent_bits: 32, width: 11 })
			.field("c", Descriptor::Partial { parent_bits: 32, width: 16 });
		let mut v = schema.default_value();
		v.set_int("a", 0x13);
		v.set_int("b", 0x5A5);
		v.set_int("c", 0xBEEF);
		let mut cur = Cursor::empty();
		encode_struct(&schema, &v, &mut cur).unwrap();
		let expected: u32 = 0x13 | (0x5A5 << 5) | (0xBEEF << 16);
		assert_eq!(cur.as_slice(), &expected.to_le_bytes());
	}

	#[test]
	fn overflow_is_reported_with_member_path() {
		let schema = Schema::new("T")
			.field("lo", Descriptor::Partial { parent_bits: 8, width: 3 })
			.field("hi", Descriptor::Partial { parent_bits: 8, width: 5 });
		let mut v = schema.default_value();
		v.set_int("lo", 8);
		let mut cur = Cursor::empty();
		let err = encode_struct(&schema, &v, &mut cur).unwrap_err();
		match err {
			CodecError::Overflow {
				path, ..
			} => assert_eq!(path, "T.lo"),
			other => panic!("expected overflow, got {other}"),
		}
	}

	#[test]
	fn scalar_range_checks() {
		let schema = Schema::new("T").field("v", Descriptor::I8);
		let mut v = schema.default_value();
		v.set_int("v", 200);
		let mut cur = Cursor::empty();
		assert!(matches!(
			encode_struct(&schema, &v, &mut cur),
			Err(CodecError::Overflow { .. })
		));
	}

	#[test]
	fn strings_are_nul_padded() {
		let schema = Schema::new("T").field("name", Descriptor::Str(6));
		let mut v = schema.default_value();
		v.set(
			"name",
			Value::Str("MAP".to_string()),
		);
		let mut cur = Cursor::empty();
		encode_struct(&schema, &v, &mut cur).unwrap();
		assert_eq!(cur.as_slice(), b"MAP\0\0\0");
	}

	#[test]
	fn encoded_size_equals_schema_size() {
		let schema = Schema::new("T")
			.field("a", Descriptor::U32)
			.field("b", Descriptor::Str(11))
			.field("c", Descriptor::Partial { parent_bits: 16, width: 12 })
			.field("d", Descriptor::Partial { parent_bits: 16, width: 4 });
		let mut cur = Cursor::empty();
		encode_struct(&schema, &schema.default_value(), &mut cur).unwrap();
		assert_eq!(cur.len(), schema.size_bytes());
	}

	#[test]
	fn arbitrary_buffer_round_trips_byte_identical() {
		let schema = Schema::new("T")
			.field("x", Descriptor::I32)
			.field("flags", Descriptor::Partial { parent_bits: 16, width: 9 })
			.field("rest", Descriptor::Partial { parent_bits: 16, width: 7 })
			.field("blob", Descriptor::Bytes(3));
		let buf: Vec<u8> = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x35, 0xF0, 0x01, 0x02, 0x03];
		let mut cur = Cursor::from_slice(&buf);
		let v = decode_struct(&schema, &mut cur).unwrap();
		let mut out = Cursor::empty();
		encode_struct(&schema, &v, &mut out).unwrap();
		assert_eq!(out.as_slice(), buf.as_slice());
	}
}
