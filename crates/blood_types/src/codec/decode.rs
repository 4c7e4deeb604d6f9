//! Schema-driven decoding.

use encoding_rs::WINDOWS_1252;

use super::{CodecError, Cursor, Descriptor, Schema, StructValue, Value};

/// Decodes one record at the cursor.
///
/// Consecutive partial-integer members are grouped, one underlying
/// integer is read, and its bits are distributed LSB-first: member 0 gets
/// bits `[0, w0)`, member 1 gets `[w0, w0 + w1)`, and so on.
pub fn decode_struct(schema: &Schema, cur: &mut Cursor) -> Result<StructValue, CodecError> {
	let members = schema.members();
	let mut out = StructValue::new();
	let mut i = 0;
	while i < members.len() {
		match members[i].desc {
			Descriptor::Partial {
				parent_bits, ..
			} => {
				let end = partial_group_end(schema, i)?;
				let raw = cur.read_uint(usize::from(parent_bits) / 8)?;
				let mut shift = 0u32;
				for m in &members[i..end] {
					if let Descriptor::Partial {
						width, ..
					} = m.desc
					{
						let mask = (1u64 << width) - 1;
						out.push(&m.name, Value::Int(((raw >> shift) & mask) as i64));
						shift += u32::from(width);
					}
				}
				i = end;
			}
			ref desc => {
				let value = decode_descriptor(desc, cur).map_err(|e| at_member(e, schema, i))?;
				out.push(&members[i].name, value);
				i += 1;
			}
		}
	}
	Ok(out)
}

/// Decodes `n` back-to-back elements of the given descriptor.
pub fn decode_array(
	elem: &Descriptor,
	n: usize,
	cur: &mut Cursor,
) -> Result<Vec<Value>, CodecError> {
	let mut out = Vec::with_capacity(n);
	for _ in 0..n {
		out.push(decode_descriptor(elem, cur)?);
	}
	Ok(out)
}

/// Decodes a single non-partial descriptor at the cursor.
pub fn decode_descriptor(desc: &Descriptor, cur: &mut Cursor) -> Result<Value, CodecError> {
	match desc {
		Descriptor::U8 => Ok(Value::Int(i64::from(cur.read_u8()?))),
		Descriptor::I8 => Ok(Value::Int(i64::from(cur.read_u8()? as i8))),
		Descriptor::U16 => Ok(Value::Int(i64::from(cur.read_u16()?))),
		Descriptor::I16 => Ok(Value::Int(i64::from(cur.read_u16()? as i16))),
		Descriptor::U32 => Ok(Value::Int(i64::from(cur.read_u32()?))),
		Descriptor::I32 => Ok(Value::Int(i64::from(cur.read_u32()? as i32))),
		Descriptor::Bytes(n) => Ok(Value::Bytes(cur.read_bytes(*n)?.to_vec())),
		Descriptor::Str(n) => {
			let raw = cur.read_bytes(*n)?;
			let trimmed = match raw.iter().rposition(|&b| b != 0) {
				Some(last) => &raw[..=last],
				None => &[],
			};
			let (text, _, _) = WINDOWS_1252.decode(trimmed);
			Ok(Value::Str(text.into_owned()))
		}
		Descriptor::Array(inner, n) => Ok(Value::List(decode_array(inner, *n, cur)?)),
		Descriptor::Nested(schema) => Ok(Value::Struct(decode_struct(schema, cur)?)),
		Descriptor::Partial { .. } => Err(CodecError::schema(
			"<partial>",
			"partial integers only exist inside a struct member list",
		)),
	}
}

/// Finds the end of the partial group starting at member `start` and
/// checks it against the grouping rules.
pub(super) fn partial_group_end(schema: &Schema, start: usize) -> Result<usize, CodecError> {
	let members = schema.members();
	let Descriptor::Partial {
		parent_bits,
		..
	} = members[start].desc
	else {
		return Err(CodecError::schema(schema.path(&members[start].name), "not a partial member"));
	};
	if !matches!(parent_bits, 8 | 16 | 32) {
		return Err(CodecError::schema(
			schema.path(&members[start].name),
			format!("unsupported parent size of {parent_bits} bits"),
		));
	}
	let mut filled = 0u32;
	for (i, m) in members.iter().enumerate().skip(start) {
		let Descriptor::Partial {
			parent_bits: parent,
			width,
		} = m.desc
		else {
			return Err(CodecError::schema(
				schema.path(&m.name),
				format!("non-partial member interrupts a {parent_bits}-bit partial group"),
			));
		};
		if parent != parent_bits {
			return Err(CodecError::schema(
				schema.path(&m.name),
				format!("partial group switches parent size from {parent_bits} to {parent} bits"),
			));
		}
		filled += u32::from(width);
		if filled == u32::from(parent_bits) {
			return Ok(i + 1);
		}
		if filled > u32::from(parent_bits) {
			return Err(CodecError::schema(
				schema.path(&m.name),
				format!("partial group overflows its {parent_bits}-bit parent"),
			));
		}
	}
	Err(CodecError::schema(
		schema.name(),
		format!("trailing partial group covers only {filled}/{parent_bits} bits"),
	))
}

fn at_member(err: CodecError, schema: &Schema, index: usize) -> CodecError {
	match err {
		CodecError::Schema {
			path,
			reason,
		} if path == "<partial>" => {
			CodecError::schema(schema.path(&schema.members()[index].name), reason)
		}
		other => other,
	}
}
