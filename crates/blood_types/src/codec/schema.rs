//! Record schemas: the declarative side of the codec.

use super::{CodecError, StructValue, Value};

/// Describes one storage unit of a record.
///
/// Integers are little-endian. [`Descriptor::Partial`] members occupy part
/// of an underlying unsigned integer of `parent_bits`; consecutive
/// partials with the same parent size combine LSB-first until their widths
/// sum to the parent size. Sign-like encodings inside a partial are the
/// caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
	/// Unsigned byte
	U8,
	/// Signed byte
	I8,
	/// Unsigned 16-bit integer
	U16,
	/// Signed 16-bit integer
	I16,
	/// Unsigned 32-bit integer
	U32,
	/// Signed 32-bit integer
	I32,
	/// Raw blob of exactly `n` bytes
	Bytes(usize),
	/// NUL-padded text of exactly `n` bytes (Windows-1252)
	Str(usize),
	/// `n` back-to-back repetitions of another descriptor
	Array(Box<Descriptor>, usize),
	/// Sub-field of an enclosing unsigned integer
	Partial {
		/// Size in bits of the underlying integer (8, 16 or 32)
		parent_bits: u8,
		/// Width in bits of this member
		width: u8,
	},
	/// An embedded record; partial grouping never crosses this boundary
	Nested(Schema),
}

impl Descriptor {
	/// Size of this descriptor in bits. Fractional byte sizes only occur
	/// inside partial-integer groups.
	pub fn size_bits(&self) -> usize {
		match self {
			Self::U8 | Self::I8 => 8,
			Self::U16 | Self::I16 => 16,
			Self::U32 | Self::I32 => 32,
			Self::Bytes(n) | Self::Str(n) => n * 8,
			Self::Array(inner, n) => inner.size_bits() * n,
			Self::Partial {
				width, ..
			} => usize::from(*width),
			Self::Nested(schema) => schema.size_bits(),
		}
	}

	/// The zero/empty value for this descriptor.
	pub fn default_value(&self) -> Value {
		match self {
			Self::U8
			| Self::I8
			| Self::U16
			| Self::I16
			| Self::U32
			| Self::I32
			| Self::Partial { .. } => Value::Int(0),
			Self::Bytes(n) => Value::Bytes(vec![0; *n]),
			Self::Str(_) => Value::Str(String::new()),
			Self::Array(inner, n) => Value::List((0..*n).map(|_| inner.default_value()).collect()),
			Self::Nested(schema) => Value::Struct(schema.default_value()),
		}
	}
}

/// A named member of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
	/// Member name; purely for the host program, never on the wire
	pub name: String,
	/// Wire layout of the member
	pub desc: Descriptor,
}

/// An ordered list of named descriptors; the order is the on-wire order.
///
/// A well-formed schema has integral total size: every run of
/// [`Descriptor::Partial`] members covers whole underlying integers.
/// Schemas are built by chaining [`Schema::field`]:
///
/// ```
/// use blood_types::codec::{Descriptor, Schema};
///
/// let schema = Schema::new("RffHeader")
/// 	.field("magic", Descriptor::Bytes(4))
/// 	.field("version", Descriptor::U32);
/// assert_eq!(schema.size_bytes(), 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
	name: String,
	members: Vec<Member>,
}

impl Schema {
	/// Creates an empty schema with the given record name.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			members: Vec::new(),
		}
	}

	/// Appends a member and returns the schema for chaining.
	pub fn field(mut self, name: &str, desc: Descriptor) -> Self {
		self.members.push(Member {
			name: name.to_string(),
			desc,
		});
		self
	}

	/// Record name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Ordered members.
	pub fn members(&self) -> &[Member] {
		&self.members
	}

	/// Total size in bits.
	pub fn size_bits(&self) -> usize {
		self.members.iter().map(|m| m.desc.size_bits()).sum()
	}

	/// Total encoded size in bytes. Meaningful only for valid schemas,
	/// where the bit total is always a multiple of eight.
	pub fn size_bytes(&self) -> usize {
		self.size_bits() / 8
	}

	/// Path of a member for error reporting.
	pub(crate) fn path(&self, member: &str) -> String {
		format!("{}.{}", self.name, member)
	}

	/// Checks the schema for internal consistency: partial groups must
	/// agree on their parent size and cover it exactly, arrays must not
	/// contain bare partials, and nested schemas must themselves be valid.
	pub fn validate(&self) -> Result<(), CodecError> {
		let mut filled = 0u8;
		let mut group_parent = 0u8;
		for m in &self.members {
			match &m.desc {
				Descriptor::Partial {
					parent_bits,
					width,
				} => {
					if !matches!(parent_bits, 8 | 16 | 32) {
						return Err(CodecError::schema(
							self.path(&m.name),
							format!("unsupported parent size of {parent_bits} bits"),
						));
					}
					if *width == 0 || width > parent_bits {
						return Err(CodecError::schema(
							self.path(&m.name),
							format!("width {width} does not fit a {parent_bits}-bit parent"),
						));
					}
					if filled == 0 {
						group_parent = *parent_bits;
					} else if *parent_bits != group_parent {
						return Err(CodecError::schema(
							self.path(&m.name),
							format!(
								"partial group switches parent size from {group_parent} to {parent_bits} bits"
							),
						));
					}
					filled += width;
					if filled > group_parent {
						return Err(CodecError::schema(
							self.path(&m.name),
							format!("partial group overflows its {group_parent}-bit parent"),
						));
					}
					if filled == group_parent {
						filled = 0;
					}
				}
				other => {
					if filled != 0 {
						return Err(CodecError::schema(
							self.path(&m.name),
							format!(
								"non-partial member interrupts a partial group at {filled}/{group_parent} bits"
							),
						));
					}
					self.validate_descriptor(&m.name, other)?;
				}
			}
		}
		if filled != 0 {
			return Err(CodecError::schema(
				&self.name,
				format!("trailing partial group covers only {filled}/{group_parent} bits"),
			));
		}
		Ok(())
	}

	fn validate_descriptor(&self, member: &str, desc: &Descriptor) -> Result<(), CodecError> {
		match desc {
			Descriptor::Array(inner, _) => match inner.as_ref() {
				Descriptor::Partial { .. } => Err(CodecError::schema(
					self.path(member),
					"arrays of bare partial integers are not representable",
				)),
				other => self.validate_descriptor(member, other),
			},
			Descriptor::Nested(schema) => schema.validate(),
			_ => Ok(()),
		}
	}

	/// A value with every member at its zero/empty default.
	pub fn default_value(&self) -> StructValue {
		let mut out = StructValue::new();
		for m in &self.members {
			out.push(&m.name, m.desc.default_value());
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sizes_add_up() {
		let schema = Schema::new("T")
			.field("a", Descriptor::U16)
			.field("b", Descriptor::Bytes(3))
			.field("c", Descriptor::Array(Box::new(Descriptor::I16), 3));
		assert_eq!(schema.size_bytes(), 11);
		schema.validate().unwrap();
	}

	#[test]
	fn partial_group_must_cover_parent() {
		let schema = Schema::new("T")
			.field("lo", Descriptor::Partial { parent_bits: 16, width: 12 })
			.field("hi", Descriptor::Partial { parent_bits: 16, width: 3 });
		let err = schema.validate().unwrap_err();
		assert!(matches!(err, CodecError::Schema { .. }));
	}

	#[test]
	fn partial_group_may_not_switch_parent() {
		let schema = Schema::new("T")
			.field("lo", Descriptor::Partial { parent_bits: 16, width: 8 })
			.field("hi", Descriptor::Partial { parent_bits: 8, width: 8 });
		assert!(schema.validate().is_err());
	}

	#[test]
	fn interrupted_group_is_invalid() {
		let schema = Schema::new("T")
			.field("lo", Descriptor::Partial { parent_bits: 16, width: 8 })
			.field("x", Descriptor::U8)
			.field("hi", Descriptor::Partial { parent_bits: 16, width: 8 });
		assert!(schema.validate().is_err());
	}

	#[test]
	fn default_value_matches_shape() {
		let schema = Schema::new("T")
			.field("n", Descriptor::U32)
			.field("name", Descriptor::Str(8))
			.field("tags", Descriptor::Array(Box::new(Descriptor::I16), 3));
		let v = schema.default_value();
		assert_eq!(v.int("n"), 0);
		assert_eq!(v.list("tags").len(), 3);
	}
}
