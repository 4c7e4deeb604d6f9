//! Decoded record values.

use std::fmt;
use std::ops::Index;

/// A decoded member value.
///
/// Integers of every width are carried as `i64`; partial-integer members
/// are always non-negative. Values are plain data: deep copies come from
/// `Clone`, structural equality from `PartialEq`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Any integer member, including partials
	Int(i64),
	/// A fixed-length blob
	Bytes(Vec<u8>),
	/// A fixed-length NUL-padded string, trimmed
	Str(String),
	/// An array member
	List(Vec<Value>),
	/// A nested record
	Struct(StructValue),
}

impl Value {
	/// The integer payload, if this is an integer.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// The blob payload, if this is a blob.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Self::Bytes(b) => Some(b),
			_ => None,
		}
	}

	/// The string payload, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// The elements, if this is an array.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(l) => Some(l),
			_ => None,
		}
	}

	/// Mutable elements, if this is an array.
	pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
		match self {
			Self::List(l) => Some(l),
			_ => None,
		}
	}

	/// The nested record, if this is a struct.
	pub fn as_struct(&self) -> Option<&StructValue> {
		match self {
			Self::Struct(s) => Some(s),
			_ => None,
		}
	}

	/// Mutable nested record, if this is a struct.
	pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
		match self {
			Self::Struct(s) => Some(s),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(v) => write!(f, "{v}"),
			Self::Bytes(b) => write!(f, "{} bytes", b.len()),
			Self::Str(s) => write!(f, "{s:?}"),
			Self::List(l) => write!(f, "[{} elements]", l.len()),
			Self::Struct(s) => write!(f, "{s}"),
		}
	}
}

/// An ordered mapping from member name to [`Value`], as produced by
/// decoding a schema. Member order matches the schema's wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
	fields: Vec<(String, Value)>,
}

impl StructValue {
	/// Creates an empty value.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a member. Used by the decoder and by `Schema::default_value`.
	pub(crate) fn push(&mut self, name: &str, value: Value) {
		self.fields.push((name.to_string(), value));
	}

	/// All members in wire order.
	pub fn fields(&self) -> &[(String, Value)] {
		&self.fields
	}

	/// Looks up a member by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
	}

	/// Looks up a member by name, mutably.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.fields.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
	}

	/// Replaces a member's value, or appends it if absent.
	pub fn set(&mut self, name: &str, value: Value) {
		match self.get_mut(name) {
			Some(slot) => *slot = value,
			None => self.push(name, value),
		}
	}

	/// Integer member accessor.
	///
	/// # Panics
	/// Panics if the member is absent or not an integer; member names come
	/// from static schemas, so a miss is a programming error like an
	/// out-of-bounds index.
	pub fn int(&self, name: &str) -> i64 {
		match self.get(name) {
			Some(Value::Int(v)) => *v,
			_ => panic!("no integer member `{name}`"),
		}
	}

	/// Sets an integer member.
	pub fn set_int(&mut self, name: &str, value: i64) {
		self.set(name, Value::Int(value));
	}

	/// Array member accessor.
	///
	/// # Panics
	/// Panics if the member is absent or not an array.
	pub fn list(&self, name: &str) -> &[Value] {
		match self.get(name) {
			Some(Value::List(l)) => l,
			_ => panic!("no array member `{name}`"),
		}
	}

	/// Nested record accessor.
	///
	/// # Panics
	/// Panics if the member is absent or not a struct.
	pub fn nested(&self, name: &str) -> &StructValue {
		match self.get(name) {
			Some(Value::Struct(s)) => s,
			_ => panic!("no nested member `{name}`"),
		}
	}

	/// Paths of members that differ between two values, in `self` order.
	/// Array elements append `[i]`, nested members append `.name`. Members
	/// missing on either side count as changed.
	pub fn diff(&self, other: &StructValue) -> Vec<String> {
		let mut out = Vec::new();
		diff_structs(self, other, "", &mut out);
		for (name, _) in &other.fields {
			if self.get(name).is_none() {
				out.push(name.clone());
			}
		}
		out
	}
}

fn diff_structs(a: &StructValue, b: &StructValue, prefix: &str, out: &mut Vec<String>) {
	for (name, va) in &a.fields {
		let path = if prefix.is_empty() {
			name.clone()
		} else {
			format!("{prefix}.{name}")
		};
		match b.get(name) {
			None => out.push(path),
			Some(vb) => diff_values(va, vb, &path, out),
		}
	}
}

fn diff_values(a: &Value, b: &Value, path: &str, out: &mut Vec<String>) {
	match (a, b) {
		(Value::Struct(sa), Value::Struct(sb)) => diff_structs(sa, sb, path, out),
		(Value::List(la), Value::List(lb)) => {
			if la.len() != lb.len() {
				out.push(path.to_string());
				return;
			}
			for (i, (ea, eb)) in la.iter().zip(lb).enumerate() {
				diff_values(ea, eb, &format!("{path}[{i}]"), out);
			}
		}
		_ => {
			if a != b {
				out.push(path.to_string());
			}
		}
	}
}

impl Index<&str> for StructValue {
	type Output = Value;

	fn index(&self, name: &str) -> &Value {
		match self.get(name) {
			Some(v) => v,
			None => panic!("no member `{name}`"),
		}
	}
}

impl fmt::Display for StructValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{ ")?;
		for (i, (name, value)) in self.fields.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{name}: {value}")?;
		}
		write!(f, " }}")
	}
}
