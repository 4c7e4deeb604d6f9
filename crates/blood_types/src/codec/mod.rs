//! Declarative binary record codec.
//!
//! A [`Schema`] is an ordered list of named [`Descriptor`]s describing the
//! byte-exact layout of a fixed-size record: whole-byte integers, blobs,
//! NUL-padded strings, arrays, nested records, and sub-byte bitfields
//! ([`Descriptor::Partial`]) that combine LSB-first into one on-wire
//! integer. [`decode_struct`] and [`encode_struct`] walk the same schema in
//! both directions, so `decode(encode(v)) == v` and re-encoding a decoded
//! buffer reproduces it byte for byte.
//!
//! The `*_encrypted` variants layer the archive's additive-key XOR stream
//! (`b[i] ^ ((key + i) & 0xFF)`) over any record or array; the transform is
//! its own inverse.

mod crypt;
mod cursor;
mod decode;
mod encode;
mod schema;
mod value;

pub use crypt::{
	crypt_bytes, crypt_in_place, decode_array_encrypted, decode_member_encrypted,
	decode_struct_array_encrypted, decode_struct_encrypted, encode_array_encrypted,
	encode_member_encrypted, encode_struct_array_encrypted, encode_struct_encrypted,
};
pub use cursor::Cursor;
pub use decode::{decode_array, decode_descriptor, decode_struct};
pub use encode::{encode_array, encode_descriptor, encode_struct};
pub use schema::{Descriptor, Member, Schema};
pub use value::{StructValue, Value};

use thiserror::Error;

/// Errors produced by the record codec.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The cursor ran out of bytes mid-record
	#[error("truncated input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
	TruncatedInput {
		/// Bytes the read required
		needed: usize,
		/// Cursor position at the failed read
		offset: usize,
		/// Bytes left in the buffer
		remaining: usize,
	},

	/// A declared schema is internally inconsistent
	#[error("schema error at `{path}`: {reason}")]
	Schema {
		/// Path of the offending member (`Schema.member`)
		path: String,
		/// What is wrong with the declaration
		reason: String,
	},

	/// A value to be written does not fit its declared field
	#[error("overflow at `{path}`: {reason}")]
	Overflow {
		/// Path of the offending member
		path: String,
		/// Why the value does not fit
		reason: String,
	},
}

impl CodecError {
	pub(crate) fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Schema {
			path: path.into(),
			reason: reason.into(),
		}
	}

	pub(crate) fn overflow(path: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Overflow {
			path: path.into(),
			reason: reason.into(),
		}
	}
}
