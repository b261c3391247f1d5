//! # Prevail Codec
//!
//! Serialization building blocks for Prevail snapshots.
//!
//! This crate provides:
//! - [`FieldValue`], the hashable dynamic value that index buckets and
//!   field filters compare against
//! - Versioned CBOR envelopes ([`encode_envelope`] / [`decode_envelope`])
//!   wrapping whole-structure snapshot artifacts
//! - [`Payload`] conversion for individual records
//!
//! ## Usage
//!
//! ```
//! use prevail_codec::{decode_envelope, encode_envelope, FieldValue};
//!
//! let value = vec![FieldValue::from("Paris"), FieldValue::from(42)];
//! let bytes = encode_envelope(*b"DEMO", 1, &value).unwrap();
//!
//! let decoded: Vec<FieldValue> = decode_envelope(*b"DEMO", 1, &bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod envelope;
mod error;
mod value;

pub use envelope::{decode_envelope, encode_envelope, from_payload, to_payload, Payload, HEADER_LEN};
pub use error::{CodecError, CodecResult};
pub use value::FieldValue;
