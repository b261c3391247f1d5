//! Versioned CBOR envelopes for snapshot artifacts.
//!
//! ## Format
//!
//! ```text
//! Envelope {
//!     magic: [u8; 4]   // identifies the artifact kind
//!     version: u8
//!     body: CBOR       // serde-encoded artifact structure
//! }
//! ```
//!
//! The body is produced with `ciborium`, so any `serde` type round-trips.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A structured CBOR value holding one record's serialized fields.
pub type Payload = ciborium::value::Value;

/// Length of the envelope header (magic + version).
pub const HEADER_LEN: usize = 5;

/// Encodes `body` behind a magic + version header.
///
/// # Errors
///
/// Returns an error if `body` cannot be serialized.
pub fn encode_envelope<T: Serialize>(magic: [u8; 4], version: u8, body: &T) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(&magic);
    buf.push(version);
    ciborium::ser::into_writer(body, &mut buf)
        .map_err(|e| CodecError::encoding_failed(format!("{e:?}")))?;
    Ok(buf)
}

/// Decodes an envelope written by [`encode_envelope`].
///
/// # Errors
///
/// Returns an error if the header is missing or wrong, or if the body does
/// not decode as `T`.
pub fn decode_envelope<T: DeserializeOwned>(
    magic: [u8; 4],
    version: u8,
    data: &[u8],
) -> CodecResult<T> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::UnexpectedEof);
    }

    let mut found = [0u8; 4];
    found.copy_from_slice(&data[0..4]);
    if found != magic {
        return Err(CodecError::BadMagic {
            expected: magic,
            found,
        });
    }

    if data[4] != version {
        return Err(CodecError::UnsupportedVersion { version: data[4] });
    }

    ciborium::de::from_reader(&data[HEADER_LEN..])
        .map_err(|e| CodecError::decoding_failed(format!("{e:?}")))
}

/// Serializes a value into a structured [`Payload`].
///
/// # Errors
///
/// Returns an error if the value cannot be represented in CBOR.
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> CodecResult<Payload> {
    Payload::serialized(value).map_err(|e| CodecError::encoding_failed(format!("{e:?}")))
}

/// Deserializes a value from a structured [`Payload`].
///
/// # Errors
///
/// Returns an error if the payload does not match the shape of `T`.
pub fn from_payload<T: DeserializeOwned>(payload: &Payload) -> CodecResult<T> {
    payload
        .deserialized()
        .map_err(|e| CodecError::decoding_failed(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;
    use serde::Deserialize;

    const MAGIC: [u8; 4] = *b"TEST";

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        tags: Vec<FieldValue>,
    }

    fn sample() -> Sample {
        Sample {
            name: "Alice".into(),
            tags: vec![FieldValue::from("Paris"), FieldValue::from(30)],
        }
    }

    #[test]
    fn envelope_roundtrip() {
        let bytes = encode_envelope(MAGIC, 1, &sample()).unwrap();
        assert_eq!(&bytes[0..4], b"TEST");
        assert_eq!(bytes[4], 1);

        let decoded: Sample = decode_envelope(MAGIC, 1, &bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn wrong_magic_rejected() {
        let bytes = encode_envelope(MAGIC, 1, &sample()).unwrap();
        let err = decode_envelope::<Sample>(*b"NOPE", 1, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::BadMagic { .. }));
    }

    #[test]
    fn wrong_version_rejected() {
        let bytes = encode_envelope(MAGIC, 2, &sample()).unwrap();
        let err = decode_envelope::<Sample>(MAGIC, 1, &bytes).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedVersion { version: 2 });
    }

    #[test]
    fn truncated_header_rejected() {
        let err = decode_envelope::<Sample>(MAGIC, 1, b"TES").unwrap_err();
        assert_eq!(err, CodecError::UnexpectedEof);
    }

    #[test]
    fn truncated_body_rejected() {
        let bytes = encode_envelope(MAGIC, 1, &sample()).unwrap();
        let cut = &bytes[..bytes.len() - 3];
        assert!(decode_envelope::<Sample>(MAGIC, 1, cut).is_err());
    }

    #[test]
    fn garbage_body_rejected() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(1);
        bytes.extend_from_slice(&[0xff, 0x00, 0x13]);
        assert!(decode_envelope::<Sample>(MAGIC, 1, &bytes).is_err());
    }

    #[test]
    fn payload_preserves_structure() {
        let payload = to_payload(&sample()).unwrap();
        assert!(matches!(payload, Payload::Map(_)));

        let back: Sample = from_payload(&payload).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn payload_shape_mismatch() {
        let payload = to_payload(&42u32).unwrap();
        assert!(from_payload::<Sample>(&payload).is_err());
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_body_never_panics(body in proptest::collection::vec(proptest::num::u8::ANY, 0..256)) {
            let mut bytes = MAGIC.to_vec();
            bytes.push(1);
            bytes.extend_from_slice(&body);
            let _ = decode_envelope::<Sample>(MAGIC, 1, &bytes);
        }

        #[test]
        fn text_values_survive_the_envelope(name in ".{0,40}", n in proptest::num::i64::ANY) {
            let value = Sample { name, tags: vec![FieldValue::Integer(n)] };
            let bytes = encode_envelope(MAGIC, 1, &value).unwrap();
            proptest::prop_assert_eq!(decode_envelope::<Sample>(MAGIC, 1, &bytes).unwrap(), value);
        }
    }
}
