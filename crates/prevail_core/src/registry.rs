//! Record type registry used to decode snapshots.

use crate::error::{CoreError, CoreResult};
use crate::record::{Entity, Record};
use crate::types::TypeIdentity;
use prevail_codec::{from_payload, Payload};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type DecodeFn = fn(&Payload) -> CoreResult<Arc<dyn Record>>;

fn decode_entity<T: Entity>(payload: &Payload) -> CoreResult<Arc<dyn Record>> {
    let value: T = from_payload(payload)?;
    Ok(Arc::new(value))
}

/// Maps type identities to decoders.
///
/// A snapshot stores each record as its identity plus a payload. To turn
/// the payload back into a live record, the identity must have been
/// registered before the database is opened.
#[derive(Clone, Default)]
pub struct Registry {
    decoders: HashMap<TypeIdentity, DecodeFn>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type. Registering twice is a no-op.
    pub fn register<T: Entity>(&mut self) {
        self.decoders.insert(T::identity(), decode_entity::<T>);
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decodes a payload as the record type registered for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecordType` if the identity was never registered,
    /// or a codec error if the payload does not match the type.
    pub fn decode(&self, identity: &TypeIdentity, payload: &Payload) -> CoreResult<Arc<dyn Record>> {
        let decode = self
            .decoders
            .get(identity)
            .ok_or_else(|| CoreError::unknown_record_type(identity))?;
        decode(payload)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identities: Vec<_> = self.decoders.keys().map(ToString::to_string).collect();
        identities.sort();
        f.debug_struct("Registry")
            .field("types", &identities)
            .finish()
    }
}
