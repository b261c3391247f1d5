//! Record traits and schema descriptors.
//!
//! Application types opt in by implementing [`Entity`]: a type identity and
//! a static table of named field accessors. Every entity is usable as a
//! type-erased [`Record`], which is what the store, the indexes and the
//! query engine work with.

use crate::types::TypeIdentity;
use prevail_codec::{to_payload, CodecResult, FieldValue, Payload};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// A named field accessor for records of type `T`.
pub struct Field<T> {
    name: &'static str,
    read: fn(&T) -> FieldValue,
}

impl<T> Field<T> {
    /// Creates a field accessor.
    pub const fn new(name: &'static str, read: fn(&T) -> FieldValue) -> Self {
        Self { name, read }
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the field from a record.
    pub fn read(&self, record: &T) -> FieldValue {
        (self.read)(record)
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Trait for types that can be stored in a Prevail database.
///
/// Implementors provide:
/// - `NAMESPACE` and `NAME`: the record's [`TypeIdentity`]
/// - `FIELDS`: the schema descriptor used by indexes and field filters
/// - `serde` support, used to write snapshots
///
/// # Example
///
/// ```rust
/// use prevail_core::{Entity, Field, FieldValue};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Human {
///     name: String,
///     city: String,
///     age: u32,
/// }
///
/// impl Entity for Human {
///     const NAMESPACE: &'static str = "people";
///     const NAME: &'static str = "Human";
///     const FIELDS: &'static [Field<Self>] = &[
///         Field::new("name", |h: &Human| FieldValue::from(&h.name)),
///         Field::new("city", |h: &Human| FieldValue::from(&h.city)),
///         Field::new("age", |h: &Human| FieldValue::from(h.age)),
///     ];
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    /// Namespace half of the type identity.
    const NAMESPACE: &'static str;

    /// Name half of the type identity.
    const NAME: &'static str;

    /// Readable fields, looked up by name.
    const FIELDS: &'static [Field<Self>];

    /// Returns the type identity.
    fn identity() -> TypeIdentity {
        TypeIdentity::new(Self::NAMESPACE, Self::NAME)
    }

    /// Looks up a field accessor by name.
    fn field_accessor(name: &str) -> Option<&'static Field<Self>> {
        Self::FIELDS.iter().find(|field| field.name == name)
    }
}

/// A type-erased stored record.
///
/// This is the capability the store needs from any record: its identity,
/// named field access, payload encoding, and downcasting back to the
/// concrete type. It is implemented for every [`Entity`].
pub trait Record: Any + Send + Sync + fmt::Debug {
    /// Returns the record's type identity.
    fn type_identity(&self) -> TypeIdentity;

    /// Reads a field by name; `None` if the schema has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Serializes the record for a snapshot.
    fn to_payload(&self) -> CodecResult<Payload>;

    /// Returns the record as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Entity> Record for T {
    fn type_identity(&self) -> TypeIdentity {
        T::identity()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        T::field_accessor(name).map(|field| field.read(self))
    }

    fn to_payload(&self) -> CodecResult<Payload> {
        to_payload(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Record {
    /// Returns true if the record is a `T`.
    #[must_use]
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts the record to a concrete entity type.
    #[must_use]
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Dog {
        name: String,
        breed: String,
    }

    impl Entity for Dog {
        const NAMESPACE: &'static str = "animals";
        const NAME: &'static str = "Dog";
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("name", |d: &Dog| FieldValue::from(&d.name)),
            Field::new("breed", |d: &Dog| FieldValue::from(&d.breed)),
        ];
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Cat {
        name: String,
    }

    impl Entity for Cat {
        const NAMESPACE: &'static str = "animals";
        const NAME: &'static str = "Cat";
        const FIELDS: &'static [Field<Self>] =
            &[Field::new("name", |c: &Cat| FieldValue::from(&c.name))];
    }

    fn buddy() -> Dog {
        Dog {
            name: "Buddy".into(),
            breed: "Labrador".into(),
        }
    }

    #[test]
    fn identity_from_constants() {
        assert_eq!(Dog::identity(), TypeIdentity::new("animals", "Dog"));
        assert_eq!(TypeIdentity::of::<Cat>(), TypeIdentity::new("animals", "Cat"));
    }

    #[test]
    fn field_lookup_by_name() {
        let dog = buddy();
        let record: &dyn Record = &dog;

        assert_eq!(record.field("breed"), Some(FieldValue::from("Labrador")));
        assert_eq!(record.field("color"), None);
        assert_eq!(Dog::field_accessor("name").map(Field::name), Some("name"));
    }

    #[test]
    fn downcast_to_concrete_type() {
        let dog = buddy();
        let record: &dyn Record = &dog;

        assert!(record.is::<Dog>());
        assert!(!record.is::<Cat>());
        assert_eq!(record.downcast_ref::<Dog>(), Some(&dog));
        assert!(record.downcast_ref::<Cat>().is_none());
    }

    #[test]
    fn payload_roundtrip() {
        let dog = buddy();
        let payload = (&dog as &dyn Record).to_payload().unwrap();
        let back: Dog = prevail_codec::from_payload(&payload).unwrap();
        assert_eq!(back, dog);
    }
}
