//! Predicate constructors for [`Database::query`](crate::Database::query).
//!
//! A predicate is any `Fn(&dyn Record) -> bool`. These helpers build the
//! common ones from field names, so ad-hoc equality filters work across
//! record types without a dedicated index.

use crate::record::{Entity, Record};
use crate::types::TypeIdentity;
use prevail_codec::FieldValue;

/// Matches records whose `field` equals `value`.
///
/// Records without the field never match.
pub fn field_equals(
    field: impl Into<String>,
    value: impl Into<FieldValue>,
) -> impl Fn(&dyn Record) -> bool + Send + Sync {
    let field = field.into();
    let value = value.into();
    move |record| record.field(&field).is_some_and(|current| current == value)
}

/// Matches records of one type identity.
pub fn of_identity(identity: TypeIdentity) -> impl Fn(&dyn Record) -> bool + Send + Sync {
    move |record| record.type_identity() == identity
}

/// Matches records of entity type `T`.
pub fn of_type<T: Entity>() -> impl Fn(&dyn Record) -> bool + Send + Sync {
    |record| record.is::<T>()
}
