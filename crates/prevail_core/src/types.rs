//! Core type definitions for Prevail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the shape of a record: a `(namespace, name)` pair.
///
/// Records with equal identities are assumed to expose the same fields,
/// so an index created for an identity applies to all of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeIdentity {
    namespace: String,
    name: String,
}

impl TypeIdentity {
    /// Creates a new type identity.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns the identity of an entity type.
    #[must_use]
    pub fn of<T: crate::record::Entity>() -> Self {
        T::identity()
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.namespace, self.name)
        }
    }
}

/// Names one secondary index: a field of one record type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Record type the index covers.
    pub identity: TypeIdentity,
    /// Indexed field name.
    pub field: String,
}

impl IndexDefinition {
    /// Creates a new index definition.
    #[must_use]
    pub fn new(identity: TypeIdentity, field: impl Into<String>) -> Self {
        Self {
            identity,
            field: field.into(),
        }
    }
}

impl fmt::Display for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.identity, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_display() {
        assert_eq!(TypeIdentity::new("people", "Human").to_string(), "people::Human");
        assert_eq!(TypeIdentity::new("", "Human").to_string(), "Human");
    }

    #[test]
    fn identity_equality_needs_both_parts() {
        let a = TypeIdentity::new("zoo", "Cat");
        let b = TypeIdentity::new("pets", "Cat");
        assert_ne!(a, b);
        assert_eq!(a, TypeIdentity::new("zoo", "Cat"));
    }

    #[test]
    fn definition_display() {
        let def = IndexDefinition::new(TypeIdentity::new("people", "Human"), "city");
        assert_eq!(def.to_string(), "people::Human.city");
    }
}
