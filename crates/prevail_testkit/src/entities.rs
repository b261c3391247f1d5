//! Sample entity types used across tests and benchmarks.

use prevail_core::{Config, Entity, Field, FieldValue};
use serde::{Deserialize, Serialize};

/// A person with a home city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Human {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years.
    pub age: u32,
    /// Home city.
    pub city: String,
}

impl Human {
    /// Creates a human.
    pub fn new(first_name: &str, last_name: &str, age: u32, city: &str) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
            city: city.into(),
        }
    }
}

impl Entity for Human {
    const NAMESPACE: &'static str = "people";
    const NAME: &'static str = "Human";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("FirstName", |h: &Human| FieldValue::from(&h.first_name)),
        Field::new("LastName", |h: &Human| FieldValue::from(&h.last_name)),
        Field::new("Age", |h: &Human| FieldValue::from(h.age)),
        Field::new("City", |h: &Human| FieldValue::from(&h.city)),
    ];
}

/// An application account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Contact address, if known.
    pub email: Option<String>,
}

impl User {
    /// Creates a user without an email address.
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            email: None,
        }
    }
}

impl Entity for User {
    const NAMESPACE: &'static str = "accounts";
    const NAME: &'static str = "User";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("Name", |u: &User| FieldValue::from(&u.name)),
        Field::new("Age", |u: &User| FieldValue::from(u.age)),
        Field::new("Email", |u: &User| FieldValue::from(u.email.clone())),
    ];
}

/// A dog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    /// Name.
    pub name: String,
    /// Breed.
    pub breed: String,
}

impl Entity for Dog {
    const NAMESPACE: &'static str = "animals";
    const NAME: &'static str = "Dog";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("Name", |d: &Dog| FieldValue::from(&d.name)),
        Field::new("Breed", |d: &Dog| FieldValue::from(&d.breed)),
    ];
}

/// A cat. Shares field names with [`Dog`] but not its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    /// Name.
    pub name: String,
    /// Whether the cat goes outside.
    pub outdoor: bool,
}

impl Entity for Cat {
    const NAMESPACE: &'static str = "animals";
    const NAME: &'static str = "Cat";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("Name", |c: &Cat| FieldValue::from(&c.name)),
        Field::new("Outdoor", |c: &Cat| FieldValue::from(c.outdoor)),
    ];
}

/// A configuration with every sample type registered and no fsync.
#[must_use]
pub fn sample_config() -> Config {
    Config::new()
        .register::<Human>()
        .register::<User>()
        .register::<Dog>()
        .register::<Cat>()
        .sync_on_save(false)
}
