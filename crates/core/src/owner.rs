//! Owner abstraction: the object a property is attached to.

use crate::id::OwnerId;

/// An object carrying properties.
///
/// Assertion predicates and messages receive the owner opaquely; the property
/// layer never looks inside it.
pub trait HasProps {
    /// Stable identity of this owner.
    fn id(&self) -> OwnerId;

    /// Human-readable type name, used in messages.
    fn type_name(&self) -> &str;
}

/// Minimal concrete owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    id: OwnerId,
    type_name: String,
}

impl Model {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(),
            type_name: type_name.into(),
        }
    }

    pub fn with_id(id: OwnerId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new("Model")
    }
}

impl HasProps for Model {
    fn id(&self) -> OwnerId {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl core::fmt::Display for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(id={})", self.type_name, self.id)
    }
}
