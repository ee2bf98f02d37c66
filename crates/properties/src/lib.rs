//! `vizprops-properties` — property descriptors for declarative plot models.
//!
//! A [`Property`] validates values before they are stored on a model object
//! (type checks plus registered [`Assertion`]s) and decides, through
//! [`matches`], whether a new value differs from the old one.

pub mod assertion;
pub mod check;
pub mod matcher;
pub mod property;
pub mod validation;

pub use assertion::{Assertion, Message, Predicate};
pub use check::{TypeCheck, Validate};
pub use matcher::matches;
pub use property::{Change, Property};
pub use validation::{
    VALIDATION_ENV, ValidationContext, ValidationGuard, set_validation, validation_on,
    without_property_validation,
};

pub use vizprops_core::{HasProps, Model, PropertyError, PropertyResult, Value};
