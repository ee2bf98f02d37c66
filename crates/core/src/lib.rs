//! `vizprops-core` — value model for declarative plot properties.
//!
//! This crate contains the **pure data** side of the property layer: dynamic
//! values, array-like types, owner identity and the error model. Validation and
//! comparison live in `vizprops-properties`.

pub mod array;
pub mod column;
pub mod error;
pub mod id;
pub mod owner;
pub mod value;

pub use array::{ArrayComparison, ArrayData, DType, NdArray};
pub use column::{Column, RowIndex, Table};
pub use error::{PropertyError, PropertyResult};
pub use id::OwnerId;
pub use owner::{HasProps, Model};
pub use value::{Value, ValueKind, ValueMap};
