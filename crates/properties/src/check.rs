//! Type validation for property values.

use vizprops_core::{DType, PropertyError, PropertyResult, Value};

/// A type check run before a value is stored.
///
/// `detail` asks for a descriptive message. Callers that only need a yes/no
/// answer pass `false`, and implementations may then skip building one.
pub trait Validate: Send + Sync {
    fn validate(&self, value: &Value, detail: bool) -> PropertyResult<()>;
}

/// Built-in structural type checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCheck {
    Any,
    Bool,
    /// Integers only; booleans are rejected.
    Int,
    /// Floats and integers.
    Float,
    String,
    /// Arrays, columns and row indexes.
    Array,
    /// Lists or tuples of the inner type, or arrays with a fitting dtype.
    Seq(Box<TypeCheck>),
    /// Mappings whose values are all of the inner type.
    Map(Box<TypeCheck>),
    /// `Null` or the inner type.
    Nullable(Box<TypeCheck>),
}

impl TypeCheck {
    pub fn seq(inner: TypeCheck) -> Self {
        TypeCheck::Seq(Box::new(inner))
    }

    pub fn map(inner: TypeCheck) -> Self {
        TypeCheck::Map(Box::new(inner))
    }

    pub fn nullable(inner: TypeCheck) -> Self {
        TypeCheck::Nullable(Box::new(inner))
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            TypeCheck::Any => true,
            TypeCheck::Bool => matches!(value, Value::Bool(_)),
            TypeCheck::Int => matches!(value, Value::Int(_)),
            TypeCheck::Float => matches!(value, Value::Int(_) | Value::Float(_)),
            TypeCheck::String => matches!(value, Value::Str(_)),
            TypeCheck::Array => value.is_array_like(),
            TypeCheck::Seq(inner) => match value {
                Value::Seq(items) | Value::Tuple(items) => items.iter().all(|v| inner.accepts(v)),
                _ if value.is_array_like() => value
                    .to_array()
                    .is_some_and(|a| inner.accepts_dtype(a.dtype())),
                _ => false,
            },
            TypeCheck::Map(inner) => value
                .as_map()
                .is_some_and(|m| m.values().all(|v| inner.accepts(v))),
            TypeCheck::Nullable(inner) => value.is_null() || inner.accepts(value),
        }
    }

    fn accepts_dtype(&self, dtype: DType) -> bool {
        match self {
            TypeCheck::Any => true,
            TypeCheck::Bool => dtype == DType::Bool,
            TypeCheck::Int => dtype == DType::Int,
            TypeCheck::Float => matches!(dtype, DType::Int | DType::Float),
            TypeCheck::String => dtype == DType::Str,
            TypeCheck::Nullable(inner) => inner.accepts_dtype(dtype),
            _ => false,
        }
    }
}

impl core::fmt::Display for TypeCheck {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TypeCheck::Any => f.write_str("Any"),
            TypeCheck::Bool => f.write_str("Bool"),
            TypeCheck::Int => f.write_str("Int"),
            TypeCheck::Float => f.write_str("Float"),
            TypeCheck::String => f.write_str("String"),
            TypeCheck::Array => f.write_str("Array"),
            TypeCheck::Seq(inner) => write!(f, "Seq({inner})"),
            TypeCheck::Map(inner) => write!(f, "Map(String, {inner})"),
            TypeCheck::Nullable(inner) => write!(f, "Nullable({inner})"),
        }
    }
}

impl Validate for TypeCheck {
    fn validate(&self, value: &Value, detail: bool) -> PropertyResult<()> {
        if self.accepts(value) {
            return Ok(());
        }
        let msg = if detail {
            format!(
                "expected a value of type {self}, got {value} of type {}",
                value.kind()
            )
        } else {
            String::new()
        };
        Err(PropertyError::Validation(msg))
    }
}
