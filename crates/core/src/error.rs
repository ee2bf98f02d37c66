//! Property error model.

use thiserror::Error;

/// Result type used across the property layer.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Property-level error.
///
/// Comparison never fails with one of these: `matches` answers `false` instead.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// A value was rejected by a type check or an assertion.
    ///
    /// Displays as the bare message so callers see exactly what the assertion
    /// registered.
    #[error("{0}")]
    Validation(String),

    /// An error raised while computing an assertion message.
    ///
    /// Passed through untouched; use [`PropertyError::downcast_ref`] to recover
    /// the original error.
    #[error(transparent)]
    Raised(#[from] anyhow::Error),

    /// An array or column was built with inconsistent dimensions.
    #[error("shape mismatch: {0}")]
    Shape(String),
}

impl PropertyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Borrow the original error of a [`PropertyError::Raised`].
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: core::fmt::Display + core::fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Raised(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
