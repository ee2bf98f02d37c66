//! Assertions: ordered `(predicate, message)` rules attached to a property.

use std::sync::Arc;

use vizprops_core::{HasProps, PropertyError, PropertyResult, Value};

type PredicateFn = dyn Fn(&dyn HasProps, &Value) -> bool + Send + Sync;
type MessageFn = dyn Fn(&dyn HasProps, &str, &Value) -> anyhow::Result<String> + Send + Sync;

/// Condition an assigned value must satisfy.
#[derive(Clone)]
pub enum Predicate {
    /// Fixed outcome, independent of owner and value.
    Constant(bool),
    /// Computed from the owner and the value being assigned.
    Dynamic(Arc<PredicateFn>),
}

impl Predicate {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&dyn HasProps, &Value) -> bool + Send + Sync + 'static,
    {
        Predicate::Dynamic(Arc::new(f))
    }

    pub fn evaluate(&self, owner: &dyn HasProps, value: &Value) -> bool {
        match self {
            Predicate::Constant(result) => *result,
            Predicate::Dynamic(f) => f(owner, value),
        }
    }
}

impl From<bool> for Predicate {
    fn from(value: bool) -> Self {
        Predicate::Constant(value)
    }
}

impl core::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Predicate::Constant(result) => f.debug_tuple("Constant").field(result).finish(),
            Predicate::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// What to report when a predicate fails.
#[derive(Clone)]
pub enum Message {
    Literal(String),
    /// Computed from the owner, property name and value.
    ///
    /// An `Err` returned here is reported as-is instead of a validation
    /// failure.
    Dynamic(Arc<MessageFn>),
}

impl Message {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&dyn HasProps, &str, &Value) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Message::Dynamic(Arc::new(f))
    }

    /// Produce the failure for a rejected value.
    pub fn to_error(&self, owner: &dyn HasProps, name: &str, value: &Value) -> PropertyError {
        match self {
            Message::Literal(text) => PropertyError::validation(text.clone()),
            Message::Dynamic(f) => match f(owner, name, value) {
                Ok(text) => PropertyError::validation(text),
                Err(err) => PropertyError::Raised(err),
            },
        }
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Message::Literal(value.to_string())
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::Literal(value)
    }
}

impl core::fmt::Debug for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Message::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Message::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// One registered rule.
#[derive(Debug, Clone)]
pub struct Assertion {
    predicate: Predicate,
    message: Message,
}

impl Assertion {
    pub fn new(predicate: impl Into<Predicate>, message: impl Into<Message>) -> Self {
        Self {
            predicate: predicate.into(),
            message: message.into(),
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn check(&self, owner: &dyn HasProps, name: &str, value: &Value) -> PropertyResult<()> {
        if self.predicate.evaluate(owner, value) {
            Ok(())
        } else {
            Err(self.message.to_error(owner, name, value))
        }
    }
}
