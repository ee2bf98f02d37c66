//! Property: a validated, comparable slot on a model object.

use std::sync::Arc;

use vizprops_core::{HasProps, PropertyResult, Value};

use crate::assertion::{Assertion, Message, Predicate};
use crate::check::{TypeCheck, Validate};
use crate::matcher;
use crate::validation::ValidationContext;

type ConvertFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Alternate accepted type plus the conversion into the property's own type.
#[derive(Clone)]
struct Alternative {
    check: Arc<dyn Validate>,
    convert: Arc<ConvertFn>,
}

/// Outcome of [`Property::assign`].
#[derive(Debug, Clone)]
pub enum Change {
    /// The prepared value matches the old one; nothing to notify.
    Unchanged,
    Changed(Value),
}

impl Change {
    pub fn is_changed(&self) -> bool {
        matches!(self, Change::Changed(_))
    }
}

/// Base property.
///
/// Holds a type validator, alternative accepted types and an ordered list of
/// assertions. Registration happens at model-definition time; afterwards the
/// property is only read.
#[derive(Clone)]
pub struct Property {
    validator: Arc<dyn Validate>,
    alternatives: Vec<Alternative>,
    assertions: Vec<Assertion>,
}

impl Property {
    /// A property accepting any value.
    pub fn new() -> Self {
        Self::of(TypeCheck::Any)
    }

    pub fn of(validator: impl Validate + 'static) -> Self {
        Self::with_validator(Arc::new(validator))
    }

    pub fn with_validator(validator: Arc<dyn Validate>) -> Self {
        Self {
            validator,
            alternatives: Vec::new(),
            assertions: Vec::new(),
        }
    }

    /// Register an assertion; evaluation follows registration order.
    pub fn asserts(
        &mut self,
        predicate: impl Into<Predicate>,
        message: impl Into<Message>,
    ) -> &mut Self {
        self.assertions.push(Assertion::new(predicate, message));
        self
    }

    /// Also accept values passing `check`, converted with `convert`.
    pub fn accepts<F>(&mut self, check: impl Validate + 'static, convert: F) -> &mut Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.alternatives.push(Alternative {
            check: Arc::new(check),
            convert: Arc::new(convert),
        });
        self
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    pub fn validate(&self, value: &Value, detail: bool) -> PropertyResult<()> {
        self.validator.validate(value, detail)
    }

    /// `validate` without details, as a yes/no answer.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value, false).is_ok()
    }

    pub fn matches(&self, new: &Value, old: &Value) -> bool {
        matcher::matches(new, old)
    }

    /// Check and convert a value about to be stored on `owner.name`.
    ///
    /// Uses the process-wide validation toggle.
    pub fn prepare_value(
        &self,
        owner: &dyn HasProps,
        name: &str,
        value: Value,
    ) -> PropertyResult<Value> {
        self.prepare_value_with(ValidationContext::current(), owner, name, value)
    }

    /// Like [`Property::prepare_value`] with an explicit context.
    ///
    /// A disabled context skips type validation only; assertions always run.
    pub fn prepare_value_with(
        &self,
        ctx: ValidationContext,
        owner: &dyn HasProps,
        name: &str,
        value: Value,
    ) -> PropertyResult<Value> {
        let value = if ctx.is_enabled() {
            self.validate_or_convert(name, value)?
        } else {
            value
        };

        for assertion in &self.assertions {
            assertion.check(owner, name, &value)?;
        }
        Ok(value)
    }

    fn validate_or_convert(&self, name: &str, value: Value) -> PropertyResult<Value> {
        let Err(err) = self.validate(&value, true) else {
            return Ok(value);
        };
        for alt in &self.alternatives {
            if alt.check.validate(&value, false).is_ok() {
                tracing::debug!(property = name, "converted value through alternative type");
                return Ok((alt.convert)(&value));
            }
        }
        Err(err)
    }

    /// Prepare `new` and compare it with the currently stored `old` value.
    pub fn assign(
        &self,
        owner: &dyn HasProps,
        name: &str,
        old: Option<&Value>,
        new: Value,
    ) -> PropertyResult<Change> {
        let prepared = self.prepare_value(owner, name, new)?;
        match old {
            Some(old) if self.matches(&prepared, old) => {
                tracing::debug!(owner = %owner.id(), property = name, "value unchanged");
                Ok(Change::Unchanged)
            }
            _ => {
                tracing::debug!(owner = %owner.id(), property = name, "value changed");
                Ok(Change::Changed(prepared))
            }
        }
    }
}

impl Default for Property {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Property {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Property")
            .field("alternatives", &self.alternatives.len())
            .field("assertions", &self.assertions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serial_test::serial;
    use vizprops_core::{Model, NdArray, PropertyError};

    use crate::validation::ValidationGuard;

    /// Records every `validate` call and accepts everything.
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl Validate for Arc<Recording> {
        fn validate(&self, value: &Value, detail: bool) -> PropertyResult<()> {
            self.calls.lock().unwrap().push((value.to_string(), detail));
            Ok(())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct BadValue(String);

    #[test]
    fn is_valid_suppresses_validation_detail() {
        let recording = Arc::new(Recording::default());
        let p = Property::of(recording.clone());

        assert!(p.is_valid(&Value::Null));
        let calls = recording.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("None".to_string(), false)]);
    }

    #[test]
    fn base_property_is_valid_for_null() {
        assert!(Property::new().is_valid(&Value::Null));
    }

    #[test]
    fn is_valid_is_false_on_type_mismatch() {
        let p = Property::of(TypeCheck::Int);
        assert!(p.is_valid(&Value::Int(1)));
        assert!(!p.is_valid(&Value::from("one")));
    }

    #[test]
    fn assert_bools() {
        let hp = Model::default();
        let mut p = Property::new();

        p.asserts(true, "true");
        let out = p.prepare_value(&hp, "foo", Value::Int(10)).unwrap();
        assert!(matches!(out, Value::Int(10)));

        p.asserts(false, "false");
        let err = p.prepare_value(&hp, "foo", Value::Int(10)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "false");
    }

    #[test]
    fn assert_functions() {
        let hp = Model::default();
        let hp_id = hp.id();
        let mut p = Property::new();

        p.asserts(Predicate::dynamic(|_, _| true), "true");
        p.asserts(Predicate::dynamic(move |obj, _| obj.id() == hp_id), "true");
        p.asserts(
            Predicate::dynamic(|_, value| matches!(value, Value::Int(10))),
            "true",
        );
        let out = p.prepare_value(&hp, "foo", Value::Int(10)).unwrap();
        assert!(matches!(out, Value::Int(10)));

        p.asserts(Predicate::dynamic(|_, _| false), "false");
        let err = p.prepare_value(&hp, "foo", Value::Int(10)).unwrap_err();
        assert_eq!(err.to_string(), "false");
    }

    #[test]
    fn predicates_see_the_exact_owner() {
        let hp = Model::default();
        let other = Model::default();
        let hp_id = hp.id();
        let mut p = Property::new();
        p.asserts(
            Predicate::dynamic(move |obj, _| obj.id() == hp_id),
            "wrong owner",
        );

        assert!(p.prepare_value(&hp, "foo", Value::Int(1)).is_ok());
        let err = p.prepare_value(&other, "foo", Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "wrong owner");
    }

    #[test]
    fn assert_msg_funcs_propagate_raised_error() {
        let hp = Model::default();
        let hp_id = hp.id();
        let mut p = Property::new();

        p.asserts(
            false,
            Message::dynamic(move |obj, name, value| {
                Err(BadValue(format!("bad {} {name} {value}", obj.id() == hp_id)).into())
            }),
        );

        let err = p.prepare_value(&hp, "foo", Value::Int(10)).unwrap_err();
        assert!(matches!(err, PropertyError::Raised(_)));
        let raised = err.downcast_ref::<BadValue>().unwrap();
        assert_eq!(raised.0, "bad true foo 10");
        assert_eq!(err.to_string(), "bad true foo 10");
    }

    #[test]
    fn first_failing_assertion_wins() {
        let hp = Model::default();
        let mut p = Property::new();
        p.asserts(true, "first")
            .asserts(false, "second")
            .asserts(false, "third");

        let err = p.prepare_value(&hp, "foo", Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "second");
        assert_eq!(p.assertions().len(), 3);
    }

    #[test]
    fn type_errors_carry_detail() {
        let hp = Model::default();
        let p = Property::of(TypeCheck::Int);
        let err = p
            .prepare_value_with(ValidationContext::enabled(), &hp, "foo", Value::from("x"))
            .unwrap_err();
        assert_eq!(err.to_string(), "expected a value of type Int, got x of type str");
    }

    #[test]
    fn disabled_context_skips_type_checks_but_not_assertions() {
        let hp = Model::default();
        let mut p = Property::of(TypeCheck::Int);
        let out = p
            .prepare_value_with(ValidationContext::disabled(), &hp, "foo", Value::from("x"))
            .unwrap();
        assert!(matches!(out, Value::Str(ref s) if s == "x"));

        p.asserts(false, "still checked");
        let err = p
            .prepare_value_with(ValidationContext::disabled(), &hp, "foo", Value::from("x"))
            .unwrap_err();
        assert_eq!(err.to_string(), "still checked");
    }

    #[test]
    #[serial]
    fn global_toggle_gates_type_checks() {
        let hp = Model::default();
        let p = Property::of(TypeCheck::Int);
        {
            let _guard = ValidationGuard::disable();
            assert!(p.prepare_value(&hp, "foo", Value::from("x")).is_ok());
        }
        assert!(p.prepare_value(&hp, "foo", Value::from("x")).is_err());
    }

    #[test]
    fn alternatives_convert_rejected_values() {
        let hp = Model::default();
        let mut p = Property::of(TypeCheck::seq(TypeCheck::Float));
        p.accepts(TypeCheck::Float, |v| Value::seq([v.clone()]));

        let out = p
            .prepare_value_with(ValidationContext::enabled(), &hp, "xs", Value::Float(2.5))
            .unwrap();
        assert!(matcher::matches(&out, &Value::seq([Value::Float(2.5)])));

        let err = p
            .prepare_value_with(ValidationContext::enabled(), &hp, "xs", Value::from("x"))
            .unwrap_err();
        assert!(err.to_string().starts_with("expected a value of type Seq(Float)"));
    }

    #[test]
    fn assign_detects_unchanged_values() {
        let hp = Model::default();
        let p = Property::new();
        let old = Value::Array(NdArray::arange(10));

        let change = p
            .assign(&hp, "data", Some(&old), Value::int_range(0, 10))
            .unwrap();
        assert!(!change.is_changed());

        let change = p
            .assign(&hp, "data", Some(&old), Value::Array(NdArray::arange(11)))
            .unwrap();
        assert!(change.is_changed());

        let change = p.assign(&hp, "data", None, Value::Null).unwrap();
        assert!(matches!(change, Change::Changed(Value::Null)));
    }

    #[test]
    fn assign_propagates_assertion_failures() {
        let hp = Model::default();
        let mut p = Property::new();
        p.asserts(Predicate::dynamic(|_, v| !v.is_null()), "must not be null");
        let err = p.assign(&hp, "data", None, Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "must not be null");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: passing assertions hand the value back untouched.
            #[test]
            fn passing_assertions_are_identity(
                n in any::<i64>(),
                s in "[a-z]{0,12}",
                len in 0usize..32
            ) {
                let hp = Model::default();
                let mut p = Property::new();
                p.asserts(true, "never")
                    .asserts(Predicate::dynamic(|_, _| true), "never");

                for value in [
                    Value::Int(n),
                    Value::Str(s.clone()),
                    Value::Array(NdArray::arange(len)),
                ] {
                    let out = p
                        .prepare_value_with(ValidationContext::enabled(), &hp, "foo", value.clone())
                        .unwrap();
                    prop_assert!(p.matches(&out, &value));
                }
            }
        }
    }
}
