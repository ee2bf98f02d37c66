//! Value matching for change detection.
//!
//! `matches` answers "is the new value equivalent to the old one?" so a
//! property can skip notifying listeners. It never fails: anything that cannot
//! be compared is a non-match.

use vizprops_core::{ArrayComparison, Value};

/// Whether `new` and `old` are equivalent property values.
///
/// - The same instance always matches.
/// - If either side is array-like, both are coerced to arrays and compared
///   element-wise; plain sequences of equal shape and contents match arrays.
/// - Mappings match when their key sets are equal and every value matches
///   recursively.
/// - Everything else uses plain equality, where an array nested in a sequence
///   makes the answer ambiguous and therefore a non-match.
pub fn matches(new: &Value, old: &Value) -> bool {
    if new.same_instance(old) {
        return true;
    }

    if new.is_array_like() || old.is_array_like() {
        return arrays_match(new, old);
    }

    match (new, old) {
        (Value::Map(a), Value::Map(b)) => {
            // Mapping values frequently hold arrays (column data), so recurse
            // instead of using plain equality.
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| matches(value, other)))
        }
        _ => plain_eq(new, old).unwrap_or(false),
    }
}

fn arrays_match(new: &Value, old: &Value) -> bool {
    // Shapes first: a range index can describe more labels than fit in memory.
    match (new.array_shape(), old.array_shape()) {
        (Some(a), Some(b)) if a == b => {}
        _ => return false,
    }
    let ranges = match (new, old) {
        (Value::Index(a), Value::Index(b)) => a.range_eq(b),
        _ => None,
    };
    if let Some(equal) = ranges {
        return equal;
    }

    let (Some(a), Some(b)) = (new.to_array(), old.to_array()) else {
        return false;
    };
    match a.compare(&b) {
        ArrayComparison::Equal => true,
        ArrayComparison::NotEqual => false,
        ArrayComparison::Incompatible => {
            tracing::warn!(
                left = %a.dtype(),
                right = %b.dtype(),
                "elementwise comparison of numeric and string arrays, treating as no match"
            );
            false
        }
    }
}

/// Plain structural equality.
///
/// Booleans, ints and floats compare as numbers (`true == 1 == 1.0`), the same
/// way array elements do. `None` when an array-like value is reached, since
/// element-wise array equality has no single truth value.
fn plain_eq(a: &Value, b: &Value) -> Option<bool> {
    if a.same_instance(b) {
        return Some(true);
    }
    match (a, b) {
        (Value::Null, Value::Null) => Some(true),
        (
            Value::Bool(_) | Value::Int(_) | Value::Float(_),
            Value::Bool(_) | Value::Int(_) | Value::Float(_),
        ) => a.numeric_eq(b),
        (Value::Str(x), Value::Str(y)) => Some(x == y),
        (Value::Seq(x), Value::Seq(y)) | (Value::Tuple(x), Value::Tuple(y)) => {
            if x.len() != y.len() {
                return Some(false);
            }
            for (left, right) in x.iter().zip(y.iter()) {
                if !plain_eq(left, right)? {
                    return Some(false);
                }
            }
            Some(true)
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.len() != y.len() {
                return Some(false);
            }
            for (key, left) in x {
                let Some(right) = y.get(key) else {
                    return Some(false);
                };
                if !plain_eq(left, right)? {
                    return Some(false);
                }
            }
            Some(true)
        }
        _ if a.is_array_like() || b.is_array_like() => None,
        _ => Some(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizprops_core::{NdArray, RowIndex, Table};

    fn arange(n: usize) -> Value {
        Value::Array(NdArray::arange(n))
    }

    fn basic_values() -> Vec<Value> {
        vec![
            Value::Int(1),
            Value::Float(1.2),
            Value::from("a"),
            arange(4),
            Value::Null,
            Value::Bool(false),
            Value::Bool(true),
            Value::map(Vec::<(String, Value)>::new()),
            Value::seq([]),
        ]
    }

    #[test]
    fn basic_types_match_themselves_and_not_junk() {
        let junk = Value::from("junk");
        for x in basic_values() {
            assert!(matches(&x, &x), "{x} should match itself");
            assert!(matches(&x, &x.clone()), "{x} should match its clone");
            assert!(!matches(&x, &junk), "{x} should not match junk");
        }
    }

    #[test]
    fn ints_and_floats_compare_numerically() {
        assert!(matches(&Value::Int(1), &Value::Float(1.0)));
        assert!(matches(&Value::Int(1), &Value::Bool(true)));
        assert!(matches(&Value::Bool(false), &Value::Float(0.0)));
        assert!(!matches(&Value::Int(2), &Value::Bool(true)));
        assert!(!matches(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    }

    #[test]
    fn large_ints_are_not_rounded_through_floats() {
        let big = Value::Int(9_007_199_254_740_993);
        let rounded = Value::Float(9_007_199_254_740_992.0);
        assert!(!matches(&big, &rounded));
        assert!(!matches(&rounded, &big));
        assert!(matches(&Value::Int(9_007_199_254_740_992), &rounded));
        assert!(!matches(&Value::Int(i64::MAX), &Value::Float(9_223_372_036_854_775_808.0)));

        let in_array = Value::Array(NdArray::from_ints([9_007_199_254_740_993]));
        assert!(!matches(&in_array, &Value::seq([rounded])));
    }

    #[test]
    fn booleans_match_the_same_way_as_scalars_and_arrays() {
        let zero_d = Value::Array(NdArray::scalar_int(1));
        assert!(matches(&Value::Bool(true), &zero_d));
        assert!(matches(&Value::Bool(true), &Value::Int(1)));
        assert!(matches(
            &Value::seq([Value::Bool(true), Value::Bool(false)]),
            &Value::seq([Value::Int(1), Value::Int(0)])
        ));
        assert!(matches(
            &Value::Array(NdArray::from_bools([true, false])),
            &Value::seq([Value::Int(1), Value::Int(0)])
        ));
    }

    #[test]
    fn extreme_indexes_compare_without_overflow() {
        let extreme = Value::Index(RowIndex::stepped(i64::MIN, i64::MAX, i64::MAX).unwrap());
        assert!(!matches(&extreme, &Value::Int(1)));
        assert!(!matches(&Value::Int(1), &extreme));
        assert!(matches(
            &extreme,
            &Value::seq([Value::Int(i64::MIN), Value::Int(-1), Value::Int(i64::MAX - 1)])
        ));

        let huge = Value::Index(RowIndex::stepped(0, i64::MAX, 1).unwrap());
        assert!(!matches(&huge, &Value::Int(10)));
        assert!(!matches(&huge, &Value::int_range(0, 10)));
        assert!(matches(&huge, &Value::Index(RowIndex::stepped(0, i64::MAX, 1).unwrap())));
        assert!(!matches(&huge, &Value::Index(RowIndex::stepped(1, i64::MAX, 1).unwrap())));
    }

    #[test]
    fn compatible_arrays() {
        let a = arange(5);
        let b = arange(5);
        assert!(matches(&a, &b));

        let b_plus_one = Value::Array(NdArray::arange(5).add_scalar(1).unwrap());
        assert!(!matches(&a, &b_plus_one));

        for x in [
            Value::Int(1),
            Value::Float(1.2),
            Value::from("a"),
            arange(4),
            Value::Null,
            Value::Bool(false),
        ] {
            assert!(!matches(&a, &x), "array should not match {x}");
            assert!(!matches(&x, &b), "{x} should not match array");
        }
    }

    #[test]
    fn incompatible_arrays_do_not_match() {
        let a = NdArray::arange(5);
        let b = a.astype_str();
        assert!(!matches(&Value::Array(a), &Value::Array(b)));
    }

    #[test]
    fn dicts_with_array_values() {
        let d1 = Value::map([("foo", arange(10))]);
        let d2 = Value::map([("foo", arange(10))]);

        assert!(matches(&d1, &d1));
        assert!(matches(&d1, &d2));
        assert!(matches(&d1, &Value::map([("foo", Value::int_range(0, 10))])));

        assert!(!matches(&d1, &Value::map([("foo", arange(11))])));
        assert!(!matches(&d1, &Value::map([("bar", arange(10))])));
        assert!(!matches(&d1, &Value::map([("bar", Value::Int(10))])));
    }

    #[test]
    fn non_dict_containers_with_arrays_only_match_by_identity() {
        let l1 = Value::seq([arange(10)]);
        let l2 = Value::seq([arange(10)]);
        assert!(matches(&l1, &l1));
        assert!(matches(&l1, &l1.clone()));
        assert!(!matches(&l1, &l2));

        let t1 = Value::tuple([arange(10)]);
        let t2 = Value::tuple([arange(10)]);
        assert!(matches(&t1, &t1));
        assert!(!matches(&t1, &t2));
    }

    #[test]
    fn plain_sequences_compare_by_value() {
        let a = Value::seq([Value::Int(1), Value::from("x")]);
        let b = Value::seq([Value::Float(1.0), Value::from("x")]);
        assert!(matches(&a, &b));
        assert!(!matches(&a, &Value::tuple([Value::Int(1), Value::from("x")])));
        assert!(!matches(&a, &Value::seq([Value::Int(1)])));
    }

    #[test]
    fn column_values() {
        let t1 = Table::from_columns([("foo", NdArray::arange(10))]).unwrap();
        let t2 = Table::from_columns([("foo", NdArray::arange(10))]).unwrap();
        let foo1 = Value::Column(t1.column("foo").unwrap());
        let foo2 = Value::Column(t2.column("foo").unwrap());

        assert!(matches(&foo1, &foo1));
        assert!(matches(&foo1, &foo2));
        assert!(matches(&foo1, &Value::int_range(0, 10)));

        assert!(!matches(&foo1, &arange(11)));
        assert!(!matches(
            &foo1,
            &Value::Array(NdArray::arange(10).add_scalar(1).unwrap())
        ));
        assert!(!matches(&foo1, &Value::Int(10)));
    }

    #[test]
    fn index_values() {
        let t1 = Table::from_columns([("foo", NdArray::arange(10))]).unwrap();
        let t2 = Table::from_columns([("foo", NdArray::arange(10))]).unwrap();
        let i1 = Value::Index(t1.index().clone());
        let i2 = Value::Index(t2.index().clone());

        assert!(matches(&i1, &i1));
        assert!(matches(&i1, &i2));
        assert!(matches(&i1, &Value::int_range(0, 10)));
        assert!(matches(&i1, &Value::Index(RowIndex::labels(NdArray::arange(10)).unwrap())));

        assert!(!matches(&i1, &arange(11)));
        assert!(!matches(
            &i1,
            &Value::Array(NdArray::arange(10).add_scalar(1).unwrap())
        ));
        assert!(!matches(&i1, &Value::Int(10)));
    }

    #[test]
    fn nested_dicts_recurse() {
        let a = Value::map([("outer", Value::map([("inner", arange(3))]))]);
        let b = Value::map([("outer", Value::map([("inner", Value::int_range(0, 3))]))]);
        assert!(matches(&a, &b));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn scalar() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::Int),
                (-1.0e6f64..1.0e6).prop_map(Value::Float),
                "[a-z]{0,8}".prop_map(Value::Str),
                prop::collection::vec(any::<i64>(), 0..8)
                    .prop_map(|v| Value::Array(NdArray::from_ints(v))),
            ]
        }

        fn value() -> impl Strategy<Value = Value> {
            scalar().prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(|v| Value::seq(v)),
                    prop::collection::vec(inner.clone(), 0..4).prop_map(|v| Value::tuple(v)),
                    prop::collection::vec(("[a-c]", inner), 0..4).prop_map(|v| Value::map(v)),
                ]
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: every value matches itself and its clones.
            #[test]
            fn matches_is_reflexive(v in value()) {
                prop_assert!(matches(&v, &v));
                prop_assert!(matches(&v, &v.clone()));
            }

            /// Property: argument order does not change the answer.
            #[test]
            fn matches_is_symmetric(a in value(), b in value()) {
                prop_assert_eq!(matches(&a, &b), matches(&b, &a));
            }
        }
    }
}
