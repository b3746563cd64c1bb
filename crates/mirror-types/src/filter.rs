//! Store filters

use crate::Document;
use serde_json::Value;

/// Selection predicate understood by every document store.
///
/// Equality is JSON equality with numbers compared by value (see
/// [`same_value`]): `1` matches `1.0` but never `"1"`, and a missing field
/// matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection
    All,
    /// `field == value`
    Eq { field: String, value: Value },
    /// `field` is one of `values`
    In { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => doc.get(field).is_some_and(|v| same_value(v, value)),
            Filter::In { field, values } => doc
                .get(field)
                .is_some_and(|v| values.iter().any(|candidate| same_value(v, candidate))),
        }
    }

    /// Field the filter inspects, `None` for [`Filter::All`]
    pub fn field(&self) -> Option<&str> {
        match self {
            Filter::All => None,
            Filter::Eq { field, .. } | Filter::In { field, .. } => Some(field.as_str()),
        }
    }
}

/// `a == b`, except that two numbers are equal when their values are, so
/// `1.0` and `1` compare equal the way SQLite compares them
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{POST_ID, USER_ID};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::try_from(value).unwrap()
    }

    #[test]
    fn test_eq_is_strict() {
        let post = doc(json!({"id": 1, "userId": 2}));
        assert!(Filter::eq(USER_ID, 2).matches(&post));
        assert!(!Filter::eq(USER_ID, "2").matches(&post));
        assert!(!Filter::eq("missing", 2).matches(&post));
    }

    #[test]
    fn test_in_set() {
        let comment = doc(json!({"id": 9, "postId": 4}));
        assert!(Filter::is_in(POST_ID, [1, 4, 7]).matches(&comment));
        assert!(!Filter::is_in(POST_ID, [1, 7]).matches(&comment));
        assert!(!Filter::is_in(POST_ID, Vec::<i64>::new()).matches(&comment));
    }

    #[test]
    fn test_integral_float_matches_integer() {
        let post = doc(json!({"id": 3, "userId": 1.0}));
        assert!(Filter::eq(USER_ID, 1).matches(&post));
        assert!(Filter::is_in(USER_ID, [4, 1]).matches(&post));
        assert!(!Filter::eq(USER_ID, 2).matches(&post));

        let comment = doc(json!({"postId": 3}));
        assert!(Filter::eq(POST_ID, 3.0).matches(&comment));
        assert!(!Filter::eq(POST_ID, 3.5).matches(&comment));
    }

    #[test]
    fn test_same_value() {
        assert!(same_value(&json!(1), &json!(1.0)));
        assert!(same_value(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!same_value(&json!(1), &json!(true)));
        assert!(!same_value(&json!("1"), &json!(1)));
        assert!(same_value(&json!({"a": 1}), &json!({"a": 1})));
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(Filter::All.matches(&Document::new()));
        assert_eq!(Filter::All.field(), None);
    }
}
