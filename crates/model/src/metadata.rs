//! Combinable metadata attached to group mappings and propagated through
//! user de-duplication when a user is reachable from more than one
//! contributing source group.

/// A value that can be merged with another instance of itself.
///
/// Implementations should make `combine` associative: the engine may fold
/// contributions from an arbitrary number of source groups in any order.
/// Commutativity is not required.
pub trait Combine: Sized {
    /// Merges `other` into `self`, returning the combined value.
    fn combine(self, other: Self) -> Self;
}

/// Default combinable metadata: a JSON value merged right-biased on object
/// keys and concatenated on arrays.
///
/// This is the metadata type `groupsync-config` produces from parsed
/// mapping entries; callers needing a different merge policy can implement
/// [`Combine`] on their own type instead.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JsonMetadata(pub serde_json::Value);

impl JsonMetadata {
    /// Wraps a JSON value as metadata.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl Combine for JsonMetadata {
    fn combine(self, other: Self) -> Self {
        use serde_json::Value;

        fn merge(a: Value, b: Value) -> Value {
            match (a, b) {
                (Value::Null, b) => b,
                (a, Value::Null) => a,
                (Value::Object(mut a), Value::Object(b)) => {
                    for (k, v) in b {
                        a.entry(k)
                            .and_modify(|existing| {
                                *existing = merge(existing.clone(), v.clone());
                            })
                            .or_insert(v);
                    }
                    Value::Object(a)
                }
                (Value::Array(mut a), Value::Array(b)) => {
                    a.extend(b);
                    Value::Array(a)
                }
                (_, b) => b,
            }
        }

        Self(merge(self.0, other.0))
    }
}

impl<T: Combine> Combine for Option<T> {
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.combine(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn combine_merges_object_keys_right_biased() {
        let a = JsonMetadata::new(json!({"role": "member", "team": "x"}));
        let b = JsonMetadata::new(json!({"role": "admin"}));
        let combined = a.combine(b);
        assert_eq!(combined.0, json!({"role": "admin", "team": "x"}));
    }

    #[test]
    fn combine_concatenates_arrays() {
        let a = JsonMetadata::new(json!(["a"]));
        let b = JsonMetadata::new(json!(["b"]));
        assert_eq!(a.combine(b).0, json!(["a", "b"]));
    }

    #[test]
    fn combine_with_null_returns_other_side() {
        let a = JsonMetadata::new(serde_json::Value::Null);
        let b = JsonMetadata::new(json!({"k": 1}));
        assert_eq!(a.combine(b.clone()).0, b.0);
    }

    #[test]
    fn option_combine_prefers_present_side() {
        let a: Option<JsonMetadata> = None;
        let b = Some(JsonMetadata::new(json!(1)));
        assert_eq!(a.combine(b.clone()), b);
    }

    #[test]
    fn combine_is_associative_for_object_merges() {
        let a = JsonMetadata::new(json!({"a": 1}));
        let b = JsonMetadata::new(json!({"b": 2}));
        let c = JsonMetadata::new(json!({"c": 3}));

        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));
        assert_eq!(left.0, right.0);
    }
}
