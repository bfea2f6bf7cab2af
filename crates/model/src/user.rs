use std::sync::Arc;

use serde_json::Value;

/// A user as returned by a source or target system.
///
/// `system` is only populated in many-to-one topologies, where a single
/// merged user set is assembled from more than one source system and the
/// originating system must be remembered to pick the right user mapper
/// (see `ManyToOneSyncer`).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    id: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    system: Option<Arc<str>>,
    #[cfg_attr(feature = "serde", serde(default))]
    attributes: Value,
}

impl User {
    /// Creates a user with no system tag and no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            system: None,
            attributes: Value::Null,
        }
    }

    /// Stamps the user with the system it was read from.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<Arc<str>>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attaches opaque attributes read from the source/target system.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// The user's id, stable within its system.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The originating system tag, if any.
    #[must_use]
    pub fn system(&self) -> Option<&Arc<str>> {
        self.system.as_ref()
    }

    /// The opaque attributes attached to this user.
    #[must_use]
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// Whether this record has a usable (non-empty) id.
    ///
    /// Descendant traversal silently drops users with a null/empty id
    /// rather than propagating them (`spec.md` §4.1).
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_reported() {
        assert!(!User::new("").has_id());
        assert!(User::new("u1").has_id());
    }

    #[test]
    fn builder_methods_compose() {
        let user = User::new("u1")
            .with_system("S1")
            .with_attributes(serde_json::json!({"name": "Alice"}));
        assert_eq!(user.id(), "u1");
        assert_eq!(user.system().map(AsRef::as_ref), Some("S1"));
        assert_eq!(user.attributes()["name"], "Alice");
    }
}
