use serde_json::Value;

/// A group as returned by a source or target system.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    attributes: Value,
}

impl Group {
    /// Creates a group with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Value::Null,
        }
    }

    /// Attaches opaque attributes read from the source/target system.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// The group's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The opaque attributes attached to this group.
    #[must_use]
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// Whether this record has a usable (non-empty) id.
    ///
    /// Group objects with a null id are not traversed (`spec.md` §4.1).
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}
