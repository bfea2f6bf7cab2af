use std::sync::Arc;

/// A configured correspondence between a source group and a target group.
///
/// `system` carries the originating source system tag in many-to-one
/// topologies (`spec.md` §3 invariant 4: a missing tag there is a
/// configuration error, surfaced by the syncer that requires it, not by
/// this type). `metadata` is an opaque, combinable payload propagated
/// through user de-duplication (`spec.md` §4.6 step 2, §9).
#[derive(Clone, Debug, PartialEq)]
pub struct Mapping<M> {
    group_id: String,
    system: Option<Arc<str>>,
    metadata: Option<M>,
}

impl<M> Mapping<M> {
    /// Creates a mapping entry with no system tag and no metadata.
    #[must_use]
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            system: None,
            metadata: None,
        }
    }

    /// Attaches the originating system tag.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<Arc<str>>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attaches combinable metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: M) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The mapped group's id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// The originating system tag, if any.
    #[must_use]
    pub fn system(&self) -> Option<&Arc<str>> {
        self.system.as_ref()
    }

    /// The attached metadata, if any.
    #[must_use]
    pub fn metadata(&self) -> Option<&M> {
        self.metadata.as_ref()
    }
}
