use rustc_hash::FxHashMap;
use thiserror::Error;

use groupsync_model::Mapping;

/// Raised when a group mapper is queried for a key it does not recognize.
///
/// Group mappers never treat an unknown key as a silent empty result
/// (`spec.md` §3 invariant 2); only declared-empty entries produce an
/// empty list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("group id not mapped: {0}")]
pub struct UnknownGroupId(pub String);

/// A one-to-many group mapper: a key group id maps to an ordered list of
/// [`Mapping`] entries, declaration order preserved (duplicates included).
#[derive(Debug)]
pub struct GroupMapperOneToMany<M> {
    entries: FxHashMap<String, Vec<Mapping<M>>>,
}

impl<M> GroupMapperOneToMany<M> {
    /// Builds a mapper directly from a pre-grouped entry table.
    #[must_use]
    pub fn new(entries: FxHashMap<String, Vec<Mapping<M>>>) -> Self {
        Self { entries }
    }

    /// All configured key group ids, in no particular order.
    pub fn all_group_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether `id` is a configured key.
    #[must_use]
    pub fn contains_group_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The configured group ids `id` maps to, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownGroupId`] if `id` is not a configured key.
    pub fn mapped_group_ids(&self, id: &str) -> Result<Vec<String>, UnknownGroupId> {
        self.mappings(id)
            .map(|mappings| mappings.iter().map(|mapping| mapping.group_id().to_owned()).collect())
    }

    /// The configured [`Mapping`] entries for `id`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownGroupId`] if `id` is not a configured key.
    pub fn mappings(&self, id: &str) -> Result<&[Mapping<M>], UnknownGroupId> {
        self.entries.get(id).map(Vec::as_slice).ok_or_else(|| UnknownGroupId(id.to_owned()))
    }
}

/// A one-to-one group mapper: a key group id maps to exactly one [`Mapping`].
#[derive(Debug)]
pub struct GroupMapperOneToOne<M> {
    entries: FxHashMap<String, Mapping<M>>,
}

impl<M> GroupMapperOneToOne<M> {
    /// Builds a mapper directly from a pre-built entry table.
    #[must_use]
    pub fn new(entries: FxHashMap<String, Mapping<M>>) -> Self {
        Self { entries }
    }

    /// All configured key group ids, in no particular order.
    pub fn all_group_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether `id` is a configured key.
    #[must_use]
    pub fn contains_group_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The single group id `id` maps to.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownGroupId`] if `id` is not a configured key.
    pub fn mapped_group_id(&self, id: &str) -> Result<String, UnknownGroupId> {
        self.mapping(id).map(|mapping| mapping.group_id().to_owned())
    }

    /// The single configured [`Mapping`] for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownGroupId`] if `id` is not a configured key.
    pub fn mapping(&self, id: &str) -> Result<&Mapping<M>, UnknownGroupId> {
        self.entries.get(id).ok_or_else(|| UnknownGroupId(id.to_owned()))
    }
}

/// Builds the forward (source → targets) and reverse (target → sources)
/// views of the same group mapping from a flat list of
/// `(source_group_id, target_mapping)` pairs (`spec.md` §4.3).
///
/// For every pair `(s, t)`, `t.group_id() ∈ forward[s]` and `s ∈
/// reverse[t.group_id()]`; the reverse entry for `s` carries the same
/// system tag and metadata as the original `target_mapping`, since both
/// describe the same configured edge. Order within each list is
/// declaration order; duplicate pairs are preserved rather than collapsed.
pub fn build_bidirectional<M: Clone>(
    pairs: impl IntoIterator<Item = (String, Mapping<M>)>,
) -> (GroupMapperOneToMany<M>, GroupMapperOneToMany<M>) {
    let mut forward: FxHashMap<String, Vec<Mapping<M>>> = FxHashMap::default();
    let mut reverse: FxHashMap<String, Vec<Mapping<M>>> = FxHashMap::default();

    for (source_id, target_mapping) in pairs {
        let target_id = target_mapping.group_id().to_owned();

        let mut reverse_mapping = Mapping::new(source_id.clone());
        if let Some(system) = target_mapping.system() {
            reverse_mapping = reverse_mapping.with_system(system.clone());
        }
        if let Some(metadata) = target_mapping.metadata() {
            reverse_mapping = reverse_mapping.with_metadata(metadata.clone());
        }

        forward.entry(source_id).or_default().push(target_mapping);
        reverse.entry(target_id).or_default().push(reverse_mapping);
    }

    (GroupMapperOneToMany::new(forward), GroupMapperOneToMany::new(reverse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidirectional_build_satisfies_membership_both_ways() {
        let pairs = vec![
            ("1".to_owned(), Mapping::<()>::new("99")),
            ("1".to_owned(), Mapping::<()>::new("98")),
            ("2".to_owned(), Mapping::<()>::new("97")),
            ("4".to_owned(), Mapping::<()>::new("97")),
        ];
        let (forward, reverse) = build_bidirectional(pairs);

        assert_eq!(forward.mapped_group_ids("1").unwrap(), vec!["99", "98"]);
        assert_eq!(reverse.mapped_group_ids("97").unwrap(), vec!["2", "4"]);
        assert_eq!(reverse.mapped_group_ids("99").unwrap(), vec!["1"]);
    }

    #[test]
    fn unknown_key_is_distinguishable_from_empty_list() {
        let entries: FxHashMap<String, Vec<Mapping<()>>> = [("known".to_owned(), vec![])].into_iter().collect();
        let mapper = GroupMapperOneToMany::new(entries);

        assert_eq!(mapper.mappings("known").unwrap().len(), 0);
        assert!(mapper.mappings("missing").is_err());
    }
}
