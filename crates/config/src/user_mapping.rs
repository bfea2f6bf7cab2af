use groupsync_mappers::{DuplicateSourceError, UserMapperTable};
use serde::{Deserialize, Serialize};

/// One declared entry of the user mapping file: a source user id and its
/// target counterpart. Entries where either id is empty are skipped
/// (`spec.md` §6) rather than treated as a mapping to/from the empty string.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserMappingEntry {
    /// The source user id.
    pub source_id: String,
    /// The target user id.
    pub target_id: String,
}

/// How to handle a source id declared more than once across the user
/// mapping entries (`spec.md` §4.4, §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateUserMappingPolicy {
    /// Reject the configuration; recommended for new deployments.
    Strict,
    /// Keep the last declaration, logging a warning for each overwrite.
    AllowDuplicatesLastWins,
}

/// Filters out entries with an empty source or target id, returning the
/// remaining `(source_id, target_id)` pairs in declaration order.
#[must_use]
pub fn user_mapping_pairs(entries: &[UserMappingEntry]) -> Vec<(String, String)> {
    entries
        .iter()
        .filter(|entry| !entry.source_id.is_empty() && !entry.target_id.is_empty())
        .map(|entry| (entry.source_id.clone(), entry.target_id.clone()))
        .collect()
}

/// Builds a [`UserMapperTable`] from parsed user mapping entries under the
/// given duplicate-source policy.
///
/// # Errors
///
/// Returns [`DuplicateSourceError`] when `policy` is
/// [`DuplicateUserMappingPolicy::Strict`] and a source id is declared more
/// than once.
pub fn build_user_mapper(entries: &[UserMappingEntry], policy: DuplicateUserMappingPolicy) -> Result<UserMapperTable, DuplicateSourceError> {
    let pairs = user_mapping_pairs(entries);
    match policy {
        DuplicateUserMappingPolicy::Strict => UserMapperTable::build_strict(pairs),
        DuplicateUserMappingPolicy::AllowDuplicatesLastWins => Ok(UserMapperTable::build_allow_duplicates(pairs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_skipped() {
        let entries = vec![
            UserMappingEntry { source_id: String::new(), target_id: "tu1".to_owned() },
            UserMappingEntry { source_id: "su2".to_owned(), target_id: String::new() },
            UserMappingEntry { source_id: "su3".to_owned(), target_id: "tu3".to_owned() },
        ];
        assert_eq!(user_mapping_pairs(&entries), vec![("su3".to_owned(), "tu3".to_owned())]);
    }

    #[test]
    fn strict_policy_rejects_duplicates() {
        let entries = vec![
            UserMappingEntry { source_id: "su1".to_owned(), target_id: "a".to_owned() },
            UserMappingEntry { source_id: "su1".to_owned(), target_id: "b".to_owned() },
        ];
        assert!(build_user_mapper(&entries, DuplicateUserMappingPolicy::Strict).is_err());
        assert!(build_user_mapper(&entries, DuplicateUserMappingPolicy::AllowDuplicatesLastWins).is_ok());
    }
}
