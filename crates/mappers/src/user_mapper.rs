use async_trait::async_trait;
use rustc_hash::FxHashMap;
use thiserror::Error;

use groupsync_model::User;

/// Raised by a [`UserMapper`] lookup that is not the "no mapping" sentinel.
///
/// This is the *unexpected* failure path; the expected "no target for this
/// user" case is represented by `Ok(None)`, not an error (`spec.md` §4.4).
#[derive(Debug, Error)]
#[error("user mapper lookup failed for {id}: {reason}")]
pub struct UserMapperError {
    /// The source user id being looked up.
    pub id: String,
    /// A human-readable reason, for logging.
    pub reason: String,
}

/// Translates a source user identity to a target user identity.
///
/// `Ok(None)` is the "no mapping" sentinel: the user exists but is
/// intentionally absent from the target, and callers must skip them
/// rather than treat the lookup as failed (`spec.md` §3 invariant 3, §4.4).
#[async_trait]
pub trait UserMapper: Send + Sync {
    /// Maps a source user id to its target id, or `None` if intentionally unmapped.
    async fn mapped_user_id(&self, id: &str) -> Result<Option<String>, UserMapperError>;

    /// Maps a source [`User`], preserving attributes, to its target counterpart.
    async fn mapped_user(&self, user: &User) -> Result<Option<User>, UserMapperError> {
        Ok(self
            .mapped_user_id(user.id())
            .await?
            .map(|target_id| User::new(target_id).with_attributes(user.attributes().clone())))
    }
}

/// A pass-through user mapper: every id maps to itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityUserMapper;

#[async_trait]
impl UserMapper for IdentityUserMapper {
    async fn mapped_user_id(&self, id: &str) -> Result<Option<String>, UserMapperError> {
        Ok(Some(id.to_owned()))
    }
}

/// Raised while building a [`UserMapperTable`] with [`UserMapperTable::build_strict`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("duplicate user mapping source: {0}")]
pub struct DuplicateSourceError(pub String);

/// A fixed source-id → target-id lookup table.
#[derive(Clone, Debug, Default)]
pub struct UserMapperTable {
    table: FxHashMap<String, String>,
}

impl UserMapperTable {
    /// Builds a table from `(source_id, target_id)` pairs, rejecting
    /// duplicate source ids.
    ///
    /// This is the specification's recommended construction for new
    /// configurations (`spec.md` §9).
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateSourceError`] naming the first source id declared
    /// more than once.
    pub fn build_strict(pairs: impl IntoIterator<Item = (String, String)>) -> Result<Self, DuplicateSourceError> {
        let mut table = FxHashMap::default();
        for (source, target) in pairs {
            if table.insert(source.clone(), target).is_some() {
                return Err(DuplicateSourceError(source));
            }
        }
        Ok(Self { table })
    }

    /// Builds a table from `(source_id, target_id)` pairs, allowing
    /// duplicate source ids: the last declaration wins and every
    /// overwritten entry is logged at `warn` level.
    ///
    /// This preserves the permissive behavior some existing
    /// configurations rely on (`spec.md` §9); new configurations should
    /// prefer [`Self::build_strict`].
    #[must_use]
    pub fn build_allow_duplicates(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut table = FxHashMap::default();
        for (source, target) in pairs {
            if let Some(previous) = table.insert(source.clone(), target.clone()) {
                tracing::warn!(source = %source, previous_target = %previous, new_target = %target, "duplicate user mapping source, last wins");
            }
        }
        Self { table }
    }
}

#[async_trait]
impl UserMapper for UserMapperTable {
    async fn mapped_user_id(&self, id: &str) -> Result<Option<String>, UserMapperError> {
        Ok(self.table.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_mapper_is_a_pass_through() {
        let mapper = IdentityUserMapper;
        assert_eq!(mapper.mapped_user_id("su1").await.unwrap(), Some("su1".to_owned()));
    }

    #[tokio::test]
    async fn missing_entry_is_the_not_found_sentinel_not_an_error() {
        let table = UserMapperTable::build_strict([("su1".to_owned(), "tu1".to_owned())]).unwrap();
        assert_eq!(table.mapped_user_id("su2").await.unwrap(), None);
    }

    #[test]
    fn strict_build_rejects_duplicate_source() {
        let pairs = [("su1".to_owned(), "tu1".to_owned()), ("su1".to_owned(), "tu2".to_owned())];
        assert!(UserMapperTable::build_strict(pairs).is_err());
    }

    #[tokio::test]
    async fn permissive_build_keeps_the_last_declaration() {
        let pairs = [("su1".to_owned(), "tu1".to_owned()), ("su1".to_owned(), "tu2".to_owned())];
        let table = UserMapperTable::build_allow_duplicates(pairs);
        assert_eq!(table.mapped_user_id("su1").await.unwrap(), Some("tu2".to_owned()));
    }
}
