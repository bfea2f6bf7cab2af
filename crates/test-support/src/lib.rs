#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! An in-memory [`Reader`]/[`Writer`] double for driving the engine's tests
//! without a real source or target system.
//!
//! A single [`std::sync::RwLock`] guards every in-memory map, matching how
//! the specification describes the reference test-double's locking
//! (`spec.md` §5): one lock, not one per collection.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use groupsync_io::{ReadError, Reader, Writer, WriteError};
use groupsync_model::{Group, Member, User};

#[derive(Default)]
struct Inner {
    /// Direct children of a group id. Presence of the key, not a non-empty
    /// value, is what makes a group id "known" to this fake.
    members: HashMap<String, Vec<Member>>,
    users: HashMap<String, User>,
    fail_writes: HashSet<String>,
}

/// An in-memory system that can act as a source, a target, or both.
///
/// Construct with [`FakeSystem::new`], declare groups with
/// [`FakeSystem::with_group`], then share it behind an `Arc` with whatever
/// syncer needs a `Reader`/`Writer`/`ReadWriter` for this system.
#[derive(Default)]
pub struct FakeSystem {
    inner: RwLock<Inner>,
}

impl FakeSystem {
    /// Creates a system with no declared groups or users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a group and its direct members, overwriting any prior
    /// declaration for the same id.
    ///
    /// Used both for source groups (to script what `get_members` returns)
    /// and for target groups (to mark the id as a valid `set_members`
    /// destination; pass an empty member list for a target that starts
    /// out empty).
    #[must_use]
    pub fn with_group(self, id: impl Into<String>, members: impl IntoIterator<Item = Member>) -> Self {
        self.inner.write().expect("lock poisoned").members.insert(id.into(), members.into_iter().collect());
        self
    }

    /// Declares a user record, retrievable via `get_user`.
    #[must_use]
    pub fn with_user(self, user: User) -> Self {
        self.inner.write().expect("lock poisoned").users.insert(user.id().to_owned(), user);
        self
    }

    /// Configures `set_members` to fail for `id`, simulating a remote write
    /// failure (`spec.md` S6).
    #[must_use]
    pub fn fail_write(self, id: impl Into<String>) -> Self {
        self.inner.write().expect("lock poisoned").fail_writes.insert(id.into());
        self
    }

    /// The current direct members of `id`, or `None` if `id` was never declared.
    #[must_use]
    pub fn members_of(&self, id: &str) -> Option<Vec<Member>> {
        self.inner.read().expect("lock poisoned").members.get(id).cloned()
    }

    /// The current direct member ids of `id`, sorted, for easy assertions.
    /// Returns an empty vec if `id` was never declared.
    #[must_use]
    pub fn member_ids(&self, id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self.members_of(id).unwrap_or_default().iter().map(|member| member.id().to_owned()).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl Reader for FakeSystem {
    async fn get_group(&self, id: &str) -> Result<Group, ReadError> {
        let inner = self.inner.read().expect("lock poisoned");
        if inner.members.contains_key(id) {
            Ok(Group::new(id))
        } else {
            Err(ReadError::GroupNotFound(id.to_owned()))
        }
    }

    async fn get_members(&self, id: &str) -> Result<Vec<Member>, ReadError> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.members.get(id).cloned().ok_or_else(|| ReadError::GroupNotFound(id.to_owned()))
    }

    async fn get_user(&self, id: &str) -> Result<User, ReadError> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.users.get(id).cloned().ok_or_else(|| ReadError::UserNotFound(id.to_owned()))
    }
}

#[async_trait]
impl Writer for FakeSystem {
    async fn set_members(&self, id: &str, members: Vec<Member>) -> Result<(), WriteError> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if !inner.members.contains_key(id) {
            return Err(WriteError::UnknownGroup(id.to_owned()));
        }
        if inner.fail_writes.contains(id) {
            return Err(WriteError::Other("simulated write failure".into()));
        }

        let mut seen = HashSet::new();
        let deduped: Vec<Member> = members.into_iter().filter(|member| seen.insert(member.id().to_owned())).collect();
        inner.members.insert(id.to_owned(), deduped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_group_is_distinguishable_from_empty() {
        let system = FakeSystem::new().with_group("g1", []);
        assert!(system.get_members("g1").await.unwrap().is_empty());
        assert!(matches!(system.get_members("missing").await, Err(ReadError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn set_members_rejects_unknown_target() {
        let system = FakeSystem::new();
        let result = system.set_members("tg1", vec![]).await;
        assert!(matches!(result, Err(WriteError::UnknownGroup(_))));
    }

    #[tokio::test]
    async fn set_members_deduplicates_by_id() {
        let system = FakeSystem::new().with_group("tg1", []);
        system
            .set_members("tg1", vec![Member::User(User::new("u1")), Member::User(User::new("u1"))])
            .await
            .unwrap();
        assert_eq!(system.member_ids("tg1"), vec!["u1".to_owned()]);
    }

    #[tokio::test]
    async fn configured_write_failure_leaves_membership_unchanged() {
        let system = FakeSystem::new().with_group("tg1", [Member::User(User::new("u0"))]).fail_write("tg1");
        assert!(system.set_members("tg1", vec![Member::User(User::new("u1"))]).await.is_err());
        assert_eq!(system.member_ids("tg1"), vec!["u0".to_owned()]);
    }
}
