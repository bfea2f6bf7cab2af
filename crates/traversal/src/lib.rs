#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Breadth-first expansion of nested groups to a flat, possibly-duplicated
//! user list.
//!
//! [`descendants`] is parameterized by a `membersOf` callable rather than a
//! trait, so it has no dependency on how a reader actually fetches a
//! group's direct members — `groupsync-io`'s `Reader::descendants` default
//! method is a thin wrapper around this function.

use std::collections::{HashSet, VecDeque};
use std::future::Future;

use groupsync_model::{Member, User};
use thiserror::Error;

/// Composite error accumulated while traversing a source group graph.
///
/// A `membersOf` failure on one group does not abort traversal of its
/// siblings (`spec.md` §4.1); every group that failed is recorded here
/// alongside whatever users were gathered from the groups that succeeded.
#[derive(Debug, Error)]
#[error("descendant traversal failed for {} group(s)", errors.len())]
pub struct TraversalError<E> {
    /// `(group_id, error)` pairs for every group whose `membersOf` call failed.
    pub errors: Vec<(String, E)>,
}

impl<E> TraversalError<E> {
    fn from_errors(errors: Vec<(String, E)>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }
}

/// Expands `start_group_id` breadth-first, returning every user reachable
/// through nested group membership.
///
/// `members_of` is invoked once per distinct group id; a `seen` set keyed
/// by group id (including `start_group_id` itself before expansion begins)
/// makes the traversal terminate even when the source graph contains
/// cycles or shared subgroups (`spec.md` §4.1, invariant 5). Users with an
/// empty id are dropped silently; groups with an empty id are not
/// enqueued. The returned `Vec<User>` may contain duplicates — callers
/// that need a set deduplicate by id themselves.
pub async fn descendants<F, Fut, E>(start_group_id: &str, mut members_of: F) -> (Vec<User>, Option<TraversalError<E>>)
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<Member>, E>>,
{
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let mut users = Vec::new();
    let mut errors = Vec::new();

    seen.insert(start_group_id.to_owned());
    queue.push_back(start_group_id.to_owned());

    while let Some(group_id) = queue.pop_front() {
        let members = match members_of(group_id.clone()).await {
            Ok(members) => members,
            Err(err) => {
                tracing::debug!(group = %group_id, "membersOf failed during descendant traversal");
                errors.push((group_id, err));
                continue;
            }
        };

        for member in members {
            match member {
                Member::User(user) => {
                    if user.has_id() {
                        users.push(user);
                    }
                }
                Member::Group(group) => {
                    if group.has_id() && seen.insert(group.id().to_owned()) {
                        queue.push_back(group.id().to_owned());
                    }
                }
            }
        }
    }

    (users, TraversalError::from_errors(errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsync_model::Group;
    use std::collections::HashMap;
    use std::convert::Infallible;

    fn sort_ids(users: &[User]) -> Vec<&str> {
        let mut ids: Vec<&str> = users.iter().map(User::id).collect();
        ids.sort_unstable();
        ids
    }

    #[tokio::test]
    async fn cycle_terminates_and_returns_reachable_users() {
        // X = {group(Y)}, Y = {group(X), user(u1)}  (spec.md S3)
        let mut graph: HashMap<&str, Vec<Member>> = HashMap::new();
        graph.insert("X", vec![Member::Group(Group::new("Y"))]);
        graph.insert(
            "Y",
            vec![Member::Group(Group::new("X")), Member::User(User::new("u1"))],
        );

        let (users, error): (_, Option<TraversalError<Infallible>>) = descendants("X", |id| {
            let members = graph.get(id.as_str()).cloned().unwrap_or_default();
            async move { Ok(members) }
        })
        .await;

        assert!(error.is_none());
        assert_eq!(sort_ids(&users), vec!["u1"]);
    }

    #[tokio::test]
    async fn shared_subgroup_is_expanded_once() {
        let mut graph: HashMap<&str, Vec<Member>> = HashMap::new();
        graph.insert(
            "top",
            vec![Member::Group(Group::new("shared")), Member::Group(Group::new("shared"))],
        );
        graph.insert("shared", vec![Member::User(User::new("u1"))]);

        let (users, _): (_, Option<TraversalError<Infallible>>) = descendants("top", |id| {
            let members = graph.get(id.as_str()).cloned().unwrap_or_default();
            async move { Ok(members) }
        })
        .await;

        assert_eq!(users.len(), 1, "shared subgroup must only be expanded once");
    }

    #[tokio::test]
    async fn membersof_failure_does_not_abort_siblings() {
        let mut graph: HashMap<&str, Vec<Member>> = HashMap::new();
        graph.insert(
            "top",
            vec![Member::Group(Group::new("ok")), Member::Group(Group::new("broken"))],
        );
        graph.insert("ok", vec![Member::User(User::new("u1"))]);

        let (users, error) = descendants("top", |id| {
            let graph = graph.clone();
            async move {
                if id == "broken" {
                    Err("boom")
                } else {
                    Ok(graph.get(id.as_str()).cloned().unwrap_or_default())
                }
            }
        })
        .await;

        assert_eq!(sort_ids(&users), vec!["u1"]);
        let error = error.expect("broken group should surface an error");
        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.errors[0].0, "broken");
    }

    #[tokio::test]
    async fn empty_id_users_are_dropped_and_empty_id_groups_are_not_traversed() {
        let (users, _): (_, Option<TraversalError<Infallible>>) = descendants("top", |id| {
            let members = if id == "top" {
                vec![Member::User(User::new("")), Member::Group(Group::new(""))]
            } else {
                panic!("empty-id group must not be traversed")
            };
            async move { Ok(members) }
        })
        .await;

        assert!(users.is_empty());
    }
}
