use async_trait::async_trait;
use groupsync_model::{Group, Member, User};
use groupsync_traversal::TraversalError;

use crate::error::ReadError;

/// Capability to enumerate a group's direct members and to recursively
/// enumerate its user descendants in a source (or target) system.
#[async_trait]
pub trait Reader: Send + Sync {
    /// Fetches the group record for `id`.
    async fn get_group(&self, id: &str) -> Result<Group, ReadError>;

    /// Fetches the ordered list of `id`'s direct children.
    async fn get_members(&self, id: &str) -> Result<Vec<Member>, ReadError>;

    /// Fetches the user record for `id`.
    async fn get_user(&self, id: &str) -> Result<User, ReadError>;

    /// Recursively expands `id` to its flat set of user descendants.
    ///
    /// The default implementation is `groupsync_traversal::descendants`
    /// driven by [`Reader::get_members`]; implementors only need to supply
    /// the three methods above.
    async fn descendants(&self, id: &str) -> (Vec<User>, Option<TraversalError<ReadError>>) {
        groupsync_traversal::descendants(id, |group_id| async move { self.get_members(&group_id).await }).await
    }
}
