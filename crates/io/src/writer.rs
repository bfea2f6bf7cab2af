use async_trait::async_trait;
use groupsync_model::Member;

use crate::error::WriteError;

/// Capability to replace the full member set of a target group.
#[async_trait]
pub trait Writer: Send + Sync {
    /// Replaces `id`'s membership with exactly `members`.
    ///
    /// Implementations must achieve set equality on success even if the
    /// underlying API only supports add/remove, and must tolerate
    /// duplicate entries in `members` by deduplicating on id before
    /// writing (`spec.md` §4.2). An unknown target group is
    /// [`WriteError::UnknownGroup`].
    async fn set_members(&self, id: &str, members: Vec<Member>) -> Result<(), WriteError>;
}
