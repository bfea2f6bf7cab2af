use async_trait::async_trait;
use groupsync_dispatcher::CancellationToken;

use crate::error::SyncError;

/// The public surface shared by all three syncer variants (`spec.md` §2, §6).
#[async_trait]
pub trait Syncer: Send + Sync {
    /// Reconciles the single target group (or groups, in many-to-many)
    /// affected by `source_id`.
    async fn sync(&self, source_id: &str, cancellation: CancellationToken) -> Result<(), SyncError>;

    /// Reconciles every group this syncer is configured for, dispatched
    /// under bounded concurrency.
    async fn sync_all(&self, cancellation: CancellationToken) -> Result<(), SyncError>;

    /// A human-readable identifier for logging, unrelated to any group id.
    fn name(&self) -> &str;

    /// The configured source system tag(s), comma-joined for many-to-one.
    fn source_system(&self) -> &str;

    /// The configured target system tag.
    fn target_system(&self) -> &str;
}
