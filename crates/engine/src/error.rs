use thiserror::Error;

use groupsync_dispatcher::DispatchOutcome;
use groupsync_io::{ReadError, WriteError};
use groupsync_mappers::{UnknownGroupId, UserMapperError};

/// The error type returned by every [`crate::Syncer`] method.
///
/// This is the single "joined error" family used across the engine
/// (`spec.md` §7): per-step failures are wrapped in a specific variant,
/// and a unit of work that accumulates more than one (a target's
/// contributing-group fetches, a `sync_all` run) reports them together as
/// [`SyncError::Aggregate`] rather than dropping all but the first.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested source or target group id has no configured mapping.
    #[error("group not mapped: {0}")]
    NotMapped(#[from] UnknownGroupId),

    /// A contributing mapping is missing something the syncer needs to use
    /// it (an originating system tag, a reader or user mapper registered
    /// for that tag).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fetching a group's descendants failed.
    #[error("fetching descendants of {group_id}: {source}")]
    Fetch {
        /// The source group id being expanded.
        group_id: String,
        #[source]
        source: ReadError,
    },

    /// Translating a source user through the user mapper failed (not the
    /// "no mapping" sentinel, which is not an error).
    #[error(transparent)]
    UserMapping(#[from] UserMapperError),

    /// Replacing a target group's membership failed. Terminal for that
    /// target: any previously aggregated errors for the same target are
    /// replaced by this one (`spec.md` §4.7 step 5).
    #[error("writing members of {group_id}: {source}")]
    Write {
        /// The target group id being written.
        group_id: String,
        #[source]
        source: WriteError,
    },

    /// The sync was cancelled before completing.
    #[error("sync cancelled")]
    Cancelled,

    /// More than one of the above occurred in the same unit of work.
    #[error("{} error(s) occurred while syncing", errors.len())]
    Aggregate {
        /// The individual errors, in the order they were observed.
        errors: Vec<SyncError>,
    },
}

impl SyncError {
    /// Joins zero or more errors into a single result: `Ok(())` if empty, the
    /// lone error unwrapped if exactly one, or [`SyncError::Aggregate`] otherwise.
    pub(crate) fn from_many(mut errors: Vec<SyncError>) -> Result<(), SyncError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(SyncError::Aggregate { errors }),
        }
    }

    /// Folds a dispatcher run's per-item errors (plus a cancellation flag,
    /// if any) into a single result for `sync_all`.
    pub(crate) fn from_dispatch(outcome: DispatchOutcome<SyncError>) -> Result<(), SyncError> {
        let mut errors: Vec<SyncError> = outcome.errors.into_iter().map(|(_, error)| error).collect();
        if outcome.cancelled {
            errors.push(SyncError::Cancelled);
        }
        Self::from_many(errors)
    }
}
