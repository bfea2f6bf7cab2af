use thiserror::Error;

/// Failure reading from a source or target system.
///
/// `GroupNotFound`/`UserNotFound` are distinguishable from `Other` so
/// callers can tell an expected-absent lookup from an operational failure
/// (`spec.md` §4.2, §7).
#[derive(Debug, Error)]
pub enum ReadError {
    /// The requested group does not exist in the system.
    #[error("group not found: {0}")]
    GroupNotFound(String),
    /// The requested user does not exist in the system.
    #[error("user not found: {0}")]
    UserNotFound(String),
    /// Any other remote-fetch failure (network, auth, decoding, ...).
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure replacing a target group's membership.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The target group named in `set_members` does not exist.
    #[error("unknown target group: {0}")]
    UnknownGroup(String),
    /// Any other remote-write failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
