use thiserror::Error;

use crate::group::Group;
use crate::user::User;

/// Raised when a [`Member`] is accessed as the wrong variant.
///
/// The sum type is exposed across crate boundaries, so callers are expected
/// to guard with [`Member::is_user`]/[`Member::is_group`] or match on the
/// variant directly; this error exists for the cases that skip the guard.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemberKindError {
    /// The caller expected a user but the member was a group.
    #[error("member is a group, not a user")]
    NotAUser,
    /// The caller expected a group but the member was a user.
    #[error("member is a user, not a group")]
    NotAGroup,
}

/// A direct child of a group: either a user or a nested group.
///
/// Exactly one of the two variants is populated at a time (`spec.md` §3
/// invariant 1); the wrong-kind accessors return [`MemberKindError`]
/// instead of panicking, since callers may reasonably not know which
/// variant they hold ahead of time.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    /// A user member.
    User(User),
    /// A nested group member.
    Group(Group),
}

impl Member {
    /// The member's id, regardless of variant.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Member::User(user) => user.id(),
            Member::Group(group) => group.id(),
        }
    }

    /// Whether this member is a user.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Member::User(_))
    }

    /// Whether this member is a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Member::Group(_))
    }

    /// Returns the user payload, or [`MemberKindError::NotAUser`] if this
    /// member is a group.
    pub fn as_user(&self) -> Result<&User, MemberKindError> {
        match self {
            Member::User(user) => Ok(user),
            Member::Group(_) => Err(MemberKindError::NotAUser),
        }
    }

    /// Returns the group payload, or [`MemberKindError::NotAGroup`] if this
    /// member is a user.
    pub fn as_group(&self) -> Result<&Group, MemberKindError> {
        match self {
            Member::Group(group) => Ok(group),
            Member::User(_) => Err(MemberKindError::NotAGroup),
        }
    }

    /// Consumes the member, returning the user payload.
    pub fn into_user(self) -> Result<User, MemberKindError> {
        match self {
            Member::User(user) => Ok(user),
            Member::Group(_) => Err(MemberKindError::NotAUser),
        }
    }

    /// Consumes the member, returning the group payload.
    pub fn into_group(self) -> Result<Group, MemberKindError> {
        match self {
            Member::Group(group) => Ok(group),
            Member::User(_) => Err(MemberKindError::NotAGroup),
        }
    }
}

impl From<User> for Member {
    fn from(user: User) -> Self {
        Member::User(user)
    }
}

impl From<Group> for Member {
    fn from(group: Group) -> Self {
        Member::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_kind_access_returns_error_not_panic() {
        let member: Member = User::new("u1").into();
        assert_eq!(member.as_group().unwrap_err(), MemberKindError::NotAGroup);

        let member: Member = Group::new("g1").into();
        assert_eq!(member.as_user().unwrap_err(), MemberKindError::NotAUser);
    }

    #[test]
    fn id_delegates_to_the_populated_variant() {
        let member: Member = User::new("u1").into();
        assert_eq!(member.id(), "u1");
        let member: Member = Group::new("g1").into();
        assert_eq!(member.id(), "g1");
    }

    #[test]
    fn kind_guards_match_the_variant() {
        let member: Member = User::new("u1").into();
        assert!(member.is_user());
        assert!(!member.is_group());
    }
}
