#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `groupsync-model` holds the plain value records shared by every other
//! crate in the workspace: [`User`], [`Group`], the [`Member`] sum type,
//! and the [`Mapping`] record used by the group mappers. None of these
//! types perform I/O; they are produced by readers, consumed by the
//! traversal and syncer crates, and written back out by writers.
//!
//! # Invariants
//!
//! - A [`Member`] is a user xor a group; the wrong-kind accessor returns
//!   [`MemberKindError`] rather than panicking.
//! - [`User::has_id`]/[`Group::has_id`] report whether the record carries
//!   a usable id; descendant traversal uses these to silently drop
//!   id-less users and skip traversing id-less groups.

mod group;
mod mapping;
mod member;
mod metadata;
mod user;

pub use group::Group;
pub use mapping::Mapping;
pub use member::{Member, MemberKindError};
pub use metadata::{Combine, JsonMetadata};
pub use user::User;
