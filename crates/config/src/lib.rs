#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Serde-derived record types describing the shape of the group/user
//! mapping configuration (`spec.md` §6), plus pure conversions into the
//! mapper builders in `groupsync-mappers`.
//!
//! Parsing an actual file (choosing a format, resolving a path) is the
//! excluded outer CLI's job; this crate only covers "given already-parsed
//! records, build the mappers the engine needs."

mod group_mapping;
mod user_mapping;

pub use group_mapping::{build_group_mappers, to_group_mapping_pairs, GroupDescriptor, GroupMappingEntry};
pub use user_mapping::{build_user_mapper, user_mapping_pairs, DuplicateUserMappingPolicy, UserMappingEntry};
