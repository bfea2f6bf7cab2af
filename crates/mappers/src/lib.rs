#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Group mappers (one-to-one and one-to-many) and user mappers, plus the
//! configuration-driven builders the three syncers in `groupsync-engine`
//! are constructed from.

mod group_mapper;
mod user_mapper;

pub use group_mapper::{build_bidirectional, GroupMapperOneToMany, GroupMapperOneToOne, UnknownGroupId};
pub use user_mapper::{
    DuplicateSourceError, IdentityUserMapper, UserMapper, UserMapperError, UserMapperTable,
};
