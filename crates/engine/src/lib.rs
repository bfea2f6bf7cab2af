#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! The synchronization engine: three syncer variants sharing the
//! [`Syncer`] surface, each composing `groupsync-traversal` (via
//! `groupsync-io`'s `Reader::descendants`), `groupsync-mappers`, and
//! `groupsync-dispatcher` into the end-to-end reconciliation described by
//! this workspace's data flow (source id → target group id(s) →
//! contributing source groups → unioned descendants → translated users →
//! full-replacement write).

mod error;
mod many_to_many;
mod many_to_one;
mod one_to_one;
mod syncer;

pub use error::SyncError;
pub use many_to_many::ManyToManySyncer;
pub use many_to_one::ManyToOneSyncer;
pub use one_to_one::OneToOneSyncer;
pub use syncer::Syncer;
