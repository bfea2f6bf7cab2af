#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Composite group identifiers for target systems whose groups are keyed
//! by an (organization, group) pair.
//!
//! The engine stores these as a single opaque string produced by a codec
//! supplied at construction (`spec.md` §4.9); it never splits the string
//! itself, so an alternate target can swap in its own [`GroupIdCodec`]
//! without touching `groupsync-engine`.

use thiserror::Error;

/// Raised when a composite id string does not match the codec's expected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid composite group id: {0}")]
pub struct CodecError(pub String);

/// Encodes and decodes a composite (organization, group) identifier.
pub trait GroupIdCodec: Send + Sync {
    /// Encodes an (org, group) pair as a single opaque string.
    fn encode(&self, org: u64, group: u64) -> String;

    /// Parses an opaque string back into an (org, group) pair.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if `id` does not match the codec's shape.
    fn decode(&self, id: &str) -> Result<(u64, u64), CodecError>;
}

/// The default codec: `"<org>:<grp>"` using decimal representation.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCodec;

impl GroupIdCodec for DefaultCodec {
    fn encode(&self, org: u64, group: u64) -> String {
        format!("{org}:{group}")
    }

    fn decode(&self, id: &str) -> Result<(u64, u64), CodecError> {
        let (org, group) = id.split_once(':').ok_or_else(|| CodecError(id.to_owned()))?;
        let org: u64 = org.parse().map_err(|_| CodecError(id.to_owned()))?;
        let group: u64 = group.parse().map_err(|_| CodecError(id.to_owned()))?;
        Ok((org, group))
    }
}
