use std::sync::Arc;

use groupsync_identifiers::GroupIdCodec;
use groupsync_mappers::{build_bidirectional, GroupMapperOneToMany};
use groupsync_model::{JsonMetadata, Mapping};
use serde::{Deserialize, Serialize};

/// One source/target group descriptor, drawn from the closed set of
/// system-specific shapes a mapping file may declare (`spec.md` §6).
///
/// The engine consumes only the internal id string produced by
/// [`GroupDescriptor::to_internal_id`]; this enum exists so administrators
/// can write whichever shape matches the system they are configuring
/// without hand-encoding composite ids themselves.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupDescriptor {
    /// A directory-style group id, used as-is.
    Simple(String),
    /// An (organization, team) pair, encoded via the supplied codec.
    OrgTeam {
        /// The organization id.
        org: u64,
        /// The team id within that organization.
        team: u64,
    },
    /// A single numeric id.
    Numeric(u64),
}

impl GroupDescriptor {
    /// Resolves this descriptor to the internal id string the engine uses.
    #[must_use]
    pub fn to_internal_id(&self, codec: &dyn GroupIdCodec) -> String {
        match self {
            GroupDescriptor::Simple(id) => id.clone(),
            GroupDescriptor::OrgTeam { org, team } => codec.encode(*org, *team),
            GroupDescriptor::Numeric(id) => id.to_string(),
        }
    }
}

/// One declared entry of the group mapping file: a source descriptor, a
/// target descriptor, and (for many-to-one configurations) the source
/// system tag and any combinable metadata for this edge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupMappingEntry {
    /// The source group this entry declares.
    pub source: GroupDescriptor,
    /// The target group this entry declares.
    pub target: GroupDescriptor,
    /// The originating source system tag, required in many-to-one topologies.
    #[serde(default)]
    pub system: Option<String>,
    /// Combinable metadata describing this source/target edge.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Resolves every entry's descriptors to internal ids via `codec`,
/// producing the `(source_id, target_mapping)` pairs
/// `groupsync_mappers::build_bidirectional` expects.
#[must_use]
pub fn to_group_mapping_pairs(entries: &[GroupMappingEntry], codec: &dyn GroupIdCodec) -> Vec<(String, Mapping<JsonMetadata>)> {
    entries
        .iter()
        .map(|entry| {
            let source_id = entry.source.to_internal_id(codec);
            let target_id = entry.target.to_internal_id(codec);

            let mut mapping = Mapping::new(target_id);
            if let Some(system) = &entry.system {
                mapping = mapping.with_system(Arc::<str>::from(system.as_str()));
            }
            if let Some(metadata) = &entry.metadata {
                mapping = mapping.with_metadata(JsonMetadata::new(metadata.clone()));
            }

            (source_id, mapping)
        })
        .collect()
}

/// Builds the forward and reverse group mappers directly from parsed
/// mapping entries, resolving descriptors via `codec` along the way.
#[must_use]
pub fn build_group_mappers(
    entries: &[GroupMappingEntry],
    codec: &dyn GroupIdCodec,
) -> (GroupMapperOneToMany<JsonMetadata>, GroupMapperOneToMany<JsonMetadata>) {
    build_bidirectional(to_group_mapping_pairs(entries, codec))
}
