use std::sync::Arc;

use async_trait::async_trait;
use groupsync_dispatcher::{CancellationToken, Dispatcher};
use groupsync_io::{Reader, Writer};
use groupsync_mappers::{GroupMapperOneToMany, UserMapper};
use groupsync_model::{Combine, JsonMetadata, Member, User};
use rustc_hash::FxHashMap;

use crate::error::SyncError;
use crate::syncer::Syncer;

/// One source system, one target system, many-to-many group mapping
/// (`spec.md` §4.6).
pub struct ManyToManySyncer {
    name: String,
    source_system: String,
    target_system: String,
    forward: Arc<GroupMapperOneToMany<JsonMetadata>>,
    reverse: Arc<GroupMapperOneToMany<JsonMetadata>>,
    reader: Arc<dyn Reader>,
    writer: Arc<dyn Writer>,
    user_mapper: Arc<dyn UserMapper>,
    dispatcher: Dispatcher,
}

impl ManyToManySyncer {
    /// Builds a syncer from the bidirectional mapper views produced by
    /// `groupsync_mappers::build_bidirectional`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_system: impl Into<String>,
        target_system: impl Into<String>,
        forward: GroupMapperOneToMany<JsonMetadata>,
        reverse: GroupMapperOneToMany<JsonMetadata>,
        reader: Arc<dyn Reader>,
        writer: Arc<dyn Writer>,
        user_mapper: Arc<dyn UserMapper>,
    ) -> Self {
        Self {
            name: name.into(),
            source_system: source_system.into(),
            target_system: target_system.into(),
            forward: Arc::new(forward),
            reverse: Arc::new(reverse),
            reader,
            writer,
            user_mapper,
            dispatcher: Dispatcher::with_default_concurrency(),
        }
    }

    /// Overrides the default dispatcher used by [`Syncer::sync_all`].
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }
}

/// Reconciles a single target group from every contributing source group
/// listed in `reverse` (`spec.md` §4.6 `syncTargetGroup`).
async fn sync_target_group(
    reverse: &GroupMapperOneToMany<JsonMetadata>,
    reader: &dyn Reader,
    writer: &dyn Writer,
    user_mapper: &dyn UserMapper,
    target_id: &str,
    cancellation: &CancellationToken,
) -> Result<(), SyncError> {
    let contributing = reverse.mappings(target_id)?;

    if cancellation.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    // user id -> (user record, metadata combined across every contributing
    // group that produced this user).
    let mut merged: FxHashMap<String, (User, Option<JsonMetadata>)> = FxHashMap::default();
    let mut errors = Vec::new();

    for mapping in contributing {
        if cancellation.is_cancelled() {
            errors.push(SyncError::Cancelled);
            return SyncError::from_many(errors);
        }

        let (users, traversal_error) = reader.descendants(mapping.group_id()).await;
        errors.extend(
            traversal_error
                .map(|error| error.errors)
                .unwrap_or_default()
                .into_iter()
                .map(|(group_id, source)| SyncError::Fetch { group_id, source }),
        );

        for user in users {
            let contribution = mapping.metadata().cloned();
            merged
                .entry(user.id().to_owned())
                .and_modify(|(_, existing)| *existing = existing.take().combine(contribution.clone()))
                .or_insert_with(|| (user, contribution));
        }
    }

    if cancellation.is_cancelled() {
        errors.push(SyncError::Cancelled);
        return SyncError::from_many(errors);
    }

    let mut target_members = Vec::with_capacity(merged.len());
    let mut user_translation_failed = false;
    for (user, _metadata) in merged.into_values() {
        match user_mapper.mapped_user(&user).await {
            Ok(Some(target_user)) => target_members.push(Member::User(target_user)),
            Ok(None) => tracing::debug!(user = user.id(), "user mapper returned no mapping, skipping"),
            Err(error) => {
                errors.push(SyncError::from(error));
                user_translation_failed = true;
            }
        }
    }

    // A user-translation failure aborts this target with no partial write;
    // fetch failures above do not (`spec.md` §4.6 step 3).
    if user_translation_failed {
        return SyncError::from_many(errors);
    }

    if let Err(source) = writer.set_members(target_id, target_members).await {
        errors.push(SyncError::Write { group_id: target_id.to_owned(), source });
    }

    SyncError::from_many(errors)
}

async fn sync_source_group(
    forward: &GroupMapperOneToMany<JsonMetadata>,
    reverse: &GroupMapperOneToMany<JsonMetadata>,
    reader: &dyn Reader,
    writer: &dyn Writer,
    user_mapper: &dyn UserMapper,
    source_id: &str,
    cancellation: &CancellationToken,
) -> Result<(), SyncError> {
    let target_ids = forward.mapped_group_ids(source_id)?;
    let mut errors = Vec::new();

    for target_id in target_ids {
        if cancellation.is_cancelled() {
            errors.push(SyncError::Cancelled);
            break;
        }
        if let Err(error) = sync_target_group(reverse, reader, writer, user_mapper, &target_id, cancellation).await {
            errors.push(error);
        }
    }

    SyncError::from_many(errors)
}

#[async_trait]
impl Syncer for ManyToManySyncer {
    async fn sync(&self, source_id: &str, cancellation: CancellationToken) -> Result<(), SyncError> {
        sync_source_group(
            &self.forward,
            &self.reverse,
            self.reader.as_ref(),
            self.writer.as_ref(),
            self.user_mapper.as_ref(),
            source_id,
            &cancellation,
        )
        .await
    }

    async fn sync_all(&self, cancellation: CancellationToken) -> Result<(), SyncError> {
        // Dispatched per target, not per source: the unit of work that
        // avoids wasted concurrent writes to the same target group
        // (`spec.md` §4.6 `SyncAll`, §9).
        let target_ids: Vec<String> = self.reverse.all_group_ids().map(str::to_owned).collect();
        let reverse = Arc::clone(&self.reverse);
        let reader = Arc::clone(&self.reader);
        let writer = Arc::clone(&self.writer);
        let user_mapper = Arc::clone(&self.user_mapper);

        let outcome = self
            .dispatcher
            .run(target_ids, cancellation.clone(), move |target_id| {
                let reverse = Arc::clone(&reverse);
                let reader = Arc::clone(&reader);
                let writer = Arc::clone(&writer);
                let user_mapper = Arc::clone(&user_mapper);
                let cancellation = cancellation.clone();
                async move { sync_target_group(&reverse, reader.as_ref(), writer.as_ref(), user_mapper.as_ref(), &target_id, &cancellation).await }
            })
            .await;

        SyncError::from_dispatch(outcome)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_system(&self) -> &str {
        &self.source_system
    }

    fn target_system(&self) -> &str {
        &self.target_system
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsync_mappers::{build_bidirectional, IdentityUserMapper, UserMapperTable};
    use groupsync_model::{Group, Mapping};
    use groupsync_test_support::FakeSystem;

    fn mapping_pairs() -> Vec<(String, Mapping<JsonMetadata>)> {
        // spec.md S1/S2: 1->[99,98], 2->[97], 3->[96], 4->[97], 5->[98].
        vec![
            ("1".to_owned(), Mapping::new("99")),
            ("1".to_owned(), Mapping::new("98")),
            ("2".to_owned(), Mapping::new("97")),
            ("3".to_owned(), Mapping::new("96")),
            ("4".to_owned(), Mapping::new("97")),
            ("5".to_owned(), Mapping::new("98")),
        ]
    }

    fn user_mapper() -> Arc<UserMapperTable> {
        Arc::new(
            UserMapperTable::build_strict([
                ("a".to_owned(), "qr".to_owned()),
                ("b".to_owned(), "xy".to_owned()),
                ("c".to_owned(), "uv".to_owned()),
                ("d".to_owned(), "st".to_owned()),
                ("e".to_owned(), "zw".to_owned()),
            ])
            .unwrap(),
        )
    }

    fn source_system() -> Arc<FakeSystem> {
        Arc::new(
            FakeSystem::new()
                .with_group("1", [Member::User(User::new("a")), Member::User(User::new("b")), Member::Group(Group::new("3"))])
                .with_group("2", [Member::User(User::new("c"))])
                .with_group("3", [Member::User(User::new("d")), Member::User(User::new("e"))])
                .with_group("4", [Member::Group(Group::new("1")), Member::Group(Group::new("2"))])
                .with_group("5", [Member::User(User::new("a")), Member::User(User::new("c"))]),
        )
    }

    fn target_system() -> Arc<FakeSystem> {
        Arc::new(FakeSystem::new().with_group("99", []).with_group("98", []).with_group("97", []).with_group("96", []))
    }

    #[tokio::test]
    async fn s1_simple_many_to_many() {
        let (forward, reverse) = build_bidirectional(mapping_pairs());
        let target = target_system();
        let syncer = ManyToManySyncer::new("s1", "S1", "T1", forward, reverse, source_system(), target.clone(), user_mapper());

        syncer.sync("3", CancellationToken::new()).await.unwrap();

        assert_eq!(target.member_ids("96"), vec!["st".to_owned(), "zw".to_owned()]);
        assert!(target.member_ids("97").is_empty());
        assert!(target.member_ids("98").is_empty());
        assert!(target.member_ids("99").is_empty());
    }

    #[tokio::test]
    async fn s2_cross_contribution_union() {
        let (forward, reverse) = build_bidirectional(mapping_pairs());
        let target = target_system();
        let syncer = ManyToManySyncer::new("s1", "S1", "T1", forward, reverse, source_system(), target.clone(), user_mapper());

        syncer.sync("2", CancellationToken::new()).await.unwrap();

        assert_eq!(target.member_ids("97"), vec!["qr", "st", "uv", "xy", "zw"]);
        assert!(target.member_ids("96").is_empty());
        assert!(target.member_ids("98").is_empty());
        assert!(target.member_ids("99").is_empty());
    }

    #[tokio::test]
    async fn no_duplicate_user_ids_after_union() {
        let (forward, reverse) = build_bidirectional(mapping_pairs());
        let target = target_system();
        let syncer = ManyToManySyncer::new("s1", "S1", "T1", forward, reverse, source_system(), target.clone(), Arc::new(IdentityUserMapper));

        syncer.sync("2", CancellationToken::new()).await.unwrap();

        let ids = target.member_ids("97");
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    #[tokio::test]
    async fn user_translation_failure_aborts_target_without_partial_write() {
        struct FailingMapper;
        #[async_trait::async_trait]
        impl UserMapper for FailingMapper {
            async fn mapped_user_id(&self, id: &str) -> Result<Option<String>, groupsync_mappers::UserMapperError> {
                Err(groupsync_mappers::UserMapperError { id: id.to_owned(), reason: "unavailable".to_owned() })
            }
        }

        let (forward, reverse) = build_bidirectional(mapping_pairs());
        let target = target_system();
        let syncer = ManyToManySyncer::new("s1", "S1", "T1", forward, reverse, source_system(), target.clone(), Arc::new(FailingMapper));

        assert!(syncer.sync("3", CancellationToken::new()).await.is_err());
        assert!(target.member_ids("96").is_empty());
    }
}
