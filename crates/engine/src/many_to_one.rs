use std::sync::Arc;

use async_trait::async_trait;
use groupsync_dispatcher::{CancellationToken, Dispatcher};
use groupsync_io::{Reader, Writer};
use groupsync_mappers::{GroupMapperOneToMany, GroupMapperOneToOne, UserMapper};
use groupsync_model::{Combine, JsonMetadata, Member, User};
use rustc_hash::FxHashMap;

use crate::error::SyncError;
use crate::syncer::Syncer;

/// Multiple source systems converging on one target system; each source
/// system contributes its own [`Reader`] and [`UserMapper`] keyed by a
/// system tag (`spec.md` §4.7).
pub struct ManyToOneSyncer {
    name: String,
    source_system_label: String,
    target_system: String,
    forward: Arc<GroupMapperOneToOne<JsonMetadata>>,
    reverse: Arc<GroupMapperOneToMany<JsonMetadata>>,
    readers: Arc<FxHashMap<Arc<str>, Arc<dyn Reader>>>,
    user_mappers: Arc<FxHashMap<Arc<str>, Arc<dyn UserMapper>>>,
    writer: Arc<dyn Writer>,
    dispatcher: Dispatcher,
}

impl ManyToOneSyncer {
    /// Builds a syncer from a one-to-one source→target group mapper, a
    /// one-to-many target→source mapper whose mappings carry a system tag,
    /// and one reader/user-mapper pair per source system.
    ///
    /// `source_systems` declares the insertion order used by
    /// [`Syncer::source_system`]'s comma-joined label; it need not match the
    /// iteration order of `readers`/`user_mappers`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        target_system: impl Into<String>,
        forward: GroupMapperOneToOne<JsonMetadata>,
        reverse: GroupMapperOneToMany<JsonMetadata>,
        readers: impl IntoIterator<Item = (Arc<str>, Arc<dyn Reader>)>,
        user_mappers: impl IntoIterator<Item = (Arc<str>, Arc<dyn UserMapper>)>,
        writer: Arc<dyn Writer>,
        source_systems: impl IntoIterator<Item = Arc<str>>,
    ) -> Self {
        let source_system_label = source_systems.into_iter().map(|system| system.to_string()).collect::<Vec<_>>().join(",");
        Self {
            name: name.into(),
            source_system_label,
            target_system: target_system.into(),
            forward: Arc::new(forward),
            reverse: Arc::new(reverse),
            readers: Arc::new(readers.into_iter().collect()),
            user_mappers: Arc::new(user_mappers.into_iter().collect()),
            writer,
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

/// Reconciles a single target group from every contributing source-system
/// group listed in `reverse` (`spec.md` §4.7 steps 2-5).
#[allow(clippy::too_many_arguments)]
async fn sync_target(
    reverse: &GroupMapperOneToMany<JsonMetadata>,
    readers: &FxHashMap<Arc<str>, Arc<dyn Reader>>,
    user_mappers: &FxHashMap<Arc<str>, Arc<dyn UserMapper>>,
    writer: &dyn Writer,
    target_id: &str,
    cancellation: &CancellationToken,
) -> Result<(), SyncError> {
    let contributing = reverse.mappings(target_id)?;

    if cancellation.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    let mut merged: FxHashMap<String, (User, Option<JsonMetadata>)> = FxHashMap::default();
    let mut errors = Vec::new();

    for mapping in contributing {
        if cancellation.is_cancelled() {
            errors.push(SyncError::Cancelled);
            return SyncError::from_many(errors);
        }

        let Some(system) = mapping.system() else {
            errors.push(SyncError::Configuration(format!("mapping for {} is missing a system tag", mapping.group_id())));
            continue;
        };
        let Some(reader) = readers.get(system) else {
            errors.push(SyncError::Configuration(format!("no reader registered for system {system}")));
            continue;
        };

        let (users, traversal_error) = reader.descendants(mapping.group_id()).await;
        errors.extend(
            traversal_error
                .map(|error| error.errors)
                .unwrap_or_default()
                .into_iter()
                .map(|(group_id, source)| SyncError::Fetch { group_id, source }),
        );

        for user in users {
            let stamped = user.with_system(Arc::clone(system));
            let contribution = mapping.metadata().cloned();
            merged
                .entry(stamped.id().to_owned())
                .and_modify(|(_, existing)| *existing = existing.take().combine(contribution.clone()))
                .or_insert_with(|| (stamped, contribution));
        }
    }

    if cancellation.is_cancelled() {
        errors.push(SyncError::Cancelled);
        return SyncError::from_many(errors);
    }

    let mut target_members = Vec::with_capacity(merged.len());
    for (user, _metadata) in merged.into_values() {
        let Some(system) = user.system() else {
            errors.push(SyncError::Configuration(format!("merged user {} carries no system tag", user.id())));
            continue;
        };
        let Some(user_mapper) = user_mappers.get(system) else {
            errors.push(SyncError::Configuration(format!("no user mapper registered for system {system}")));
            continue;
        };

        match user_mapper.mapped_user(&user).await {
            Ok(Some(target_user)) => target_members.push(Member::User(target_user)),
            Ok(None) => tracing::debug!(user = user.id(), "user mapper returned no mapping, skipping"),
            Err(error) => errors.push(SyncError::from(error)),
        }
    }

    // Write failure is terminal for this target and replaces whatever was
    // aggregated so far (`spec.md` §4.7 step 5).
    match writer.set_members(target_id, target_members).await {
        Ok(()) => SyncError::from_many(errors),
        Err(source) => Err(SyncError::Write { group_id: target_id.to_owned(), source }),
    }
}

#[allow(clippy::too_many_arguments)]
async fn sync_source(
    forward: &GroupMapperOneToOne<JsonMetadata>,
    reverse: &GroupMapperOneToMany<JsonMetadata>,
    readers: &FxHashMap<Arc<str>, Arc<dyn Reader>>,
    user_mappers: &FxHashMap<Arc<str>, Arc<dyn UserMapper>>,
    writer: &dyn Writer,
    source_id: &str,
    cancellation: &CancellationToken,
) -> Result<(), SyncError> {
    let target_id = forward.mapped_group_id(source_id)?;
    sync_target(reverse, readers, user_mappers, writer, &target_id, cancellation).await
}

#[async_trait]
impl Syncer for ManyToOneSyncer {
    async fn sync(&self, source_id: &str, cancellation: CancellationToken) -> Result<(), SyncError> {
        sync_source(&self.forward, &self.reverse, &self.readers, &self.user_mappers, self.writer.as_ref(), source_id, &cancellation).await
    }

    async fn sync_all(&self, cancellation: CancellationToken) -> Result<(), SyncError> {
        let target_ids: Vec<String> = self.reverse.all_group_ids().map(str::to_owned).collect();
        let reverse = Arc::clone(&self.reverse);
        let readers = Arc::clone(&self.readers);
        let user_mappers = Arc::clone(&self.user_mappers);
        let writer = Arc::clone(&self.writer);

        let outcome = self
            .dispatcher
            .run(target_ids, cancellation.clone(), move |target_id| {
                let reverse = Arc::clone(&reverse);
                let readers = Arc::clone(&readers);
                let user_mappers = Arc::clone(&user_mappers);
                let writer = Arc::clone(&writer);
                let cancellation = cancellation.clone();
                async move { sync_target(&reverse, &readers, &user_mappers, writer.as_ref(), &target_id, &cancellation).await }
            })
            .await;

        SyncError::from_dispatch(outcome)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_system(&self) -> &str {
        &self.source_system_label
    }

    fn target_system(&self) -> &str {
        &self.target_system
    }
}
