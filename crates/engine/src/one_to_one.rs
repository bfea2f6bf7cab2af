use std::sync::Arc;

use async_trait::async_trait;
use groupsync_dispatcher::{CancellationToken, Dispatcher};
use groupsync_io::{Reader, Writer};
use groupsync_mappers::{GroupMapperOneToOne, UserMapper};
use groupsync_model::Member;

use crate::error::SyncError;
use crate::syncer::Syncer;

/// Single source system, single target system, one-to-one group mapping
/// (`spec.md` §4.5).
pub struct OneToOneSyncer {
    name: String,
    source_system: String,
    target_system: String,
    mapper: Arc<GroupMapperOneToOne<()>>,
    reader: Arc<dyn Reader>,
    writer: Arc<dyn Writer>,
    user_mapper: Arc<dyn UserMapper>,
    dispatcher: Dispatcher,
}

impl OneToOneSyncer {
    /// Builds a syncer with a default (CPU-count) dispatcher concurrency.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_system: impl Into<String>,
        target_system: impl Into<String>,
        mapper: GroupMapperOneToOne<()>,
        reader: Arc<dyn Reader>,
        writer: Arc<dyn Writer>,
        user_mapper: Arc<dyn UserMapper>,
    ) -> Self {
        Self {
            name: name.into(),
            source_system: source_system.into(),
            target_system: target_system.into(),
            mapper: Arc::new(mapper),
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

/// The shared logic behind [`Syncer::sync`] and every `sync_all` worker,
/// taking borrowed collaborators so it has no `'static` requirement of its
/// own (`sync_all` supplies owned `Arc` clones instead).
async fn sync_one(
    mapper: &GroupMapperOneToOne<()>,
    reader: &dyn Reader,
    writer: &dyn Writer,
    user_mapper: &dyn UserMapper,
    source_id: &str,
    cancellation: &CancellationToken,
) -> Result<(), SyncError> {
    let target_id = mapper.mapped_group_id(source_id)?;

    if cancellation.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    let (users, traversal_error) = reader.descendants(source_id).await;
    let mut errors: Vec<SyncError> = traversal_error
        .map(|error| error.errors)
        .unwrap_or_default()
        .into_iter()
        .map(|(group_id, source)| SyncError::Fetch { group_id, source })
        .collect();

    if cancellation.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    let mut target_members = Vec::new();
    for user in users {
        match user_mapper.mapped_user(&user).await {
            Ok(Some(target_user)) => target_members.push(Member::User(target_user)),
            Ok(None) => tracing::debug!(user = user.id(), "user mapper returned no mapping, skipping"),
            Err(error) => errors.push(SyncError::from(error)),
        }
    }

    if cancellation.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    // The write is attempted regardless of prior per-user errors; any
    // write failure is appended alongside them rather than replacing them
    // (`spec.md` §4.5 step 3-4).
    if let Err(source) = writer.set_members(&target_id, target_members).await {
        errors.push(SyncError::Write { group_id: target_id, source });
    }

    SyncError::from_many(errors)
}

#[async_trait]
impl Syncer for OneToOneSyncer {
    async fn sync(&self, source_id: &str, cancellation: CancellationToken) -> Result<(), SyncError> {
        sync_one(&self.mapper, self.reader.as_ref(), self.writer.as_ref(), self.user_mapper.as_ref(), source_id, &cancellation).await
    }

    async fn sync_all(&self, cancellation: CancellationToken) -> Result<(), SyncError> {
        let ids: Vec<String> = self.mapper.all_group_ids().map(str::to_owned).collect();
        let mapper = Arc::clone(&self.mapper);
        let reader = Arc::clone(&self.reader);
        let writer = Arc::clone(&self.writer);
        let user_mapper = Arc::clone(&self.user_mapper);

        let outcome = self
            .dispatcher
            .run(ids, cancellation.clone(), move |id| {
                let mapper = Arc::clone(&mapper);
                let reader = Arc::clone(&reader);
                let writer = Arc::clone(&writer);
                let user_mapper = Arc::clone(&user_mapper);
                let cancellation = cancellation.clone();
                async move { sync_one(&mapper, reader.as_ref(), writer.as_ref(), user_mapper.as_ref(), &id, &cancellation).await }
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
