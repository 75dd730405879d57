use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoDisputeDocument, MongoMatchDocument, mark_name, state_name, sync_status_name},
};
use crate::dao::{
    match_store::MatchStore,
    models::{DisputeEntity, MatchEntity, MatchOutcome, MatchState, ScoreUpdate, Slot, SyncStatus},
    storage::StorageResult,
};

const MATCH_COLLECTION_NAME: &str = "matches";
const DISPUTE_COLLECTION_NAME: &str = "disputes";

/// MongoDB-backed [`MatchStore`].
///
/// Conditional writes are `update_one` calls whose filter pins both the id
/// and the expected state (plus mark preconditions where relevant); a
/// `matched_count` of zero means the precondition no longer holds and is
/// reported as `Ok(false)`. Every multi-field effect touches a single match
/// document, which MongoDB applies atomically.
#[derive(Clone)]
pub struct MongoMatchStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoMatchStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let matches = database.collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME);
        let state_index = mongodb::IndexModel::builder()
            .keys(doc! {"state": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_state_idx".to_owned()))
                    .build(),
            )
            .build();
        matches
            .create_index(state_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "state",
                source,
            })?;

        let disputes = database.collection::<MongoDisputeDocument>(DISPUTE_COLLECTION_NAME);
        let dispute_index = mongodb::IndexModel::builder()
            .keys(doc! {"match_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("dispute_match_idx".to_owned()))
                    .build(),
            )
            .build();
        disputes
            .create_index(dispute_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: DISPUTE_COLLECTION_NAME,
                index: "match_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn match_collection(&self) -> Collection<MongoMatchDocument> {
        self.database()
            .await
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn dispute_collection(&self) -> Collection<MongoDisputeDocument> {
        self.database()
            .await
            .collection::<MongoDisputeDocument>(DISPUTE_COLLECTION_NAME)
    }

    async fn insert_match(&self, entity: MatchEntity) -> MongoResult<()> {
        let id = entity.id.clone();
        let document: MongoMatchDocument = entity.into();
        self.match_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn find_match(&self, id: String) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .match_collection()
            .await
            .find_one(doc! {"_id": &id})
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn mark_checked_in(&self, id: String, slot: Slot, at: SystemTime) -> MongoResult<bool> {
        let flag_path = format!("players.{}.checked_in", slot.index());
        let at_path = format!("players.{}.checked_in_at", slot.index());
        let filter = doc! {"_id": &id, &flag_path: false};
        let update = doc! {"$set": {
            &flag_path: true,
            &at_path: DateTime::from_system_time(at),
            "updated_at": DateTime::now(),
        }};

        let result = self
            .match_collection()
            .await
            .update_one(filter, update)
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn checked_in_count(&self, id: String) -> MongoResult<Option<usize>> {
        // A fresh read of the document; never a value cached before the
        // caller's own write.
        let document = self
            .match_collection()
            .await
            .find_one(doc! {"_id": &id})
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;
        Ok(document.map(|doc| MatchEntity::from(doc).checked_in_count()))
    }

    async fn transition_state(
        &self,
        id: String,
        from: Vec<MatchState>,
        to: MatchState,
    ) -> MongoResult<bool> {
        let filter = doc! {"_id": &id, "state": {"$in": state_names(&from)}};
        let update = doc! {"$set": {
            "state": state_name(to),
            "updated_at": DateTime::now(),
        }};

        let result = self
            .match_collection()
            .await
            .update_one(filter, update)
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn apply_outcome(
        &self,
        id: String,
        expected: Vec<MatchState>,
        expected_winner: Option<Slot>,
        outcome: MatchOutcome,
    ) -> MongoResult<bool> {
        let mut filter = doc! {"_id": &id, "state": {"$in": state_names(&expected)}};
        if let Some(winner) = expected_winner {
            filter.insert(
                format!("players.{}.mark", winner.index()),
                mark_name(crate::dao::models::WinnerMark::Winner),
            );
        }

        let mut set = doc! {
            "state": state_name(outcome.next_state),
            "updated_at": DateTime::now(),
        };
        for (index, mark) in outcome.marks.into_iter().enumerate() {
            set.insert(format!("players.{index}.mark"), mark_name(mark));
        }
        match outcome.score {
            ScoreUpdate::Keep => {}
            ScoreUpdate::Record(score) => {
                set.insert("reported_score", score);
            }
            ScoreUpdate::Clear => {
                set.insert("reported_score", Bson::Null);
            }
        }

        let result = self
            .match_collection()
            .await
            .update_one(filter, doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn set_sync_status(
        &self,
        id: String,
        status: SyncStatus,
        error: Option<String>,
    ) -> MongoResult<bool> {
        let update = doc! {"$set": {
            "sync_status": sync_status_name(status),
            "sync_error": error.map_or(Bson::Null, Bson::String),
            "updated_at": DateTime::now(),
        }};

        let result = self
            .match_collection()
            .await
            .update_one(doc! {"_id": &id}, update)
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn insert_dispute(&self, dispute: DisputeEntity) -> MongoResult<()> {
        let id = dispute.id;
        let document: MongoDisputeDocument = dispute.into();
        self.dispute_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveDispute { id, source })?;
        Ok(())
    }
}

fn state_names(states: &[MatchState]) -> Vec<Bson> {
    states
        .iter()
        .map(|state| Bson::String(state_name(*state).to_owned()))
        .collect()
}

impl MatchStore for MongoMatchStore {
    fn insert_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_match(entity).await.map_err(Into::into) })
    }

    fn find_match(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn mark_checked_in(
        &self,
        id: &str,
        slot: Slot,
        at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.mark_checked_in(id, slot, at).await.map_err(Into::into) })
    }

    fn checked_in_count(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<usize>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.checked_in_count(id).await.map_err(Into::into) })
    }

    fn transition_state(
        &self,
        id: &str,
        from: Vec<MatchState>,
        to: MatchState,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            store
                .transition_state(id, from, to)
                .await
                .map_err(Into::into)
        })
    }

    fn apply_outcome(
        &self,
        id: &str,
        expected: Vec<MatchState>,
        expected_winner: Option<Slot>,
        outcome: MatchOutcome,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            store
                .apply_outcome(id, expected, expected_winner, outcome)
                .await
                .map_err(Into::into)
        })
    }

    fn set_sync_status(
        &self,
        id: &str,
        status: SyncStatus,
        error: Option<String>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            store
                .set_sync_status(id, status, error)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_dispute(&self, dispute: DisputeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_dispute(dispute).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
