use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::cache::{QueryCache, QueryKey};
use super::envelope::{ListPayload, Page};
use super::transport::{Request, Transport};
use crate::entities::ParticipantCaregiver;
use crate::error::ApiError;
use crate::filter::QueryParams;
use crate::types::Entity;

/// Remote query adapter: turns view parameters into REST calls and decodes the
/// answers, going through the shared [`QueryCache`] for every read.
#[derive(Clone)]
pub struct Remote {
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
    list_page_size: u32,
}

impl fmt::Debug for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remote")
            .field("cache", &self.cache)
            .field("list_page_size", &self.list_page_size)
            .finish_non_exhaustive()
    }
}

impl Remote {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<QueryCache>, list_page_size: u32) -> Self {
        Self {
            transport,
            cache,
            list_page_size: list_page_size.max(1),
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn list_page_size(&self) -> u32 {
        self.list_page_size
    }

    async fn cached(&self, key: &QueryKey, request: Request) -> Result<Value, ApiError> {
        let transport = self.transport.clone();
        self.cache
            .fetch(key, move || async move { transport.send(request).await })
            .await
    }

    /// One page of an entity table
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        entity: Entity,
        params: &QueryParams,
    ) -> Result<Page<T>, ApiError> {
        let key = QueryKey::page(entity, params)?;
        let request = Request::get(entity.path()).with_query(params.to_pairs()?);
        decode(self.cached(&key, request).await?, entity, "page")
    }

    /// First page of the unfiltered collection at the list page size
    pub async fn options_page<T: DeserializeOwned>(&self, entity: Entity) -> Result<Page<T>, ApiError> {
        let request = Request::get(entity.path()).with_query(vec![
            ("page".to_string(), "1".to_string()),
            ("pageSize".to_string(), self.list_page_size.to_string()),
        ]);
        let value = self.cached(&QueryKey::options(entity), request).await?;
        let payload: ListPayload<T> = decode(value, entity, "list")?;
        Ok(payload.into_page())
    }

    /// Picker options for an entity
    pub async fn options<T: DeserializeOwned>(&self, entity: Entity) -> Result<Vec<T>, ApiError> {
        Ok(self.options_page(entity).await?.data)
    }

    /// Whatever the option list cache holds right now, including optimistic
    /// appends, without going to the network.
    pub fn cached_options<T: DeserializeOwned>(&self, entity: Entity) -> Option<Vec<T>> {
        let value = self.cache.get(&QueryKey::options(entity))?;
        serde_json::from_value::<ListPayload<T>>(value)
            .ok()
            .map(ListPayload::into_items)
    }

    pub async fn detail<T: DeserializeOwned>(&self, entity: Entity, id: i64) -> Result<T, ApiError> {
        let request = Request::get(format!("{}/{}", entity.path(), id));
        decode(
            self.cached(&QueryKey::detail(entity, id), request).await?,
            entity,
            "detail",
        )
    }

    pub async fn participant_caregivers(
        &self,
        participant_id: i64,
    ) -> Result<Vec<ParticipantCaregiver>, ApiError> {
        let request = Request::get(format!("{}/{}/caregivers", Entity::Participant.path(), participant_id));
        let value = self
            .cached(&QueryKey::participant_caregivers(participant_id), request)
            .await?;
        decode(value, Entity::Participant, "caregiver assignments")
    }

    /// Ids of the caregivers currently assigned to a participant
    pub async fn participant_caregiver_ids(&self, participant_id: i64) -> Result<Vec<i64>, ApiError> {
        Ok(self
            .participant_caregivers(participant_id)
            .await?
            .into_iter()
            .map(|assignment| assignment.caregiver_id)
            .collect())
    }

    /// Uncached call, used by mutations
    pub async fn send(&self, request: Request) -> Result<Value, ApiError> {
        self.transport.send(request).await
    }

    /// Mark everything cached for `entity` stale
    pub fn invalidate(&self, entity: Entity) -> usize {
        self.cache.invalidate(&QueryKey::entity(entity))
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value, entity: Entity, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(%entity, what, error = %e, "unexpected response shape");
        ApiError::decode(format!("Unexpected {} {} response: {}", entity, what, e))
    })
}
