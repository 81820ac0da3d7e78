use std::sync::Arc;

use crate::api::{
    EntityQuery, HttpTransport, Mutations, ParticipantEditor, QueryCache, QueryState, Remote,
    Transport,
};
use crate::bridge::SyncBridge;
use crate::config::AppConfig;
use crate::dashboard::{fetch_summary, DashboardSummary};
use crate::entities::{CaseManager, Participant, Record};
use crate::error::ApiError;
use crate::store::{StoreRegistry, ViewStateStore};
use crate::types::Entity;

/// Scoped context for one signed-in dashboard: configuration, the transport,
/// the query cache and the per-entity view-state stores. Nothing here is global,
/// so two sessions never share state.
pub struct AdminSession {
    config: AppConfig,
    remote: Remote,
    stores: StoreRegistry,
}

impl AdminSession {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Read `.env` if present, then build from the environment
    pub fn from_env() -> Result<Self, ApiError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to read .env");
            }
        }
        Self::new(AppConfig::from_env())
    }

    pub fn with_transport(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        let remote = Remote::new(transport, Arc::new(QueryCache::new()), config.lists.page_size);
        tracing::debug!(base_url = %config.http.base_url, environment = ?config.environment, "admin session created");
        Self {
            config,
            remote,
            stores: StoreRegistry::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn remote(&self) -> &Remote {
        &self.remote
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        self.remote.cache()
    }

    pub fn store(&self, entity: Entity) -> Arc<ViewStateStore> {
        self.stores.store(entity)
    }

    /// Table, query and mutations for one entity, all bound to its store
    pub fn feature<T: Record>(&self) -> Feature<T> {
        let store = self.store(T::ENTITY);
        Feature {
            bridge: SyncBridge::new(store.clone()),
            query: Arc::new(EntityQuery::new(self.remote.clone(), store)),
            mutations: Arc::new(Mutations::new(self.remote.clone())),
        }
    }

    pub fn participant_editor(&self) -> ParticipantEditor {
        ParticipantEditor::new(
            self.remote.clone(),
            Arc::new(Mutations::<Participant>::new(self.remote.clone())),
            Arc::new(Mutations::<CaseManager>::new(self.remote.clone())),
        )
    }

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        fetch_summary(&self.remote).await
    }
}

/// One entity screen: table state bridged to the store, the list query, and mutations.
pub struct Feature<T> {
    pub bridge: SyncBridge<T>,
    pub query: Arc<EntityQuery<T>>,
    pub mutations: Arc<Mutations<T>>,
}

impl<T: Record> Feature<T> {
    /// Pull external store changes into the table, fetch the current view and
    /// hand the rows to the table. A failed fetch empties the table.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.bridge.sync_from_store();
        match self.query.refresh().await {
            Ok(page) => {
                self.bridge.table_mut().set_data(page.data, page.total_pages);
                Ok(())
            }
            Err(err) => {
                self.bridge.table_mut().set_data(Vec::new(), 0);
                Err(err)
            }
        }
    }

    pub fn state(&self) -> QueryState<T> {
        self.query.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::entities::Agency;
    use crate::table::{PaginationState, Updater};
    use crate::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn feature_round_trip_through_store_and_table() {
        let mock = Arc::new(MockTransport::new());
        mock.on_fn(Method::Get, "agencies", |req| {
            let page = req
                .query
                .iter()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            Ok(json!({
                "data": [{"id": 1, "name": format!("Agency on page {}", page)}],
                "total": 21, "page": 1, "pageSize": 10, "totalPages": 3, "hasNext": true
            }))
        });
        let session = AdminSession::with_transport(AppConfig::development(), mock.clone());
        let mut agencies = session.feature::<Agency>();

        agencies.refresh().await.unwrap();
        assert_eq!(agencies.bridge.table().page_count(), 3);

        agencies.bridge.on_pagination_change(Updater::apply(|p: &PaginationState| PaginationState {
            page_index: p.page_index + 1,
            ..*p
        }));
        agencies.refresh().await.unwrap();
        assert_eq!(agencies.bridge.table().rows()[0].name, "Agency on page 2");
        assert_eq!(session.store(Entity::Agency).snapshot().page, 2);
    }

    #[tokio::test]
    async fn failed_refresh_clears_previous_rows() {
        let mock = Arc::new(MockTransport::new());
        mock.on_fn(Method::Get, "agencies", |req| {
            if req.query.contains(&("page".to_string(), "2".to_string())) {
                return Err(ApiError::internal_server_error("down"));
            }
            Ok(json!({
                "data": [{"id": 1, "name": "Old"}],
                "total": 11, "page": 1, "pageSize": 10, "totalPages": 2, "hasNext": true
            }))
        });
        let session = AdminSession::with_transport(AppConfig::development(), mock);
        let mut agencies = session.feature::<Agency>();

        agencies.refresh().await.unwrap();
        assert_eq!(agencies.bridge.table().rows()[0].name, "Old");

        session.store(Entity::Agency).set_page(2);
        let err = agencies.refresh().await.unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert!(agencies.state().error().is_some());
        assert!(agencies.bridge.table().rows().is_empty());
        assert_eq!(agencies.bridge.table().page_count(), 0);
    }

    #[test]
    fn sessions_do_not_share_stores() {
        let mock: Arc<dyn Transport> = Arc::new(MockTransport::new());
        let first = AdminSession::with_transport(AppConfig::development(), mock.clone());
        let second = AdminSession::with_transport(AppConfig::development(), mock);
        first.store(Entity::Caregiver).set_page(5);
        assert_eq!(second.store(Entity::Caregiver).snapshot().page, 1);
    }
}
