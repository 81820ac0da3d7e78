use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;

use super::cache::QueryKey;
use super::envelope::Page;
use super::remote::Remote;
use crate::error::ApiError;
use crate::store::ViewStateStore;
use crate::types::Entity;

/// Observable state of an entity list query. Exactly one holds at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Idle,
    /// A fetch is running; `placeholder` is the page shown before it started
    Loading { placeholder: Option<Page<T>> },
    Success(Page<T>),
    Error(ApiError),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading { .. })
    }

    /// Page to render: the fetched one, or the placeholder while loading
    pub fn data(&self) -> Option<&Page<T>> {
        match self {
            QueryState::Success(page) => Some(page),
            QueryState::Loading { placeholder } => placeholder.as_ref(),
            QueryState::Idle | QueryState::Error(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, QueryState::Loading { placeholder: Some(_) })
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Paginated list query bound to one entity's view-state store.
pub struct EntityQuery<T> {
    entity: Entity,
    remote: Remote,
    store: Arc<ViewStateStore>,
    state: watch::Sender<QueryState<T>>,
}

impl<T> EntityQuery<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(remote: Remote, store: Arc<ViewStateStore>) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            entity: store.entity(),
            remote,
            store,
            state,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Cache key of the view the store currently describes
    pub fn key(&self) -> Result<QueryKey, ApiError> {
        Ok(QueryKey::page(self.entity, &self.store.snapshot().to_params())?)
    }

    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Fetch the page for the store's current view. The previous page stays
    /// visible as a placeholder while loading; a failure replaces it.
    pub async fn refresh(&self) -> Result<Page<T>, ApiError> {
        let params = self.store.snapshot().to_params();
        self.state.send_modify(|state| {
            let placeholder = state.data().cloned();
            *state = QueryState::Loading { placeholder };
        });

        match self.remote.list_page::<T>(self.entity, &params).await {
            Ok(page) => {
                self.state.send_replace(QueryState::Success(page.clone()));
                Ok(page)
            }
            Err(err) => {
                tracing::error!(entity = %self.entity, page = params.page, error = %err, "list query failed");
                self.state.send_replace(QueryState::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Refetch after every store mutation and every cache invalidation. Meant to
    /// be spawned and aborted with its feature; failures are reported through the
    /// state, not returned.
    pub async fn run(&self) {
        let mut view = self.store.subscribe();
        let mut invalidations = self.remote.cache().subscribe();
        loop {
            view.borrow_and_update();
            invalidations.borrow_and_update();
            let _ = self.refresh().await;

            tokio::select! {
                changed = view.changed() => if changed.is_err() { break },
                changed = invalidations.changed() => if changed.is_err() { break },
            }
        }
    }
}
