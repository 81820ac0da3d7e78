use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::api::{Method, Request, Transport};
use crate::error::ApiError;

type Handler = Arc<dyn Fn(&Request) -> Result<Value, ApiError> + Send + Sync>;

/// In-memory [`Transport`] for unit tests: canned responses per method and path,
/// with every request recorded.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Handler>>,
    calls: Mutex<Vec<Request>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every response is delayed, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn on(&self, method: Method, path: &str, response: Result<Value, ApiError>) -> &Self {
        self.on_fn(method, path, move |_| response.clone())
    }

    pub fn on_fn(
        &self,
        method: Method,
        path: &str,
        handler: impl Fn(&Request) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, path.to_string()), Arc::new(handler));
        self
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let handler = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(request.method, request.path.clone()))
            .cloned();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match handler {
            Some(handler) => handler(&request),
            None => Err(ApiError::not_found(format!(
                "No mock route for {} {}",
                request.method, request.path
            ))),
        }
    }
}
