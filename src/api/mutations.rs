use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use super::remote::{decode, Remote};
use super::transport::Request;
use crate::confirm::DeleteConfirmation;
use crate::entities::{Form, Record};
use crate::error::ApiError;
use crate::types::{Entity, Operation};

/// Keeps a mutation trigger disabled until its call settles.
#[derive(Debug, Default)]
pub struct MutationGate {
    busy: AtomicBool,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, action: &str) -> Result<MutationGuard<'_>, ApiError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(action, "mutation re-triggered while in flight");
            return Err(ApiError::mutation_in_flight(format!(
                "{} is already in progress",
                action
            )));
        }
        Ok(MutationGuard { gate: self })
    }

    pub fn is_pending(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Re-enables the gate when dropped, whether the call succeeded, failed or was cancelled
#[derive(Debug)]
pub struct MutationGuard<'a> {
    gate: &'a MutationGate,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Create, update and delete for one entity. Every success invalidates the
/// entity's cached queries; failures leave the cache untouched.
#[derive(Debug)]
pub struct Mutations<T> {
    remote: Remote,
    create_gate: MutationGate,
    update_gate: MutationGate,
    delete_gate: MutationGate,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Mutations<T> {
    pub fn new(remote: Remote) -> Self {
        Self {
            remote,
            create_gate: MutationGate::new(),
            update_gate: MutationGate::new(),
            delete_gate: MutationGate::new(),
            _record: PhantomData,
        }
    }

    pub fn entity(&self) -> Entity {
        T::ENTITY
    }

    pub fn is_pending(&self, operation: Operation) -> bool {
        match operation {
            Operation::Create => self.create_gate.is_pending(),
            Operation::Update => self.update_gate.is_pending(),
            Operation::Delete => self.delete_gate.is_pending(),
        }
    }

    pub async fn create<F: Form<Record = T>>(&self, form: &F) -> Result<T, ApiError> {
        form.validate()?;
        let _guard = self.create_gate.try_begin("create")?;
        let body = serde_json::to_value(form)?;
        let result = self.remote.send(Request::post(T::ENTITY.path(), body)).await;
        let value = self.settle(Operation::Create, None, result)?;
        decode(value, T::ENTITY, "create")
    }

    pub async fn update<F: Form<Record = T>>(&self, id: i64, form: &F) -> Result<T, ApiError> {
        form.validate()?;
        let _guard = self.update_gate.try_begin("update")?;
        let body = serde_json::to_value(form)?;
        let path = format!("{}/{}", T::ENTITY.path(), id);
        let result = self.remote.send(Request::put(path, body)).await;
        let value = self.settle(Operation::Update, Some(id), result)?;
        decode(value, T::ENTITY, "update")
    }

    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        let _guard = self.delete_gate.try_begin("delete")?;
        let path = format!("{}/{}", T::ENTITY.path(), id);
        let result = self.remote.send(Request::delete(path)).await;
        self.settle(Operation::Delete, Some(id), result)?;
        Ok(())
    }

    /// Delete behind the typed-identifier guard
    pub async fn remove_confirmed(&self, confirmation: &DeleteConfirmation) -> Result<(), ApiError> {
        if confirmation.entity() != T::ENTITY {
            return Err(ApiError::bad_request(format!(
                "Confirmation is for {}, not {}",
                confirmation.entity(),
                T::ENTITY
            )));
        }
        let id = confirmation.confirm()?;
        self.remove(id).await
    }

    fn settle(
        &self,
        operation: Operation,
        id: Option<i64>,
        result: Result<serde_json::Value, ApiError>,
    ) -> Result<serde_json::Value, ApiError> {
        match result {
            Ok(value) => {
                tracing::info!(entity = %T::ENTITY, ?id, "{} {}", T::ENTITY.label(), operation.past_tense());
                self.remote.invalidate(T::ENTITY);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(entity = %T::ENTITY, ?id, ?operation, error = %err, "mutation failed");
                Err(err)
            }
        }
    }
}
