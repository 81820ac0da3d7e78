use crate::entities::Record;
use crate::error::ApiError;
use crate::types::Entity;

/// Client-side gate for destructive deletes: the user must type the row's
/// identifier (name, or Medicaid ID for participants) before confirming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    entity: Entity,
    id: i64,
    expected: String,
    typed: String,
}

impl DeleteConfirmation {
    pub fn for_record<T: Record>(record: &T) -> Self {
        Self {
            entity: T::ENTITY,
            id: record.id(),
            expected: record.confirmation_text().to_string(),
            typed: String::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn input(&mut self, typed: impl Into<String>) {
        self.typed = typed.into();
    }

    /// Whether the confirm action is enabled
    pub fn is_confirmed(&self) -> bool {
        !self.expected.trim().is_empty() && self.typed.trim() == self.expected.trim()
    }

    /// Id to delete, once the typed text matches
    pub fn confirm(&self) -> Result<i64, ApiError> {
        if self.is_confirmed() {
            Ok(self.id)
        } else {
            Err(ApiError::confirmation_mismatch(self.expected.clone()))
        }
    }
}
