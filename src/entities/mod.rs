//! Typed records and forms for the four dashboard entities.

pub mod agency;
pub mod caregiver;
pub mod case_manager;
pub mod participant;

pub use agency::{Agency, AgencyForm};
pub use caregiver::{Caregiver, CaregiverForm};
pub use case_manager::{CaseManager, CaseManagerForm};
pub use participant::{
    gender_options, status_options, CaseManagerLink, Participant, ParticipantCaregiver,
    ParticipantForm,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::types::Entity;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// A row returned by the REST collection of its entity
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ENTITY: Entity;

    fn id(&self) -> i64;

    /// What the user must type to confirm deleting this row
    fn confirmation_text(&self) -> &str;
}

/// Payload for creating or updating a [`Record`]
pub trait Form: Serialize + Send + Sync {
    type Record: Record;

    /// Field-level checks run before anything reaches the network
    fn validate(&self) -> Result<(), ApiError>;
}

/// `{id, name}` reference used by pickers and nested relations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// Collects per-field validation messages; the first message for a field wins.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    /// Optional email: blank passes, anything else must look like an address
    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if !EMAIL_REGEX.is_match(value) {
                self.add(field, "Invalid email.");
            }
        }
    }

    /// Merge errors of a nested form under `prefix.`
    pub fn nested(&mut self, prefix: &str, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(&format!("{}.{}", prefix, field), &message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self, entity: Entity) -> Result<(), ApiError> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(ApiError::validation_error(
            format!("{} form has invalid fields", entity.label()),
            self.0,
        ))
    }
}

/// Optional text fields left blank in a form are not sent at all
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Render a timestamp or date string as `yyyy-MM-dd` for date inputs.
/// Missing or unparseable input renders as an empty string.
pub fn format_date_for_input(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return String::new();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => String::new(),
    }
}
