use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{is_blank, FieldErrors, Form, Record};
use crate::error::ApiError;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Caregiver {
    const ENTITY: Entity = Entity::Caregiver;

    fn id(&self) -> i64 {
        self.id
    }

    fn confirmation_text(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverForm {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl From<&Caregiver> for CaregiverForm {
    fn from(caregiver: &Caregiver) -> Self {
        Self {
            name: caregiver.name.clone(),
            email: caregiver.email.clone(),
            phone: caregiver.phone.clone(),
            is_active: Some(caregiver.is_active),
        }
    }
}

impl Form for CaregiverForm {
    type Record = Caregiver;

    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required.");
        errors.email("email", self.email.as_deref());
        errors.into_result(Entity::Caregiver)
    }
}
