use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldErrors, Form, Record};
use crate::error::ApiError;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Agency {
    const ENTITY: Entity = Entity::Agency;

    fn id(&self) -> i64 {
        self.id
    }

    fn confirmation_text(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgencyForm {
    pub name: String,
}

impl From<&Agency> for AgencyForm {
    fn from(agency: &Agency) -> Self {
        Self {
            name: agency.name.clone(),
        }
    }
}

impl Form for AgencyForm {
    type Record = Agency;

    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required.");
        errors.into_result(Entity::Agency)
    }
}
