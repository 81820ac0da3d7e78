use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{is_blank, FieldErrors, Form, NamedRef, Record};
use crate::error::ApiError;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseManager {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub agency_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<NamedRef>,
}

impl Record for CaseManager {
    const ENTITY: Entity = Entity::CaseManager;

    fn id(&self) -> i64 {
        self.id
    }

    fn confirmation_text(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseManagerForm {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub phone: Option<String>,
    /// 0 until an agency is picked
    pub agency_id: i64,
}

impl CaseManagerForm {
    /// Field errors without wrapping, so the participant form can nest them
    pub(crate) fn field_errors(&self, name_message: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, name_message);
        errors.email("email", self.email.as_deref());
        if self.agency_id < 1 {
            errors.add("agencyId", "Agency is required.");
        }
        errors
    }
}

impl From<&CaseManager> for CaseManagerForm {
    fn from(cm: &CaseManager) -> Self {
        Self {
            name: cm.name.clone(),
            email: cm.email.clone(),
            phone: cm.phone.clone(),
            agency_id: cm.agency_id,
        }
    }
}

impl Form for CaseManagerForm {
    type Record = CaseManager;

    fn validate(&self) -> Result<(), ApiError> {
        self.field_errors("Name is required.")
            .into_result(Entity::CaseManager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agency_is_required() {
        let form = CaseManagerForm {
            name: "Jo".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field_errors().unwrap()["agencyId"], "Agency is required.");
    }

    #[test]
    fn decodes_row_with_nested_agency() {
        let cm: CaseManager = serde_json::from_value(json!({
            "id": 5, "name": "Jo", "email": null, "phone": "555", "agencyId": 2,
            "agency": {"id": 2, "name": "North"}
        }))
        .unwrap();
        assert_eq!(cm.agency.unwrap().name, "North");
        assert_eq!(cm.email, None);
    }
}
