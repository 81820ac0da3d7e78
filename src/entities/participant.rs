use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{format_date_for_input, is_blank, CaseManagerForm, FieldErrors, Form, NamedRef, Record};
use crate::api::FilterOption;
use crate::error::ApiError;
use crate::types::Entity;

pub const GENDER_FIELD: &str = "gender";
pub const STATUS_FIELD: &str = "isActive";

pub fn gender_options() -> Vec<FilterOption> {
    vec![
        FilterOption::text("Male", "M"),
        FilterOption::text("Female", "F"),
        FilterOption::text("Other", "O"),
    ]
}

pub fn status_options() -> Vec<FilterOption> {
    vec![
        FilterOption::flag("Active", true),
        FilterOption::flag("Inactive", false),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub gender: String,
    pub medicaid_id: String,
    pub dob: String,
    pub location: String,
    pub community: String,
    pub address: String,
    pub primary_phone: String,
    #[serde(default)]
    pub secondary_phone: Option<String>,
    pub is_active: bool,
    pub loc_start_date: String,
    pub loc_end_date: String,
    pub poc_start_date: String,
    pub poc_end_date: String,
    pub units: f64,
    pub hours: f64,
    pub hdm: bool,
    pub adhc: bool,
    #[serde(rename = "cmID")]
    pub cm_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Participant {
    const ENTITY: Entity = Entity::Participant;

    fn id(&self) -> i64 {
        self.id
    }

    /// Participants are confirmed by Medicaid ID rather than name
    fn confirmation_text(&self) -> &str {
        &self.medicaid_id
    }
}

/// One row of `GET /participants/{id}/caregivers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantCaregiver {
    pub caregiver_id: i64,
    pub caregiver: NamedRef,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_by: Option<String>,
}

/// The participant's case manager: an existing one, or one created with the participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseManagerLink {
    Connect { id: Option<i64> },
    Create(CaseManagerForm),
}

impl Default for CaseManagerLink {
    fn default() -> Self {
        CaseManagerLink::Connect { id: None }
    }
}

impl CaseManagerLink {
    pub fn connect(id: i64) -> Self {
        CaseManagerLink::Connect { id: Some(id) }
    }

    pub fn connected_id(&self) -> Option<i64> {
        match self {
            CaseManagerLink::Connect { id } => *id,
            CaseManagerLink::Create(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantForm {
    pub name: String,
    pub gender: String,
    pub medicaid_id: String,
    pub dob: String,
    pub location: String,
    pub community: String,
    pub address: String,
    pub primary_phone: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub secondary_phone: Option<String>,
    pub is_active: bool,
    pub loc_start_date: String,
    pub loc_end_date: String,
    pub poc_start_date: String,
    pub poc_end_date: String,
    pub units: f64,
    pub hours: f64,
    pub hdm: bool,
    pub adhc: bool,
    pub case_manager: CaseManagerLink,
    /// Edited through the assignment endpoints, never part of the participant payload
    #[serde(default, skip_serializing)]
    pub caregiver_ids: Vec<i64>,
}

impl ParticipantForm {
    /// Edit-dialog defaults for an existing participant and its assigned caregivers
    pub fn from_record(participant: &Participant, caregiver_ids: Vec<i64>) -> Self {
        let date = |value: &str| format_date_for_input(Some(value));
        Self {
            name: participant.name.clone(),
            gender: participant.gender.clone(),
            medicaid_id: participant.medicaid_id.clone(),
            dob: date(&participant.dob),
            location: participant.location.clone(),
            community: participant.community.clone(),
            address: participant.address.clone(),
            primary_phone: participant.primary_phone.clone(),
            secondary_phone: participant.secondary_phone.clone(),
            is_active: participant.is_active,
            loc_start_date: date(&participant.loc_start_date),
            loc_end_date: date(&participant.loc_end_date),
            poc_start_date: date(&participant.poc_start_date),
            poc_end_date: date(&participant.poc_end_date),
            units: participant.units,
            hours: participant.hours,
            hdm: participant.hdm,
            adhc: participant.adhc,
            case_manager: CaseManagerLink::connect(participant.cm_id),
            caregiver_ids,
        }
    }
}

impl Form for ParticipantForm {
    type Record = Participant;

    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required.");
        errors.require("gender", &self.gender, "Gender is required.");
        errors.require("medicaidId", &self.medicaid_id, "Medicaid ID is required.");
        errors.require("dob", &self.dob, "Date of birth is required.");
        errors.require("location", &self.location, "Location is required.");
        errors.require("community", &self.community, "Community is required.");
        errors.require("address", &self.address, "Address is required.");
        errors.require("primaryPhone", &self.primary_phone, "Primary phone is required.");
        errors.require("locStartDate", &self.loc_start_date, "Location start date is required.");
        errors.require("locEndDate", &self.loc_end_date, "Location end date is required.");
        errors.require("pocStartDate", &self.poc_start_date, "POC start date is required.");
        errors.require("pocEndDate", &self.poc_end_date, "POC end date is required.");
        if self.units.is_nan() || self.units < 0.0 {
            errors.add("units", "Units must be a positive number.");
        }
        if self.hours.is_nan() || self.hours < 0.0 {
            errors.add("hours", "Hours must be a positive number.");
        }

        match &self.case_manager {
            CaseManagerLink::Connect { id: Some(id) } if *id >= 1 => {}
            CaseManagerLink::Connect { .. } => {
                errors.add("caseManager", "Must either connect or create a case manager.")
            }
            CaseManagerLink::Create(form) => {
                errors.nested("caseManager", form.field_errors("Case manager name is required."))
            }
        }

        errors.into_result(Entity::Participant)
    }
}
