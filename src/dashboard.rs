use serde::Serialize;

use crate::api::Remote;
use crate::entities::participant::STATUS_FIELD;
use crate::entities::{Caregiver, CaseManager, Participant};
use crate::error::ApiError;
use crate::filter::FilterValue;
use crate::types::Entity;

/// Counts shown on the dashboard landing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub participants: u64,
    pub active_participants: u64,
    pub inactive_participants: u64,
    pub case_managers: u64,
    pub caregivers: u64,
}

/// Fetch the three lists concurrently and derive the summary. Active/inactive
/// come from the server's `isActive` counts when present, otherwise from the rows.
pub async fn fetch_summary(remote: &Remote) -> Result<DashboardSummary, ApiError> {
    let (participants, case_managers, caregivers) = tokio::try_join!(
        remote.options_page::<Participant>(Entity::Participant),
        remote.options_page::<CaseManager>(Entity::CaseManager),
        remote.options_page::<Caregiver>(Entity::Caregiver),
    )?;

    let counted = |flag: bool| {
        participants
            .data
            .iter()
            .filter(|p| p.is_active == flag)
            .count() as u64
    };
    let active = participants
        .count_for(STATUS_FIELD, &FilterValue::Bool(true))
        .unwrap_or_else(|| counted(true));
    let inactive = participants
        .count_for(STATUS_FIELD, &FilterValue::Bool(false))
        .unwrap_or_else(|| counted(false));

    Ok(DashboardSummary {
        participants: participants.total,
        active_participants: active,
        inactive_participants: inactive,
        case_managers: case_managers.total,
        caregivers: caregivers.total,
    })
}
