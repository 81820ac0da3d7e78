use super::cache::QueryKey;
use super::mutations::Mutations;
use super::remote::Remote;
use crate::entities::{CaseManager, CaseManagerForm, CaseManagerLink, ParticipantForm};
use crate::error::ApiError;
use crate::types::Entity;

/// Create a case manager from the participant form's inline sub-form, then
/// point the form at it.
///
/// The new row is appended to the cached case-manager option list (unless a row
/// with its id is already there), so the picker can show it without a reload.
pub async fn create_case_manager_inline(
    remote: &Remote,
    case_managers: &Mutations<CaseManager>,
    participant: &mut ParticipantForm,
    form: &CaseManagerForm,
) -> Result<CaseManager, ApiError> {
    let created = case_managers.create(form).await?;

    let item = serde_json::to_value(&created)?;
    remote
        .cache()
        .append_if_absent(&QueryKey::options(Entity::CaseManager), item);

    participant.case_manager = CaseManagerLink::connect(created.id);
    tracing::debug!(case_manager_id = created.id, "participant form connected to new case manager");
    Ok(created)
}
