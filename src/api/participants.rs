use std::sync::Arc;

use super::assignments::sync_caregivers;
use super::inline::create_case_manager_inline;
use super::mutations::{MutationGate, Mutations};
use super::remote::Remote;
use crate::entities::{
    CaseManager, CaseManagerForm, CaseManagerLink, Form, Participant, ParticipantForm,
};
use crate::error::ApiError;
use crate::types::Entity;

/// Add/edit flow of the participant dialog: the participant payload, the case
/// manager link and the caregiver assignments, in that order.
#[derive(Debug)]
pub struct ParticipantEditor {
    remote: Remote,
    participants: Arc<Mutations<Participant>>,
    case_managers: Arc<Mutations<CaseManager>>,
    save_gate: MutationGate,
}

impl ParticipantEditor {
    pub fn new(
        remote: Remote,
        participants: Arc<Mutations<Participant>>,
        case_managers: Arc<Mutations<CaseManager>>,
    ) -> Self {
        Self {
            remote,
            participants,
            case_managers,
            save_gate: MutationGate::new(),
        }
    }

    /// Dialog defaults: an empty form, or the participant with its assigned caregivers
    pub async fn load(&self, id: Option<i64>) -> Result<ParticipantForm, ApiError> {
        let Some(id) = id else {
            return Ok(ParticipantForm::default());
        };
        let (participant, caregiver_ids) = tokio::try_join!(
            self.remote.detail::<Participant>(Entity::Participant, id),
            self.remote.participant_caregiver_ids(id),
        )?;
        Ok(ParticipantForm::from_record(&participant, caregiver_ids))
    }

    pub fn is_saving(&self) -> bool {
        self.save_gate.is_pending()
    }

    /// Create (`id == None`) or update a participant, then reconcile its caregivers.
    pub async fn save(&self, id: Option<i64>, form: &ParticipantForm) -> Result<Participant, ApiError> {
        form.validate()?;
        let _guard = self.save_gate.try_begin("save participant")?;

        let current = match id {
            Some(id) => self.remote.participant_caregiver_ids(id).await?,
            None => Vec::new(),
        };

        // caregiverIds is never serialized into the participant payload
        let saved = match id {
            Some(id) => self.participants.update(id, form).await?,
            None => self.participants.create(form).await?,
        };
        if matches!(form.case_manager, CaseManagerLink::Create(_)) {
            self.remote.invalidate(Entity::CaseManager);
        }

        sync_caregivers(&self.remote, saved.id, &current, &form.caregiver_ids).await?;
        self.remote.invalidate(Entity::Participant);
        Ok(saved)
    }

    pub async fn create_case_manager_inline(
        &self,
        form: &mut ParticipantForm,
        case_manager: &CaseManagerForm,
    ) -> Result<CaseManager, ApiError> {
        create_case_manager_inline(&self.remote, &self.case_managers, form, case_manager).await
    }
}
