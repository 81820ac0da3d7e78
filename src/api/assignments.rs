//! Participant to caregiver assignment editing.
//!
//! There is no bulk endpoint: the desired caregiver set is diffed against the
//! current one and every differing id becomes one assign or unassign call.

use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeSet;

use super::remote::Remote;
use super::transport::{Method, Request};
use crate::error::ApiError;
use crate::types::Entity;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaregiverDiff {
    /// desired - current, ascending
    pub to_assign: Vec<i64>,
    /// current - desired, ascending
    pub to_unassign: Vec<i64>,
}

impl CaregiverDiff {
    pub fn is_empty(&self) -> bool {
        self.to_assign.is_empty() && self.to_unassign.is_empty()
    }

    /// The assigned set once every call has succeeded
    pub fn apply(&self, current: &[i64]) -> BTreeSet<i64> {
        let mut set: BTreeSet<i64> = current.iter().copied().collect();
        for id in &self.to_unassign {
            set.remove(id);
        }
        set.extend(self.to_assign.iter().copied());
        set
    }
}

pub fn diff_caregivers(current: &[i64], desired: &[i64]) -> CaregiverDiff {
    let current: BTreeSet<i64> = current.iter().copied().collect();
    let desired: BTreeSet<i64> = desired.iter().copied().collect();
    CaregiverDiff {
        to_assign: desired.difference(&current).copied().collect(),
        to_unassign: current.difference(&desired).copied().collect(),
    }
}

async fn toggle(remote: &Remote, method: Method, participant_id: i64, caregiver_id: i64) -> Result<Value, ApiError> {
    let path = format!(
        "{}/{}/caregivers/{}",
        Entity::Participant.path(),
        participant_id,
        caregiver_id
    );
    remote.send(Request::new(method, path)).await
}

/// Bring a participant's assignments from `current` to `desired`.
///
/// All calls run concurrently and are allowed to settle before anything is
/// reported. The assignment and participant caches are invalidated either way;
/// the first failure, if any, is returned.
pub async fn sync_caregivers(
    remote: &Remote,
    participant_id: i64,
    current: &[i64],
    desired: &[i64],
) -> Result<CaregiverDiff, ApiError> {
    let diff = diff_caregivers(current, desired);
    if diff.is_empty() {
        return Ok(diff);
    }
    tracing::debug!(participant_id, assign = ?diff.to_assign, unassign = ?diff.to_unassign, "syncing caregiver assignments");

    let assigns = join_all(
        diff.to_assign
            .iter()
            .map(|&id| toggle(remote, Method::Post, participant_id, id)),
    );
    let unassigns = join_all(
        diff.to_unassign
            .iter()
            .map(|&id| toggle(remote, Method::Delete, participant_id, id)),
    );
    let (assigned, unassigned) = futures::join!(assigns, unassigns);

    // assignment lists live under the participant prefix
    remote.invalidate(Entity::Participant);

    let failures: Vec<(i64, ApiError)> = diff
        .to_assign
        .iter()
        .zip(assigned)
        .chain(diff.to_unassign.iter().zip(unassigned))
        .filter_map(|(&id, result)| result.err().map(|err| (id, err)))
        .collect();

    match failures.into_iter().next() {
        None => Ok(diff),
        Some((caregiver_id, err)) => {
            tracing::warn!(participant_id, caregiver_id, error = %err, "caregiver assignment failed");
            Err(err)
        }
    }
}
