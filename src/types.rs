/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entities managed by the dashboard.
/// Each one owns a REST collection, a view-state store and a cache namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Agency,
    Caregiver,
    CaseManager,
    Participant,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Agency,
        Entity::Caregiver,
        Entity::CaseManager,
        Entity::Participant,
    ];

    /// REST collection segment, also the first part of every cache key for the entity
    pub fn path(&self) -> &'static str {
        match self {
            Entity::Agency => "agencies",
            Entity::Caregiver => "caregivers",
            Entity::CaseManager => "case-managers",
            Entity::Participant => "participants",
        }
    }

    /// Human-readable singular name, used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            Entity::Agency => "Agency",
            Entity::Caregiver => "Caregiver",
            Entity::CaseManager => "Case manager",
            Entity::Participant => "Participant",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entity| entity.path() == path)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Mutations supported against an entity collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }
}
