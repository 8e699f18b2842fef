use super::new_id;
use crate::error::ValidationError;
use crate::state_machine::states::InspectionStatus;
use serde::{Deserialize, Serialize};

/// Sensor capture performed by an inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionType {
    Image,
    ThermalImage,
    Video,
    ThermalVideo,
    Audio,
}

/// Smallest unit of tracked progress within a task.
///
/// The robot controller calls these "steps"; `external_step_id` is its id for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: String,
    #[serde(default)]
    external_step_id: Option<String>,
    pub inspection_type: InspectionType,
    pub status: InspectionStatus,
}

impl Inspection {
    pub fn new(inspection_type: InspectionType) -> Self {
        Self {
            id: new_id(),
            external_step_id: None,
            inspection_type,
            status: InspectionStatus::NotStarted,
        }
    }

    pub fn external_step_id(&self) -> Option<&str> {
        self.external_step_id.as_deref()
    }

    /// Set the controller's step id. Once set it can never change.
    pub fn assign_external_step_id(
        &mut self,
        external_step_id: impl Into<String>,
    ) -> Result<(), ValidationError> {
        assign_once("Inspection", &mut self.external_step_id, external_step_id.into())
    }

    pub fn with_external_step_id(mut self, external_step_id: impl Into<String>) -> Self {
        self.external_step_id = Some(external_step_id.into());
        self
    }
}

/// Write an external id into an empty slot. Re-assigning the same value is a no-op.
pub(crate) fn assign_once(
    entity: &'static str,
    slot: &mut Option<String>,
    requested: String,
) -> Result<(), ValidationError> {
    match slot {
        Some(existing) if *existing == requested => Ok(()),
        Some(existing) => Err(ValidationError::ExternalIdAlreadyAssigned {
            entity,
            existing: existing.clone(),
            requested,
        }),
        None => {
            *slot = Some(requested);
            Ok(())
        }
    }
}
