use super::inspection::{assign_once, Inspection};
use super::new_id;
use crate::error::ValidationError;
use crate::state_machine::states::TaskStatus;
use serde::{Deserialize, Serialize};

/// Ordered unit of work within a mission run.
///
/// `task_order` is unique within the owning mission and increases with execution
/// sequence. It is the only ordering the recovery cascade looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionTask {
    pub id: String,
    #[serde(default)]
    external_task_id: Option<String>,
    pub task_order: u32,
    pub tag_id: Option<String>,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub inspections: Vec<Inspection>,
}

impl MissionTask {
    pub fn new(task_order: u32) -> Self {
        Self {
            id: new_id(),
            external_task_id: None,
            task_order,
            tag_id: None,
            description: None,
            status: TaskStatus::NotStarted,
            inspections: Vec::new(),
        }
    }

    pub fn with_tag_id(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn with_inspection(mut self, inspection: Inspection) -> Self {
        self.inspections.push(inspection);
        self
    }

    pub fn with_external_task_id(mut self, external_task_id: impl Into<String>) -> Self {
        self.external_task_id = Some(external_task_id.into());
        self
    }

    pub fn external_task_id(&self) -> Option<&str> {
        self.external_task_id.as_deref()
    }

    /// Set the controller's task id. Once set it can never change.
    pub fn assign_external_task_id(
        &mut self,
        external_task_id: impl Into<String>,
    ) -> Result<(), ValidationError> {
        assign_once("MissionTask", &mut self.external_task_id, external_task_id.into())
    }

    pub fn inspection_index_by_external_step_id(&self, external_step_id: &str) -> Option<usize> {
        self.inspections
            .iter()
            .position(|inspection| inspection.external_step_id() == Some(external_step_id))
    }

    pub fn inspection_by_id_mut(&mut self, inspection_id: &str) -> Option<&mut Inspection> {
        self.inspections
            .iter_mut()
            .find(|inspection| inspection.id == inspection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InspectionType;

    #[test]
    fn test_inspection_lookup_by_external_step_id() {
        let task = MissionTask::new(1)
            .with_inspection(Inspection::new(InspectionType::Image).with_external_step_id("s1"))
            .with_inspection(Inspection::new(InspectionType::Video).with_external_step_id("s2"));

        assert_eq!(task.inspection_index_by_external_step_id("s2"), Some(1));
        assert!(task.inspection_index_by_external_step_id("s3").is_none());
    }

    #[test]
    fn test_inspection_lookup_by_id() {
        let mut task = MissionTask::new(1).with_inspection(Inspection::new(InspectionType::Audio));
        let id = task.inspections[0].id.clone();

        assert_eq!(
            task.inspection_by_id_mut(&id).map(|i| i.inspection_type),
            Some(InspectionType::Audio)
        );
        assert!(task.inspection_by_id_mut("missing").is_none());
    }

    #[test]
    fn test_external_task_id_is_immutable() {
        let mut task = MissionTask::new(1).with_external_task_id("t1");
        assert!(task.assign_external_task_id("t2").is_err());
        assert_eq!(task.external_task_id(), Some("t1"));
    }
}
