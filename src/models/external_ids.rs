use super::MissionRun;
use crate::error::ValidationError;
use crate::validation::validate_external_ids;
use serde::{Deserialize, Serialize};

/// External ids the robot controller hands out after a mission run is stored.
///
/// Tasks are addressed by `task_order` and inspections by their own id, since
/// neither has an external id yet. Every id is write-once: assigning the value a
/// slot already holds is accepted, any other value is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdAssignment {
    #[serde(default)]
    pub external_mission_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskExternalIds>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExternalIds {
    pub task_order: u32,
    #[serde(default)]
    pub external_task_id: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepExternalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExternalId {
    pub inspection_id: String,
    pub external_step_id: String,
}

impl ExternalIdAssignment {
    pub fn mission(external_mission_id: impl Into<String>) -> Self {
        Self {
            external_mission_id: Some(external_mission_id.into()),
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: TaskExternalIds) -> Self {
        self.tasks.push(task);
        self
    }

    /// Write every id into `run`.
    ///
    /// `run` may be partly written when this fails, so callers apply it to a
    /// working copy and only keep the copy on success.
    pub fn apply(&self, run: &mut MissionRun) -> Result<(), ValidationError> {
        if let Some(external_mission_id) = &self.external_mission_id {
            run.assign_external_mission_id(external_mission_id.as_str())?;
        }

        for ids in &self.tasks {
            let task = run.task_by_order_mut(ids.task_order).ok_or_else(|| {
                ValidationError::InvalidMissionRun {
                    reason: format!("no task with order {}", ids.task_order),
                }
            })?;
            if let Some(external_task_id) = &ids.external_task_id {
                task.assign_external_task_id(external_task_id.as_str())?;
            }

            for step in &ids.steps {
                let task_order = task.task_order;
                let inspection = task.inspection_by_id_mut(&step.inspection_id).ok_or_else(|| {
                    ValidationError::InvalidMissionRun {
                        reason: format!(
                            "no inspection '{}' in task {task_order}",
                            step.inspection_id
                        ),
                    }
                })?;
                inspection.assign_external_step_id(step.external_step_id.as_str())?;
            }
        }

        validate_external_ids(run)
    }
}

impl TaskExternalIds {
    pub fn new(task_order: u32) -> Self {
        Self {
            task_order,
            external_task_id: None,
            steps: Vec::new(),
        }
    }

    pub fn with_external_task_id(mut self, external_task_id: impl Into<String>) -> Self {
        self.external_task_id = Some(external_task_id.into());
        self
    }

    pub fn with_step(
        mut self,
        inspection_id: impl Into<String>,
        external_step_id: impl Into<String>,
    ) -> Self {
        self.steps.push(StepExternalId {
            inspection_id: inspection_id.into(),
            external_step_id: external_step_id.into(),
        });
        self
    }
}
