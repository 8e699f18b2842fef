//! Input validation for newly created mission runs
//!
//! A mission run arrives from the scheduler with its full task and inspection
//! skeleton. The skeleton must describe a run that has not started yet, and its
//! external ids must resolve unambiguously once status reports come in.

use crate::error::ValidationError;
use crate::models::MissionRun;
use crate::state_machine::{InspectionStatus, MissionStatus, TaskStatus};
use std::collections::HashSet;

/// Maximum length for names and free text fields
const MAX_TEXT_LENGTH: usize = 1024;

/// Validates a mission run skeleton before it is first stored
pub fn validate_new_mission_run(run: &MissionRun) -> Result<(), ValidationError> {
    if run.name.trim().is_empty() {
        return Err(invalid("name must not be blank"));
    }
    if run.asset_code.trim().is_empty() {
        return Err(invalid("asset code must not be blank"));
    }
    validate_text_length("name", &run.name)?;
    for (field, value) in [
        ("description", run.description.as_deref()),
        ("comment", run.comment.as_deref()),
    ] {
        if let Some(value) = value {
            validate_text_length(field, value)?;
        }
    }

    if run.status != MissionStatus::Pending {
        return Err(invalid(format!(
            "a new mission run must be pending, got {}",
            run.status
        )));
    }

    validate_task_order(run)?;
    validate_statuses(run)?;
    validate_external_ids(run)
}

fn invalid(reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidMissionRun {
        reason: reason.into(),
    }
}

fn validate_text_length(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(invalid(format!(
            "{field} is too long: {} bytes (max: {MAX_TEXT_LENGTH})",
            value.len()
        )));
    }
    Ok(())
}

/// Task orders must be unique and increase with position
fn validate_task_order(run: &MissionRun) -> Result<(), ValidationError> {
    for pair in run.tasks.windows(2) {
        if pair[1].task_order <= pair[0].task_order {
            return Err(invalid(format!(
                "task order must be strictly increasing, found {} after {}",
                pair[1].task_order, pair[0].task_order
            )));
        }
    }
    Ok(())
}

fn validate_statuses(run: &MissionRun) -> Result<(), ValidationError> {
    for task in &run.tasks {
        if task.status != TaskStatus::NotStarted {
            return Err(invalid(format!(
                "task {} must be not_started, got {}",
                task.task_order, task.status
            )));
        }
        if let Some(inspection) = task
            .inspections
            .iter()
            .find(|inspection| inspection.status != InspectionStatus::NotStarted)
        {
            return Err(invalid(format!(
                "inspection {} of task {} must be not_started, got {}",
                inspection.id, task.task_order, inspection.status
            )));
        }
    }
    Ok(())
}

/// External task ids are unique within the mission, step ids within their task
pub(crate) fn validate_external_ids(run: &MissionRun) -> Result<(), ValidationError> {
    let mut task_ids = HashSet::new();
    for task in &run.tasks {
        if let Some(task_id) = task.external_task_id() {
            if !task_ids.insert(task_id) {
                return Err(invalid(format!("duplicate external task id '{task_id}'")));
            }
        }

        let mut step_ids = HashSet::new();
        for step_id in task
            .inspections
            .iter()
            .filter_map(|inspection| inspection.external_step_id())
        {
            if !step_ids.insert(step_id) {
                return Err(invalid(format!(
                    "duplicate external step id '{step_id}' in task {}",
                    task.task_order
                )));
            }
        }
    }
    Ok(())
}
