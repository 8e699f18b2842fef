//! Translation of the robot controller's status vocabulary.
//!
//! The controller reports statuses as snake_case strings. Matching ignores case and
//! surrounding whitespace. A value outside the vocabulary is an
//! [`MissionRunError::UnknownStatus`] and nothing else happens.

use super::states::{InspectionStatus, MissionStatus, TaskStatus};
use crate::error::{MissionRunError, Result};

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Map a controller mission status onto [`MissionStatus`]
pub fn translate_mission_status(value: &str) -> Result<MissionStatus> {
    let status = match normalize(value).as_str() {
        "not_started" => MissionStatus::Pending,
        "in_progress" => MissionStatus::Ongoing,
        "paused" => MissionStatus::Paused,
        "aborted" | "cancelled" => MissionStatus::Aborted,
        "failed" => MissionStatus::Failed,
        // Task level detail keeps the partial failures
        "successful" | "partially_successful" => MissionStatus::Successful,
        _ => return Err(MissionRunError::unknown_status("mission", value)),
    };
    Ok(status)
}

/// Map a controller task status onto [`TaskStatus`]
pub fn translate_task_status(value: &str) -> Result<TaskStatus> {
    let status = match normalize(value).as_str() {
        "not_started" => TaskStatus::NotStarted,
        "in_progress" => TaskStatus::InProgress,
        "successful" => TaskStatus::Successful,
        "partially_successful" => TaskStatus::PartiallySuccessful,
        "failed" | "cancelled" => TaskStatus::Failed,
        _ => return Err(MissionRunError::unknown_status("task", value)),
    };
    Ok(status)
}

/// Map a controller step status onto [`InspectionStatus`]
pub fn translate_step_status(value: &str) -> Result<InspectionStatus> {
    let status = match normalize(value).as_str() {
        "not_started" => InspectionStatus::NotStarted,
        "in_progress" => InspectionStatus::InProgress,
        "successful" => InspectionStatus::Successful,
        "failed" | "cancelled" => InspectionStatus::Failed,
        _ => return Err(MissionRunError::unknown_status("step", value)),
    };
    Ok(status)
}
