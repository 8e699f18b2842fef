use serde::{Deserialize, Serialize};

/// Mission level status report from the robot controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionStatusEvent {
    pub external_mission_id: String,
    pub status: String,
}

/// Task level status report from the robot controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusEvent {
    pub external_mission_id: String,
    pub external_task_id: String,
    pub status: String,
}

/// Step level status report from the robot controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatusEvent {
    pub external_mission_id: String,
    pub external_task_id: String,
    pub external_step_id: String,
    pub status: String,
}

/// Any inbound status report, tagged by granularity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    Mission(MissionStatusEvent),
    Task(TaskStatusEvent),
    Step(StepStatusEvent),
}

impl StatusEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Mission(_) => "mission",
            Self::Task(_) => "task",
            Self::Step(_) => "step",
        }
    }

    /// The key events are serialised on
    pub fn external_mission_id(&self) -> &str {
        match self {
            Self::Mission(event) => &event.external_mission_id,
            Self::Task(event) => &event.external_mission_id,
            Self::Step(event) => &event.external_mission_id,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Mission(event) => &event.status,
            Self::Task(event) => &event.status,
            Self::Step(event) => &event.status,
        }
    }
}

impl From<MissionStatusEvent> for StatusEvent {
    fn from(event: MissionStatusEvent) -> Self {
        Self::Mission(event)
    }
}

impl From<TaskStatusEvent> for StatusEvent {
    fn from(event: TaskStatusEvent) -> Self {
        Self::Task(event)
    }
}

impl From<StepStatusEvent> for StatusEvent {
    fn from(event: StepStatusEvent) -> Self {
        Self::Step(event)
    }
}
