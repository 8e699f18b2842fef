// State machine module for mission run status reconciliation
//
// Maps the robot controller's status vocabulary onto the internal statuses and
// applies reported transitions to the mission run aggregate.

pub mod events;
pub mod mission_run_state_machine;
pub mod states;
pub mod vocabulary;

// Re-export main types for convenient access
pub use events::{MissionStatusEvent, StatusEvent, StepStatusEvent, TaskStatusEvent};
pub use mission_run_state_machine::{
    is_recovery_signal, ChangeCause, MissionRunStateMachine, StatusChange, StatusTarget,
    StepHandle, TaskHandle, TransitionReport,
};
pub use states::{InspectionStatus, MissionStatus, TaskStatus};
pub use vocabulary::{translate_mission_status, translate_step_status, translate_task_status};
