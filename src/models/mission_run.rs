//! # Mission Run Model
//!
//! One scheduled execution of an inspection mission by a robot.
//!
//! ## Ownership
//!
//! The mission run is the aggregate root. Tasks and their inspections are stored
//! inline and are created, read, mutated and deleted together with it.
//!
//! ## Status
//!
//! `status` is never derived from task detail on read. It is written by the state
//! machine engine in response to controller reports and may lag behind the task
//! statuses until a later report reconciles it.
//!
//! ## External identifiers
//!
//! `external_mission_id`, and the task and step ids below it, are assigned by the
//! robot controller and are the only keys incoming status events carry. They are
//! private and can only be set once through the `assign_*` methods.

use super::inspection::assign_once;
use super::mission_task::MissionTask;
use super::new_id;
use super::references::{AreaRef, RobotRef};
use crate::error::ValidationError;
use crate::state_machine::states::MissionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRun {
    pub id: String,
    /// Mission definition this run was scheduled from
    pub mission_id: Option<String>,
    pub name: String,
    pub status: MissionStatus,
    #[serde(default)]
    external_mission_id: Option<String>,
    pub description: Option<String>,
    pub status_reason: Option<String>,
    pub comment: Option<String>,
    pub asset_code: String,
    pub area: Option<AreaRef>,
    pub robot: RobotRef,
    pub desired_start_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds
    pub estimated_duration: Option<u64>,
    pub tasks: Vec<MissionTask>,
}

impl MissionRun {
    /// Create a pending mission run with no tasks
    pub fn new(
        name: impl Into<String>,
        asset_code: impl Into<String>,
        robot: RobotRef,
        desired_start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            mission_id: None,
            name: name.into(),
            status: MissionStatus::Pending,
            external_mission_id: None,
            description: None,
            status_reason: None,
            comment: None,
            asset_code: asset_code.into(),
            area: None,
            robot,
            desired_start_time,
            start_time: None,
            end_time: None,
            estimated_duration: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_area(mut self, area: AreaRef) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_task(mut self, task: MissionTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_external_mission_id(mut self, external_mission_id: impl Into<String>) -> Self {
        self.external_mission_id = Some(external_mission_id.into());
        self
    }

    pub fn external_mission_id(&self) -> Option<&str> {
        self.external_mission_id.as_deref()
    }

    /// Set the controller's mission id. Once set it can never change.
    pub fn assign_external_mission_id(
        &mut self,
        external_mission_id: impl Into<String>,
    ) -> Result<(), ValidationError> {
        assign_once(
            "MissionRun",
            &mut self.external_mission_id,
            external_mission_id.into(),
        )
    }

    pub fn task_index_by_external_id(&self, external_task_id: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.external_task_id() == Some(external_task_id))
    }

    pub fn task_by_order_mut(&mut self, task_order: u32) -> Option<&mut MissionTask> {
        self.tasks.iter_mut().find(|task| task.task_order == task_order)
    }

    /// Tag ids of all tasks, skipping tasks without one
    pub fn tag_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().filter_map(|task| task.tag_id.as_deref())
    }
}
