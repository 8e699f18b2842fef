//! # Mission Run State Machine
//!
//! Applies status reports to a mission run that has already been resolved and
//! locked for writing by the caller.
//!
//! ## Transitions
//!
//! - **Mission**: any reported status overwrites the current one, backwards
//!   included. A `Failed` mission can become `Ongoing` again when the controller
//!   regains contact.
//! - **Task**: the reported status overwrites the task's status. When the report is
//!   `InProgress` and the mission is not `Ongoing`, the report is a reconnect
//!   recovery: the mission becomes `Ongoing` and every task ordered after the
//!   reporting task is reset to `NotStarted` together with all of its inspections.
//! - **Inspection**: the reported status overwrites the inspection's status.
//!
//! The machine does no I/O and cannot fail. Everything it changed is returned in a
//! [`TransitionReport`] so the caller can log and publish it after committing.

use super::states::{InspectionStatus, MissionStatus, TaskStatus};
use crate::models::MissionRun;
use serde::{Deserialize, Serialize};

/// Which entity a status change touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum StatusTarget {
    Mission,
    Task { task_id: String, task_order: u32 },
    Inspection { task_id: String, inspection_id: String },
}

/// Why a status changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    /// The controller reported this status for this entity
    Reported,
    /// Reset by the reconnect recovery cascade
    RecoveryReset,
}

/// One status write that changed a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub target: StatusTarget,
    pub from: String,
    pub to: String,
    pub cause: ChangeCause,
}

/// Everything a single transition changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    pub mission_run_id: String,
    pub changes: Vec<StatusChange>,
    pub recovery_triggered: bool,
}

impl TransitionReport {
    fn new(mission_run_id: &str) -> Self {
        Self {
            mission_run_id: mission_run_id.to_string(),
            changes: Vec::new(),
            recovery_triggered: false,
        }
    }

    fn record(&mut self, target: StatusTarget, from: String, to: String, cause: ChangeCause) {
        if from != to {
            self.changes.push(StatusChange {
                target,
                from,
                to,
                cause,
            });
        }
    }

    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes made by the recovery cascade
    pub fn resets(&self) -> impl Iterator<Item = &StatusChange> {
        self.changes
            .iter()
            .filter(|change| change.cause == ChangeCause::RecoveryReset)
    }
}

/// Position of a task inside the mission run the machine was built over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    index: usize,
}

/// Position of an inspection inside the mission run the machine was built over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepHandle {
    task_index: usize,
    inspection_index: usize,
}

/// Whether a task report signals that the controller reconnected mid-mission
pub fn is_recovery_signal(mission_status: MissionStatus, reported: TaskStatus) -> bool {
    reported == TaskStatus::InProgress && !mission_status.is_active()
}

/// Status state machine over one mutably borrowed mission run.
///
/// Handles are only obtainable through `resolve_*` on the same machine, and the
/// machine never adds or removes tasks, so a handle always points at a live entry.
pub struct MissionRunStateMachine<'a> {
    mission_run: &'a mut MissionRun,
}

impl<'a> MissionRunStateMachine<'a> {
    pub fn new(mission_run: &'a mut MissionRun) -> Self {
        Self { mission_run }
    }

    pub fn mission_run(&self) -> &MissionRun {
        self.mission_run
    }

    pub fn resolve_task(&self, external_task_id: &str) -> Option<TaskHandle> {
        self.mission_run
            .task_index_by_external_id(external_task_id)
            .map(|index| TaskHandle { index })
    }

    pub fn resolve_step(&self, task: TaskHandle, external_step_id: &str) -> Option<StepHandle> {
        self.mission_run.tasks[task.index]
            .inspection_index_by_external_step_id(external_step_id)
            .map(|inspection_index| StepHandle {
                task_index: task.index,
                inspection_index,
            })
    }

    /// Overwrite the mission status
    pub fn apply_mission_status(&mut self, status: MissionStatus) -> TransitionReport {
        let mut report = TransitionReport::new(&self.mission_run.id);
        self.set_mission_status(status, ChangeCause::Reported, &mut report);
        report
    }

    /// Overwrite a task status, running the recovery cascade when the report is a
    /// reconnect signal
    pub fn apply_task_status(&mut self, task: TaskHandle, status: TaskStatus) -> TransitionReport {
        let mut report = TransitionReport::new(&self.mission_run.id);
        let recovering = is_recovery_signal(self.mission_run.status, status);

        let reporting_order = {
            let reporting = &mut self.mission_run.tasks[task.index];
            let from = reporting.status;
            reporting.status = status;
            report.record(
                StatusTarget::Task {
                    task_id: reporting.id.clone(),
                    task_order: reporting.task_order,
                },
                from.to_string(),
                status.to_string(),
                ChangeCause::Reported,
            );
            reporting.task_order
        };

        if recovering {
            report.recovery_triggered = true;
            self.set_mission_status(MissionStatus::Ongoing, ChangeCause::RecoveryReset, &mut report);
            self.reset_tasks_after(reporting_order, &mut report);
        }

        report
    }

    /// Overwrite an inspection status
    pub fn apply_inspection_status(
        &mut self,
        step: StepHandle,
        status: InspectionStatus,
    ) -> TransitionReport {
        let mut report = TransitionReport::new(&self.mission_run.id);
        let task = &mut self.mission_run.tasks[step.task_index];
        let inspection = &mut task.inspections[step.inspection_index];

        let from = inspection.status;
        inspection.status = status;
        report.record(
            StatusTarget::Inspection {
                task_id: task.id.clone(),
                inspection_id: inspection.id.clone(),
            },
            from.to_string(),
            status.to_string(),
            ChangeCause::Reported,
        );
        report
    }

    fn set_mission_status(
        &mut self,
        status: MissionStatus,
        cause: ChangeCause,
        report: &mut TransitionReport,
    ) {
        let from = self.mission_run.status;
        self.mission_run.status = status;
        report.record(StatusTarget::Mission, from.to_string(), status.to_string(), cause);
    }

    fn reset_tasks_after(&mut self, task_order: u32, report: &mut TransitionReport) {
        for task in self
            .mission_run
            .tasks
            .iter_mut()
            .filter(|task| task.task_order > task_order)
        {
            let from = task.status;
            task.status = TaskStatus::NotStarted;
            report.record(
                StatusTarget::Task {
                    task_id: task.id.clone(),
                    task_order: task.task_order,
                },
                from.to_string(),
                TaskStatus::NotStarted.to_string(),
                ChangeCause::RecoveryReset,
            );

            for inspection in task.inspections.iter_mut() {
                let from = inspection.status;
                inspection.status = InspectionStatus::NotStarted;
                report.record(
                    StatusTarget::Inspection {
                        task_id: task.id.clone(),
                        inspection_id: inspection.id.clone(),
                    },
                    from.to_string(),
                    InspectionStatus::NotStarted.to_string(),
                    ChangeCause::RecoveryReset,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Inspection, InspectionType, MissionTask, RobotRef, RobotType};
    use chrono::{TimeZone, Utc};

    fn inspection(step_id: &str, status: InspectionStatus) -> Inspection {
        let mut inspection = Inspection::new(InspectionType::Image).with_external_step_id(step_id);
        inspection.status = status;
        inspection
    }

    fn task(order: u32, status: TaskStatus, inspection_status: InspectionStatus) -> MissionTask {
        let mut task = MissionTask::new(order)
            .with_external_task_id(format!("t{order}"))
            .with_inspection(inspection(&format!("t{order}-s1"), inspection_status))
            .with_inspection(inspection(&format!("t{order}-s2"), inspection_status));
        task.status = status;
        task
    }

    fn mission(status: MissionStatus, tasks: Vec<MissionTask>) -> MissionRun {
        let mut run = MissionRun::new(
            "Deck survey",
            "JSV",
            RobotRef::new("r1", "Anymal", RobotType::AnymalD),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .with_external_mission_id("m1");
        run.status = status;
        run.tasks = tasks;
        run
    }

    #[test]
    fn test_recovery_signal_detection() {
        assert!(is_recovery_signal(MissionStatus::Failed, TaskStatus::InProgress));
        assert!(is_recovery_signal(MissionStatus::Pending, TaskStatus::InProgress));
        assert!(!is_recovery_signal(MissionStatus::Ongoing, TaskStatus::InProgress));
        assert!(!is_recovery_signal(MissionStatus::Failed, TaskStatus::Successful));
    }

    #[test]
    fn test_mission_status_overwrite_allows_backwards_transitions() {
        let mut run = mission(MissionStatus::Ongoing, vec![]);
        let mut machine = MissionRunStateMachine::new(&mut run);

        let report = machine.apply_mission_status(MissionStatus::Failed);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(machine.mission_run().status, MissionStatus::Failed);

        let report = machine.apply_mission_status(MissionStatus::Ongoing);
        assert_eq!(report.changes[0].from, "failed");
        assert_eq!(report.changes[0].to, "ongoing");
        assert_eq!(machine.mission_run().status, MissionStatus::Ongoing);
    }

    #[test]
    fn test_recovery_cascade_resets_downstream_tasks() {
        let mut run = mission(
            MissionStatus::Failed,
            vec![
                task(1, TaskStatus::Successful, InspectionStatus::Successful),
                task(2, TaskStatus::Failed, InspectionStatus::Failed),
                task(3, TaskStatus::Successful, InspectionStatus::Successful),
                task(4, TaskStatus::Failed, InspectionStatus::InProgress),
            ],
        );
        let mut machine = MissionRunStateMachine::new(&mut run);
        let handle = machine.resolve_task("t2").unwrap();

        let report = machine.apply_task_status(handle, TaskStatus::InProgress);
        assert!(report.recovery_triggered);

        assert_eq!(run.status, MissionStatus::Ongoing);
        assert_eq!(run.tasks[0].status, TaskStatus::Successful);
        assert!(run.tasks[0]
            .inspections
            .iter()
            .all(|i| i.status == InspectionStatus::Successful));
        assert_eq!(run.tasks[1].status, TaskStatus::InProgress);
        assert!(run.tasks[1]
            .inspections
            .iter()
            .all(|i| i.status == InspectionStatus::Failed));
        for downstream in &run.tasks[2..] {
            assert_eq!(downstream.status, TaskStatus::NotStarted);
            assert!(downstream
                .inspections
                .iter()
                .all(|i| i.status == InspectionStatus::NotStarted));
        }

        // reporting task + mission + 2 tasks + 4 inspections
        assert_eq!(report.changes.len(), 8);
        assert_eq!(report.resets().count(), 7);
    }

    #[test]
    fn test_no_cascade_when_mission_already_ongoing() {
        let tasks = vec![
            task(1, TaskStatus::Successful, InspectionStatus::Successful),
            task(2, TaskStatus::NotStarted, InspectionStatus::NotStarted),
            task(3, TaskStatus::Successful, InspectionStatus::Successful),
        ];
        let mut run = mission(MissionStatus::Ongoing, tasks);
        let before = run.clone();

        let mut machine = MissionRunStateMachine::new(&mut run);
        let handle = machine.resolve_task("t2").unwrap();
        let report = machine.apply_task_status(handle, TaskStatus::InProgress);

        assert!(!report.recovery_triggered);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(run.tasks[1].status, TaskStatus::InProgress);
        assert_eq!(run.tasks[0], before.tasks[0]);
        assert_eq!(run.tasks[2], before.tasks[2]);
        assert_eq!(run.status, MissionStatus::Ongoing);
    }

    #[test]
    fn test_non_in_progress_report_never_cascades() {
        let mut run = mission(
            MissionStatus::Failed,
            vec![
                task(1, TaskStatus::InProgress, InspectionStatus::InProgress),
                task(2, TaskStatus::Successful, InspectionStatus::Successful),
            ],
        );
        let mut machine = MissionRunStateMachine::new(&mut run);
        let handle = machine.resolve_task("t1").unwrap();
        let report = machine.apply_task_status(handle, TaskStatus::Failed);

        assert!(!report.recovery_triggered);
        assert_eq!(run.status, MissionStatus::Failed);
        assert_eq!(run.tasks[1].status, TaskStatus::Successful);
    }

    #[test]
    fn test_inspection_overwrite_does_not_touch_task() {
        let mut run = mission(
            MissionStatus::Ongoing,
            vec![task(1, TaskStatus::InProgress, InspectionStatus::NotStarted)],
        );
        let mut machine = MissionRunStateMachine::new(&mut run);
        let task_handle = machine.resolve_task("t1").unwrap();
        let step = machine.resolve_step(task_handle, "t1-s2").unwrap();

        let report = machine.apply_inspection_status(step, InspectionStatus::Successful);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(run.tasks[0].inspections[1].status, InspectionStatus::Successful);
        assert_eq!(run.tasks[0].inspections[0].status, InspectionStatus::NotStarted);
        assert_eq!(run.tasks[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_resolution_misses() {
        let mut run = mission(
            MissionStatus::Ongoing,
            vec![task(1, TaskStatus::NotStarted, InspectionStatus::NotStarted)],
        );
        let machine = MissionRunStateMachine::new(&mut run);
        assert!(machine.resolve_task("t9").is_none());

        let handle = machine.resolve_task("t1").unwrap();
        assert!(machine.resolve_step(handle, "t1-s9").is_none());
    }

    #[test]
    fn test_repeated_report_is_noop() {
        let mut run = mission(MissionStatus::Paused, vec![]);
        let mut machine = MissionRunStateMachine::new(&mut run);
        assert!(machine.apply_mission_status(MissionStatus::Paused).is_noop());
    }
}
