//! # Status Event Ingestor
//!
//! Resolves controller status reports, keyed by external ids, to the mission run,
//! task or inspection they describe and hands them to the state machine.
//!
//! Resolution is top-down (mission, then task, then step) and happens inside the
//! store's atomic read-modify-write, so nothing can change the mission run
//! between resolving an id and applying the status. An id that does not resolve
//! is an expected condition: the controller may still report on deleted or
//! unknown missions. It is logged at `warn` and returned as
//! [`IngestOutcome::NotFound`] with the mission run left untouched.

use crate::error::Result;
use crate::events::StatusChangePublisher;
use crate::persistence::{MissionRunStore, MutationDecision};
use crate::state_machine::{
    translate_mission_status, translate_step_status, translate_task_status, ChangeCause,
    InspectionStatus, MissionRunStateMachine, MissionStatus, StatusEvent, StatusTarget,
    TaskStatus, TransitionReport,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The first external id in a report that did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum UnresolvedReference {
    Mission {
        external_mission_id: String,
    },
    Task {
        external_mission_id: String,
        external_task_id: String,
    },
    Step {
        external_mission_id: String,
        external_task_id: String,
        external_step_id: String,
    },
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mission {
                external_mission_id,
            } => write!(f, "mission '{external_mission_id}'"),
            Self::Task {
                external_mission_id,
                external_task_id,
            } => write!(
                f,
                "task '{external_task_id}' in mission '{external_mission_id}'"
            ),
            Self::Step {
                external_mission_id,
                external_task_id,
                external_step_id,
            } => write!(
                f,
                "step '{external_step_id}' of task '{external_task_id}' in mission '{external_mission_id}'"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The status was applied and committed
    Applied(TransitionReport),
    /// Nothing was changed
    NotFound(UnresolvedReference),
}

impl IngestOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn report(&self) -> Option<&TransitionReport> {
        match self {
            Self::Applied(report) => Some(report),
            Self::NotFound(_) => None,
        }
    }
}

type Transition =
    std::result::Result<TransitionReport, UnresolvedReference>;

pub struct StatusEventIngestor {
    store: Arc<dyn MissionRunStore>,
    publisher: Option<StatusChangePublisher>,
}

impl StatusEventIngestor {
    pub fn new(store: Arc<dyn MissionRunStore>) -> Self {
        Self {
            store,
            publisher: None,
        }
    }

    /// Publish every committed change on `publisher`
    pub fn with_publisher(mut self, publisher: StatusChangePublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Translate a raw controller report and apply it.
    ///
    /// An unrecognised status value fails with `UnknownStatus` before the store is
    /// touched.
    pub async fn handle(&self, event: &StatusEvent) -> Result<IngestOutcome> {
        match event {
            StatusEvent::Mission(event) => {
                let status = translate_mission_status(&event.status)?;
                self.apply_mission_status(&event.external_mission_id, status)
                    .await
            }
            StatusEvent::Task(event) => {
                let status = translate_task_status(&event.status)?;
                self.apply_task_status(
                    &event.external_mission_id,
                    &event.external_task_id,
                    status,
                )
                .await
            }
            StatusEvent::Step(event) => {
                let status = translate_step_status(&event.status)?;
                self.apply_step_status(
                    &event.external_mission_id,
                    &event.external_task_id,
                    &event.external_step_id,
                    status,
                )
                .await
            }
        }
    }

    pub async fn apply_mission_status(
        &self,
        external_mission_id: &str,
        status: MissionStatus,
    ) -> Result<IngestOutcome> {
        self.transition(external_mission_id, move |machine| {
            Ok(machine.apply_mission_status(status))
        })
        .await
    }

    pub async fn apply_task_status(
        &self,
        external_mission_id: &str,
        external_task_id: &str,
        status: TaskStatus,
    ) -> Result<IngestOutcome> {
        let unresolved = UnresolvedReference::Task {
            external_mission_id: external_mission_id.to_string(),
            external_task_id: external_task_id.to_string(),
        };
        self.transition(external_mission_id, move |machine| {
            let task = machine.resolve_task(external_task_id).ok_or(unresolved)?;
            Ok(machine.apply_task_status(task, status))
        })
        .await
    }

    pub async fn apply_step_status(
        &self,
        external_mission_id: &str,
        external_task_id: &str,
        external_step_id: &str,
        status: InspectionStatus,
    ) -> Result<IngestOutcome> {
        let missing_task = UnresolvedReference::Task {
            external_mission_id: external_mission_id.to_string(),
            external_task_id: external_task_id.to_string(),
        };
        let missing_step = UnresolvedReference::Step {
            external_mission_id: external_mission_id.to_string(),
            external_task_id: external_task_id.to_string(),
            external_step_id: external_step_id.to_string(),
        };
        self.transition(external_mission_id, move |machine| {
            let task = machine.resolve_task(external_task_id).ok_or(missing_task)?;
            let step = machine
                .resolve_step(task, external_step_id)
                .ok_or(missing_step)?;
            Ok(machine.apply_inspection_status(step, status))
        })
        .await
    }

    /// Resolve the mission run and run `apply` against it in one atomic store
    /// mutation. A miss below mission level discards the mutation.
    async fn transition<F>(&self, external_mission_id: &str, apply: F) -> Result<IngestOutcome>
    where
        F: FnOnce(&mut MissionRunStateMachine<'_>) -> Transition + Send,
    {
        let mut transition: Option<Transition> = None;
        let stored = self
            .store
            .mutate_by_external_mission_id(
                external_mission_id,
                Box::new(|mission_run| {
                    let mut machine = MissionRunStateMachine::new(mission_run);
                    let result = apply(&mut machine);
                    let decision = match result {
                        Ok(_) => MutationDecision::Commit,
                        Err(_) => MutationDecision::Discard,
                    };
                    transition = Some(result);
                    decision
                }),
            )
            .await?;

        let outcome = match (stored, transition) {
            (Some(_), Some(Ok(report))) => {
                self.committed(external_mission_id, &report);
                IngestOutcome::Applied(report)
            }
            (Some(_), Some(Err(unresolved))) => IngestOutcome::NotFound(unresolved),
            _ => IngestOutcome::NotFound(UnresolvedReference::Mission {
                external_mission_id: external_mission_id.to_string(),
            }),
        };

        if let IngestOutcome::NotFound(unresolved) = &outcome {
            warn!(
                external_mission_id = external_mission_id,
                unresolved = %unresolved,
                "Could not resolve status report, ignoring it"
            );
        }

        Ok(outcome)
    }

    fn committed(&self, external_mission_id: &str, report: &TransitionReport) {
        if report.is_noop() {
            debug!(
                mission_run_id = %report.mission_run_id,
                external_mission_id = external_mission_id,
                "Status report matched the stored status"
            );
            return;
        }

        for change in report.changes.iter().filter(|c| c.cause == ChangeCause::Reported) {
            info!(
                mission_run_id = %report.mission_run_id,
                external_mission_id = external_mission_id,
                entity = entity_name(&change.target),
                from = %change.from,
                status = %change.to,
                "Applied status report"
            );
        }

        if report.recovery_triggered {
            info!(
                mission_run_id = %report.mission_run_id,
                external_mission_id = external_mission_id,
                resets = report.resets().count(),
                "Controller reconnected mid-mission, reset downstream progress"
            );
            for reset in report.resets() {
                debug!(
                    mission_run_id = %report.mission_run_id,
                    entity = ?reset.target,
                    from = %reset.from,
                    status = %reset.to,
                    "Recovery reset"
                );
            }
        }

        if let Some(publisher) = &self.publisher {
            let sent = publisher.publish_report(external_mission_id, report);
            debug!(
                mission_run_id = %report.mission_run_id,
                sent = sent,
                subscribers = publisher.subscriber_count(),
                "Published status changes"
            );
        }
    }
}

fn entity_name(target: &StatusTarget) -> &'static str {
    match target {
        StatusTarget::Mission => "mission",
        StatusTarget::Task { .. } => "task",
        StatusTarget::Inspection { .. } => "inspection",
    }
}
