//! Per-mission sequential dispatch.
//!
//! The recovery cascade is only correct when reports for one mission are applied
//! in the order they arrived. [`StatusEventDispatcher`] holds one async mutex per
//! external mission id while a report for that mission is being applied, so
//! reports for the same mission queue up behind each other and reports for
//! different missions run in parallel. A mission's mutex is dropped from the map
//! as soon as nobody is waiting on it.

use super::status_event_ingestor::{IngestOutcome, StatusEventIngestor};
use crate::error::Result;
use crate::state_machine::StatusEvent;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

pub struct StatusEventDispatcher {
    ingestor: Arc<StatusEventIngestor>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl StatusEventDispatcher {
    pub fn new(ingestor: Arc<StatusEventIngestor>) -> Self {
        Self {
            ingestor,
            in_flight: DashMap::new(),
        }
    }

    /// Apply `event` once every earlier event for the same mission has been applied
    pub async fn dispatch(&self, event: StatusEvent) -> Result<IngestOutcome> {
        let key = event.external_mission_id().to_string();
        let lane = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _turn = lane.lock().await;
            trace!(
                external_mission_id = %key,
                event_type = event.event_type(),
                "Dispatching status event"
            );
            self.ingestor.handle(&event).await
        };

        drop(lane);
        self.in_flight
            .remove_if(&key, |_, lane| Arc::strong_count(lane) == 1);

        result
    }

    /// Number of missions with a report being applied or waiting
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MissionRun, MissionTask, RobotRef, RobotType};
    use crate::persistence::{InMemoryMissionRunStore, MissionRunStore};
    use crate::state_machine::{MissionStatus, MissionStatusEvent, TaskStatus, TaskStatusEvent};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn failed_mission(external_mission_id: &str, tasks: u32) -> MissionRun {
        let mut run = MissionRun::new(
            "Deck survey",
            "JSV",
            RobotRef::new("r1", "Taro", RobotType::TaroN),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .with_external_mission_id(external_mission_id);
        run.status = MissionStatus::Failed;
        for order in 1..=tasks {
            let mut task = MissionTask::new(order).with_external_task_id(format!("t{order}"));
            task.status = TaskStatus::Failed;
            run = run.with_task(task);
        }
        run
    }

    fn task_report(external_mission_id: &str, task: &str, status: &str) -> StatusEvent {
        StatusEvent::Task(TaskStatusEvent {
            external_mission_id: external_mission_id.to_string(),
            external_task_id: task.to_string(),
            status: status.to_string(),
        })
    }

    /// Yield until `holders` parties hold the lane: the map, the test and every
    /// queued dispatch
    async fn wait_for_holders(lane: &Arc<Mutex<()>>, holders: usize) {
        while Arc::strong_count(lane) < holders {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_queued_reports_apply_in_arrival_order() {
        let store = Arc::new(InMemoryMissionRunStore::new());
        let held = store.create(failed_mission("ext-m1", 3)).await.unwrap();
        let other = store.create(failed_mission("ext-m2", 1)).await.unwrap();
        let dispatcher = Arc::new(StatusEventDispatcher::new(Arc::new(
            StatusEventIngestor::new(store.clone()),
        )));

        // Occupy ext-m1's lane the way an in-progress report would
        let lane = dispatcher
            .in_flight
            .entry("ext-m1".to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let turn = lane.lock().await;

        // Reconnect on t1 resets t2 and t3, then t3 finishes
        let recovery = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move {
                dispatcher
                    .dispatch(task_report("ext-m1", "t1", "in_progress"))
                    .await
            }
        });
        wait_for_holders(&lane, 3).await;
        let finished = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move {
                dispatcher
                    .dispatch(task_report("ext-m1", "t3", "successful"))
                    .await
            }
        });
        wait_for_holders(&lane, 4).await;

        // Another mission is not held up by ext-m1
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.dispatch(task_report("ext-m2", "t1", "in_progress")),
        )
        .await
        .expect("ext-m2 should not wait on ext-m1")
        .unwrap();
        assert!(outcome.is_applied());
        let stored = store.find_by_id(&other.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MissionStatus::Ongoing);

        let untouched = store.find_by_id(&held.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, MissionStatus::Failed);

        drop(turn);
        drop(lane);
        let recovery = recovery.await.unwrap().unwrap();
        assert!(recovery.report().is_some_and(|report| report.recovery_triggered));
        assert!(finished.await.unwrap().unwrap().is_applied());

        let stored = store.find_by_id(&held.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MissionStatus::Ongoing);
        assert_eq!(stored.tasks[0].status, TaskStatus::InProgress);
        assert_eq!(stored.tasks[1].status, TaskStatus::NotStarted);
        assert_eq!(stored.tasks[2].status, TaskStatus::Successful);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_different_missions_do_not_share_a_lane() {
        let store = Arc::new(InMemoryMissionRunStore::new());
        for mission in 1..=5 {
            let run = MissionRun::new(
                format!("Mission {mission}"),
                "JSV",
                RobotRef::new("r1", "Taro", RobotType::TaroN),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )
            .with_external_mission_id(format!("ext-m{mission}"));
            store.create(run).await.unwrap();
        }

        let dispatcher = StatusEventDispatcher::new(Arc::new(StatusEventIngestor::new(
            store.clone(),
        )));
        let outcomes = futures::future::join_all((1..=5).map(|mission| {
            dispatcher.dispatch(StatusEvent::Mission(MissionStatusEvent {
                external_mission_id: format!("ext-m{mission}"),
                status: "in_progress".to_string(),
            }))
        }))
        .await;

        assert!(outcomes
            .into_iter()
            .all(|outcome| outcome.unwrap().is_applied()));
        assert!(store
            .snapshot()
            .iter()
            .all(|run| run.status == MissionStatus::Ongoing));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_lane_is_released_after_not_found() {
        let store = Arc::new(InMemoryMissionRunStore::new());
        let dispatcher =
            StatusEventDispatcher::new(Arc::new(StatusEventIngestor::new(store)));

        let outcome = dispatcher
            .dispatch(StatusEvent::Mission(MissionStatusEvent {
                external_mission_id: "ext-gone".to_string(),
                status: "failed".to_string(),
            }))
            .await
            .unwrap();

        assert!(!outcome.is_applied());
        assert_eq!(dispatcher.in_flight(), 0);
    }
}
