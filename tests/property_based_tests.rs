//! Property-based tests for the query pipeline and the recovery cascade

mod common;

use common::*;
use mission_run_core::query::{
    MissionRunFilter, MissionRunQuery, MissionRunQueryParameters, PageRequest, PageWindow,
    SortSpec,
};
use mission_run_core::state_machine::{
    InspectionStatus, MissionRunStateMachine, MissionStatus, TaskStatus,
};
use mission_run_core::ingestion::StatusEventIngestor;
use mission_run_core::persistence::{InMemoryMissionRunStore, MissionRunStore};
use mission_run_core::MissionRun;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

fn matching_ids(runs: &[MissionRun], params: &MissionRunQueryParameters) -> BTreeSet<String> {
    let filter = MissionRunFilter::from_parameters(params).unwrap();
    runs.iter()
        .filter(|run| filter.matches(run))
        .map(|run| run.id.clone())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Combining filters selects exactly the runs every filter selects on its own
    #[test]
    fn filters_compose_as_intersection(
        runs in mission_runs_strategy(30),
        categorical in categorical_parameters_strategy(),
        text_and_time in text_and_time_parameters_strategy(),
    ) {
        let combined = MissionRunQueryParameters {
            status: categorical.status,
            robot_id: categorical.robot_id.clone(),
            asset_code: categorical.asset_code.clone(),
            robot_model_type: categorical.robot_model_type,
            ..text_and_time.clone()
        };

        let expected: BTreeSet<String> = matching_ids(&runs, &categorical)
            .intersection(&matching_ids(&runs, &text_and_time))
            .cloned()
            .collect();
        prop_assert_eq!(matching_ids(&runs, &combined), expected);
    }

    /// Walking every page yields the full sorted result exactly once
    #[test]
    fn pages_partition_the_sorted_result(
        runs in mission_runs_strategy(25),
        order_by in order_by_strategy(),
        page_size in 1u32..7,
    ) {
        let sort = SortSpec::parse(order_by.as_deref()).unwrap();
        let query = MissionRunQuery::new(MissionRunFilter::match_all(), sort);
        let everything = query.apply(&runs, PageWindow::unbounded());
        prop_assert_eq!(everything.total_count, runs.len() as u64);

        let first = PageRequest::new(1, page_size, 100).unwrap();
        let total_pages = first.total_pages(everything.total_count);

        let mut walked = Vec::new();
        for page_number in 1..=total_pages.max(1) {
            let request = PageRequest::new(page_number, page_size, 100).unwrap();
            prop_assert!(request.ensure_in_range(everything.total_count).is_ok());

            let page = query.apply(&runs, request.window());
            prop_assert_eq!(page.total_count, everything.total_count);
            prop_assert!(page.items.len() <= page_size as usize);
            prop_assert_eq!(
                request.metadata(page.total_count).has_next,
                page_number < total_pages
            );
            walked.extend(page.items);
        }
        prop_assert_eq!(walked, everything.items);

        let past_end = PageRequest::new(total_pages.max(1) + 1, page_size, 100).unwrap();
        prop_assert!(past_end.ensure_in_range(everything.total_count).is_err());
    }

    /// Sorted output never has an adjacent pair out of order, and the order is total
    #[test]
    fn sort_is_a_total_order(
        runs in mission_runs_strategy(25),
        order_by in order_by_strategy(),
    ) {
        let sort = SortSpec::parse(order_by.as_deref()).unwrap();
        let mut sorted = runs.clone();
        sort.sort(&mut sorted);

        for pair in sorted.windows(2) {
            prop_assert_eq!(sort.compare(&pair[0], &pair[1]), Ordering::Less);
        }
    }

    /// A task report of `InProgress` on a mission that is not ongoing resets every
    /// later task and leaves earlier ones untouched
    #[test]
    fn recovery_resets_only_downstream_tasks(
        mission_status in mission_status_strategy(),
        task_statuses in prop::collection::vec(
            (task_status_strategy(), inspection_status_strategy()),
            1..6,
        ),
        reporting in any::<prop::sample::Index>(),
    ) {
        let mut builder = MissionRunBuilder::new("Recovery")
            .with_external_mission_id("ext-prop")
            .with_status(mission_status);
        for (i, (status, inspection_status)) in task_statuses.iter().enumerate() {
            builder = builder.with_task(
                TaskBuilder::new(i as u32 + 1)
                    .with_status(*status)
                    .with_inspection_status(*inspection_status),
            );
        }
        let before = builder.build();
        let reporting = reporting.index(before.tasks.len());

        let mut after = before.clone();
        let mut machine = MissionRunStateMachine::new(&mut after);
        let handle = machine
            .resolve_task(&format!("t{}", reporting + 1))
            .unwrap();
        let report = machine.apply_task_status(handle, TaskStatus::InProgress);

        let recovered = mission_status != MissionStatus::Ongoing;
        prop_assert_eq!(report.recovery_triggered, recovered);
        prop_assert_eq!(after.status, MissionStatus::Ongoing);
        prop_assert_eq!(after.tasks[reporting].status, TaskStatus::InProgress);
        prop_assert_eq!(
            &after.tasks[reporting].inspections,
            &before.tasks[reporting].inspections
        );

        for i in 0..reporting {
            prop_assert_eq!(&after.tasks[i], &before.tasks[i]);
        }
        for i in reporting + 1..after.tasks.len() {
            if recovered {
                prop_assert_eq!(after.tasks[i].status, TaskStatus::NotStarted);
                prop_assert!(after.tasks[i]
                    .inspections
                    .iter()
                    .all(|inspection| inspection.status == InspectionStatus::NotStarted));
            } else {
                prop_assert_eq!(&after.tasks[i], &before.tasks[i]);
            }
        }
    }

    /// Reports applied through the store end in the same state as reports
    /// applied directly to an owned copy
    #[test]
    fn stored_ingestion_matches_direct_application(
        mission_status in mission_status_strategy(),
        reports in prop::collection::vec((0usize..4, task_status_strategy()), 1..12),
    ) {
        let mut builder = MissionRunBuilder::new("Replay")
            .with_external_mission_id("ext-prop")
            .with_status(mission_status);
        for order in 1..=4 {
            builder = builder.with_task(
                TaskBuilder::new(order)
                    .with_status(TaskStatus::Failed)
                    .with_inspection_status(InspectionStatus::Failed),
            );
        }
        let store = Arc::new(InMemoryMissionRunStore::new());
        let created = tokio_test::block_on(store.create(builder.build())).unwrap();
        let ingestor = StatusEventIngestor::new(store.clone());

        let mut expected = created.clone();
        for (task, status) in &reports {
            let task_id = format!("t{}", task + 1);
            let outcome = tokio_test::block_on(
                ingestor.apply_task_status("ext-prop", &task_id, *status),
            )
            .unwrap();
            prop_assert!(outcome.is_applied());

            let mut machine = MissionRunStateMachine::new(&mut expected);
            let handle = machine.resolve_task(&task_id).unwrap();
            machine.apply_task_status(handle, *status);
        }

        let stored = tokio_test::block_on(store.find_by_id(&created.id))
            .unwrap()
            .unwrap();
        prop_assert_eq!(stored, expected);
    }
}
