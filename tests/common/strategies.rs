#![allow(dead_code)]

use super::builders::{MissionRunBuilder, TaskBuilder};
use mission_run_core::models::{MissionRun, RobotType};
use mission_run_core::query::MissionRunQueryParameters;
use mission_run_core::state_machine::{InspectionStatus, MissionStatus, TaskStatus};
use proptest::prelude::*;

pub fn mission_status_strategy() -> impl Strategy<Value = MissionStatus> {
    prop::sample::select(MissionStatus::ALL.to_vec())
}

pub fn task_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(vec![
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Successful,
        TaskStatus::Failed,
        TaskStatus::PartiallySuccessful,
    ])
}

pub fn inspection_status_strategy() -> impl Strategy<Value = InspectionStatus> {
    prop::sample::select(vec![
        InspectionStatus::NotStarted,
        InspectionStatus::InProgress,
        InspectionStatus::Successful,
        InspectionStatus::Failed,
    ])
}

pub fn robot_type_strategy() -> impl Strategy<Value = RobotType> {
    prop::sample::select(vec![RobotType::TaroN, RobotType::AnymalD, RobotType::ExR2])
}

/// Mission names from a small vocabulary so that ties and substring hits are common
pub fn mission_name_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["Deck", "Pump", "Valve", "deck"]),
        prop::sample::select(vec!["Scan", "Round", "Check"]),
    )
        .prop_map(|(a, b)| format!("{a} {b}"))
}

pub fn mission_run_strategy() -> impl Strategy<Value = MissionRun> {
    (
        mission_name_strategy(),
        mission_status_strategy(),
        prop::sample::select(vec!["JSV", "HUA", "jsv"]),
        (0u8..3, robot_type_strategy()),
        prop::option::of(prop::sample::select(vec!["Weather Deck", "Cellar"])),
        0i64..100,
        prop::option::of(0i64..100),
        prop::option::of(0i64..100),
        prop::option::of(prop::sample::select(vec!["313-PA-101A", "20-VA-7", "313-PA-2"])),
    )
        .prop_map(
            |(name, status, asset, (robot, model), area, desired, start, end, tag)| {
                let mut task = TaskBuilder::new(1).with_steps(0);
                if let Some(tag) = tag {
                    task = task.with_tag_id(tag);
                }
                let mut builder = MissionRunBuilder::new(&name)
                    .with_status(status)
                    .with_asset_code(asset)
                    .with_robot(&format!("robot-{robot}"), &format!("Robot {robot}"), model)
                    .with_desired_start_time(desired)
                    .with_task(task);
                if let Some(area) = area {
                    builder = builder.with_area(area);
                }
                if let Some(start) = start {
                    builder = builder.with_start_time(start);
                }
                if let Some(end) = end {
                    builder = builder.with_end_time(end);
                }
                builder.build()
            },
        )
}

pub fn mission_runs_strategy(max: usize) -> impl Strategy<Value = Vec<MissionRun>> {
    prop::collection::vec(mission_run_strategy(), 0..max)
}

fn window_strategy() -> impl Strategy<Value = (Option<i64>, Option<i64>)> {
    (prop::option::of(0i64..50), prop::option::of(50i64..100))
}

/// Filters over categorical fields
pub fn categorical_parameters_strategy() -> impl Strategy<Value = MissionRunQueryParameters> {
    (
        prop::option::of(mission_status_strategy()),
        prop::option::of(prop::sample::select(vec!["robot-0", "robot-1"])),
        prop::option::of(prop::sample::select(vec!["jsv", " HUA "])),
        prop::option::of(robot_type_strategy()),
    )
        .prop_map(|(status, robot_id, asset_code, robot_model_type)| MissionRunQueryParameters {
            status,
            robot_id: robot_id.map(str::to_string),
            asset_code: asset_code.map(str::to_string),
            robot_model_type,
            ..Default::default()
        })
}

/// Filters over free text, area and time windows
pub fn text_and_time_parameters_strategy() -> impl Strategy<Value = MissionRunQueryParameters> {
    (
        prop::option::of(prop::sample::select(vec!["deck", "SCAN", "pump r"])),
        prop::option::of(prop::sample::select(vec!["weather deck", "cellar"])),
        prop::option::of(prop::sample::select(vec!["pa-", "va"])),
        prop::option::of(prop::sample::select(vec!["robot 1", "ROBOT"])),
        window_strategy(),
        window_strategy(),
    )
        .prop_map(
            |(name, area, tag, robot_name, (min_start, max_start), (min_desired, max_desired))| {
                MissionRunQueryParameters {
                    name_search: name.map(str::to_string),
                    area: area.map(str::to_string),
                    tag_search: tag.map(str::to_string),
                    robot_name_search: robot_name.map(str::to_string),
                    min_start_time: min_start,
                    max_start_time: max_start,
                    min_desired_start_time: min_desired,
                    max_desired_start_time: max_desired,
                    ..Default::default()
                }
            },
        )
}

pub fn order_by_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "name",
        "status desc,name",
        "startTime desc",
        "assetCode,endTime",
        "desiredStartTime desc,status",
        "id",
    ]))
    .prop_map(|order_by| order_by.map(str::to_string))
}
