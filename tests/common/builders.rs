//! Test data builders for mission run aggregates

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use mission_run_core::models::{
    AreaRef, Inspection, InspectionType, MissionRun, MissionTask, RobotRef, RobotType,
};
use mission_run_core::persistence::MissionRunStore;
use mission_run_core::state_machine::{InspectionStatus, MissionStatus, TaskStatus};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Builder for a task with `steps` inspections whose external ids are
/// `<task id>-s<n>`
pub struct TaskBuilder {
    order: u32,
    status: TaskStatus,
    inspection_status: InspectionStatus,
    steps: u32,
    tag_id: Option<String>,
}

impl TaskBuilder {
    pub fn new(order: u32) -> Self {
        Self {
            order,
            status: TaskStatus::NotStarted,
            inspection_status: InspectionStatus::NotStarted,
            steps: 2,
            tag_id: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_inspection_status(mut self, status: InspectionStatus) -> Self {
        self.inspection_status = status;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_tag_id(mut self, tag_id: &str) -> Self {
        self.tag_id = Some(tag_id.to_string());
        self
    }

    pub fn build(self) -> MissionTask {
        let external_task_id = format!("t{}", self.order);
        let mut task = MissionTask::new(self.order).with_external_task_id(&external_task_id);
        for step in 1..=self.steps {
            let mut inspection = Inspection::new(InspectionType::Image)
                .with_external_step_id(format!("{external_task_id}-s{step}"));
            inspection.status = self.inspection_status;
            task = task.with_inspection(inspection);
        }
        if let Some(tag_id) = self.tag_id {
            task = task.with_tag_id(tag_id);
        }
        task.status = self.status;
        task
    }
}

/// Builder pattern for mission runs
pub struct MissionRunBuilder {
    name: String,
    external_mission_id: Option<String>,
    status: MissionStatus,
    asset_code: String,
    robot: RobotRef,
    area: Option<AreaRef>,
    desired_start_time: DateTime<Utc>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    tasks: Vec<MissionTask>,
}

impl MissionRunBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            external_mission_id: None,
            status: MissionStatus::Pending,
            asset_code: "JSV".to_string(),
            robot: RobotRef::new("robot-1", "Taro One", RobotType::TaroN),
            area: None,
            desired_start_time: at(1_700_000_000),
            start_time: None,
            end_time: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_external_mission_id(mut self, id: &str) -> Self {
        self.external_mission_id = Some(id.to_string());
        self
    }

    pub fn with_status(mut self, status: MissionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_asset_code(mut self, asset_code: &str) -> Self {
        self.asset_code = asset_code.to_string();
        self
    }

    pub fn with_robot(mut self, id: &str, name: &str, model_type: RobotType) -> Self {
        self.robot = RobotRef::new(id, name, model_type);
        self
    }

    pub fn with_area(mut self, name: &str) -> Self {
        self.area = Some(AreaRef::new(format!("area-{name}"), name));
        self
    }

    pub fn with_desired_start_time(mut self, secs: i64) -> Self {
        self.desired_start_time = at(secs);
        self
    }

    pub fn with_start_time(mut self, secs: i64) -> Self {
        self.start_time = Some(at(secs));
        self
    }

    pub fn with_end_time(mut self, secs: i64) -> Self {
        self.end_time = Some(at(secs));
        self
    }

    pub fn with_task(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task.build());
        self
    }

    pub fn build(self) -> MissionRun {
        let mut run = MissionRun::new(
            self.name,
            self.asset_code,
            self.robot,
            self.desired_start_time,
        );
        if let Some(id) = self.external_mission_id {
            run = run.with_external_mission_id(id);
        }
        if let Some(area) = self.area {
            run = run.with_area(area);
        }
        run.status = self.status;
        run.start_time = self.start_time;
        run.end_time = self.end_time;
        run.tasks = self.tasks;
        run
    }
}

pub async fn seed(store: &dyn MissionRunStore, runs: Vec<MissionRun>) -> Vec<MissionRun> {
    let mut created = Vec::with_capacity(runs.len());
    for run in runs {
        created.push(store.create(run).await.expect("Failed to seed mission run"));
    }
    created
}
