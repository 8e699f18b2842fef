//! Filter predicates over mission runs.
//!
//! Each populated parameter becomes exactly one [`Predicate`]; absent parameters
//! contribute nothing, which is the same as an always-true predicate. A
//! [`MissionRunFilter`] is the conjunction of its predicates.

use super::parameters::MissionRunQueryParameters;
use crate::error::ValidationError;
use crate::models::{MissionRun, RobotType};
use crate::state_machine::states::MissionStatus;
use chrono::{DateTime, Utc};

/// Inclusive time range. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Build a window from epoch-second bounds. Returns `None` when both are absent.
    pub fn from_epoch_seconds(
        field: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Option<Self>, ValidationError> {
        if min.is_none() && max.is_none() {
            return Ok(None);
        }

        let min = min.map(|secs| epoch_to_datetime(field, secs)).transpose()?;
        let max = max.map(|secs| epoch_to_datetime(field, secs)).transpose()?;

        if let (Some(lower), Some(upper)) = (min, max) {
            if lower > upper {
                return Err(ValidationError::InvalidFilterValue {
                    field: field.to_string(),
                    reason: format!("minimum {lower} is after maximum {upper}"),
                });
            }
        }

        Ok(Some(Self { min, max }))
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.min.map_or(true, |min| timestamp >= min) && self.max.map_or(true, |max| timestamp <= max)
    }

    /// An unset timestamp is never excluded by a time window
    pub fn admits(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        timestamp.map_or(true, |timestamp| self.contains(timestamp))
    }
}

fn epoch_to_datetime(field: &str, secs: i64) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| ValidationError::InvalidFilterValue {
        field: field.to_string(),
        reason: format!("{secs} is outside the representable time range"),
    })
}

/// One filter condition. String payloads are already trimmed and ASCII-lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    AssetCode(String),
    Status(MissionStatus),
    RobotId(String),
    RobotModelType(RobotType),
    AreaName(String),
    NameContains(String),
    RobotNameContains(String),
    TagContains(String),
    StartTime(TimeWindow),
    EndTime(TimeWindow),
    DesiredStartTime(TimeWindow),
}

impl Predicate {
    pub fn matches(&self, run: &MissionRun) -> bool {
        match self {
            Self::AssetCode(code) => run.asset_code.to_ascii_lowercase() == *code,
            Self::Status(status) => run.status == *status,
            Self::RobotId(robot_id) => run.robot.id == *robot_id,
            Self::RobotModelType(model_type) => run.robot.model_type == *model_type,
            Self::AreaName(name) => run
                .area
                .as_ref()
                .is_some_and(|area| area.name.to_ascii_lowercase() == *name),
            Self::NameContains(needle) => run.name.to_ascii_lowercase().contains(needle.as_str()),
            Self::RobotNameContains(needle) => {
                run.robot.name.to_ascii_lowercase().contains(needle.as_str())
            }
            Self::TagContains(needle) => run
                .tag_ids()
                .any(|tag| tag.to_ascii_lowercase().contains(needle.as_str())),
            Self::StartTime(window) => window.admits(run.start_time),
            Self::EndTime(window) => window.admits(run.end_time),
            Self::DesiredStartTime(window) => window.contains(run.desired_start_time),
        }
    }

    /// Surface parameter name, for logging
    pub fn field(&self) -> &'static str {
        match self {
            Self::AssetCode(_) => "assetCode",
            Self::Status(_) => "status",
            Self::RobotId(_) => "robotId",
            Self::RobotModelType(_) => "robotModelType",
            Self::AreaName(_) => "area",
            Self::NameContains(_) => "nameSearch",
            Self::RobotNameContains(_) => "robotNameSearch",
            Self::TagContains(_) => "tagSearch",
            Self::StartTime(_) => "startTime",
            Self::EndTime(_) => "endTime",
            Self::DesiredStartTime(_) => "desiredStartTime",
        }
    }
}

/// Trim, drop when blank, fold ASCII case.
///
/// Folding is ASCII only so that Postgres, which folds with
/// `lower(.. COLLATE "C")`, selects exactly the same rows.
fn normalized(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Conjunction of predicates. An empty filter matches every mission run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionRunFilter {
    predicates: Vec<Predicate>,
}

impl MissionRunFilter {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn from_parameters(params: &MissionRunQueryParameters) -> Result<Self, ValidationError> {
        let mut filter = Self::match_all();

        if let Some(code) = normalized(params.asset_code.as_ref()) {
            filter = filter.and(Predicate::AssetCode(code));
        }
        if let Some(status) = params.status {
            filter = filter.and(Predicate::Status(status));
        }
        if let Some(robot_id) = params
            .robot_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            filter = filter.and(Predicate::RobotId(robot_id.to_string()));
        }
        if let Some(model_type) = params.robot_model_type {
            filter = filter.and(Predicate::RobotModelType(model_type));
        }
        if let Some(area) = normalized(params.area.as_ref()) {
            filter = filter.and(Predicate::AreaName(area));
        }
        if let Some(name) = normalized(params.name_search.as_ref()) {
            filter = filter.and(Predicate::NameContains(name));
        }
        if let Some(robot_name) = normalized(params.robot_name_search.as_ref()) {
            filter = filter.and(Predicate::RobotNameContains(robot_name));
        }
        if let Some(tag) = normalized(params.tag_search.as_ref()) {
            filter = filter.and(Predicate::TagContains(tag));
        }
        if let Some(window) =
            TimeWindow::from_epoch_seconds("startTime", params.min_start_time, params.max_start_time)?
        {
            filter = filter.and(Predicate::StartTime(window));
        }
        if let Some(window) =
            TimeWindow::from_epoch_seconds("endTime", params.min_end_time, params.max_end_time)?
        {
            filter = filter.and(Predicate::EndTime(window));
        }
        if let Some(window) = TimeWindow::from_epoch_seconds(
            "desiredStartTime",
            params.min_desired_start_time,
            params.max_desired_start_time,
        )? {
            filter = filter.and(Predicate::DesiredStartTime(window));
        }

        Ok(filter)
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, run: &MissionRun) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(run))
    }
}
