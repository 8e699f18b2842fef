use serde::{Deserialize, Serialize};
use std::fmt;

/// Mission run lifecycle states.
///
/// Declaration order is significant: it is the order used when sorting by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MissionStatus {
    /// Created by the scheduler, not yet picked up by the robot
    Pending,
    /// Robot is executing the mission
    Ongoing,
    /// Execution halted, may resume
    Paused,
    /// Stopped before completion
    Aborted,
    /// Ended with a failure
    Failed,
    /// Ended successfully
    Successful,
}

impl MissionStatus {
    pub const ALL: [MissionStatus; 6] = [
        Self::Pending,
        Self::Ongoing,
        Self::Paused,
        Self::Aborted,
        Self::Failed,
        Self::Successful,
    ];

    /// Only an ongoing mission is being executed by the controller. Any other
    /// status, final-looking or not, can still be overwritten by a later report.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Ongoing)
    }

    /// Position in declaration order, used by sort comparisons
    pub fn rank(&self) -> i16 {
        *self as i16
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::Paused => "paused",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
            Self::Successful => "successful",
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "ongoing" => Ok(Self::Ongoing),
            "paused" => Ok(Self::Paused),
            "aborted" => Ok(Self::Aborted),
            "failed" => Ok(Self::Failed),
            "successful" => Ok(Self::Successful),
            _ => Err(format!("Invalid mission status: {s}")),
        }
    }
}

impl Default for MissionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Mission task states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Successful,
    Failed,
    PartiallySuccessful,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::PartiallySuccessful => "partially_successful",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            "partially_successful" => Ok(Self::PartiallySuccessful),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Inspection (step) states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionStatus {
    NotStarted,
    InProgress,
    Successful,
    Failed,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InspectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid inspection status: {s}")),
        }
    }
}

impl Default for InspectionStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}
