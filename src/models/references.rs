use serde::{Deserialize, Serialize};
use std::fmt;

/// Robot model families known to the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotType {
    TaroN,
    ExR2,
    Robot,
    Turtlebot,
    AnymalX,
    AnymalD,
}

impl RobotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaroN => "TaroN",
            Self::ExR2 => "ExR2",
            Self::Robot => "Robot",
            Self::Turtlebot => "Turtlebot",
            Self::AnymalX => "AnymalX",
            Self::AnymalD => "AnymalD",
        }
    }
}

impl fmt::Display for RobotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RobotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "taron" => Ok(Self::TaroN),
            "exr2" => Ok(Self::ExR2),
            "robot" => Ok(Self::Robot),
            "turtlebot" => Ok(Self::Turtlebot),
            "anymalx" => Ok(Self::AnymalX),
            "anymald" => Ok(Self::AnymalD),
            _ => Err(format!("Invalid robot model type: {s}")),
        }
    }
}

/// The robot executing a mission run, by id, with the attributes queries filter on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotRef {
    pub id: String,
    pub name: String,
    pub model_type: RobotType,
}

impl RobotRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, model_type: RobotType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            model_type,
        }
    }
}

/// The area a mission run is planned in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRef {
    pub id: String,
    pub name: String,
}

impl AreaRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
