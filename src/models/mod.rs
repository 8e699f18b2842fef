//! # Mission Run Models
//!
//! The mission run aggregate and the references it carries.
//!
//! A [`MissionRun`] owns its [`MissionTask`]s by value, and each task owns its
//! [`Inspection`]s. Nothing below the mission run holds a reference back up the
//! hierarchy; code that needs the owning mission looks it up by id.
//!
//! Robots and areas are not owned. The mission run keeps a [`RobotRef`] and an
//! optional [`AreaRef`]: the id plus the few attributes the query engine filters on.

pub mod external_ids;
pub mod inspection;
pub mod mission_run;
pub mod mission_task;
pub mod references;

pub use external_ids::{ExternalIdAssignment, StepExternalId, TaskExternalIds};
pub use inspection::{Inspection, InspectionType};
pub use mission_run::MissionRun;
pub use mission_task::MissionTask;
pub use references::{AreaRef, RobotRef, RobotType};

/// Generate a new entity id
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
