use crate::error::Result;
use crate::models::{ExternalIdAssignment, MissionRun};
use crate::query::{MissionRunQuery, PageWindow};
use async_trait::async_trait;

/// Whether a mutation's changes should be written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDecision {
    Commit,
    Discard,
}

/// Read-modify-write callback run while the store holds the mission run exclusively
pub type MissionRunMutation<'a> =
    Box<dyn FnOnce(&mut MissionRun) -> MutationDecision + Send + 'a>;

/// One page of a filtered, sorted read plus the size of the whole filtered set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<MissionRun>,
    pub total_count: u64,
}

/// Transactional store of mission run aggregates.
///
/// Each method is atomic on its own. Tasks and inspections are owned by the
/// aggregate and are written and deleted with it.
#[async_trait]
pub trait MissionRunStore: Send + Sync {
    async fn create(&self, mission_run: MissionRun) -> Result<MissionRun>;

    async fn find_by_id(&self, id: &str) -> Result<Option<MissionRun>>;

    /// Remove a mission run, returning what was deleted
    async fn delete(&self, id: &str) -> Result<Option<MissionRun>>;

    /// Resolve a mission run by its external id and run `mutation` against it in a
    /// single atomic read-modify-write.
    ///
    /// Returns `None` when no mission run carries the external id. Otherwise returns
    /// the mission run as it stands after the call: mutated on `Commit`, as stored
    /// on `Discard`.
    async fn mutate_by_external_mission_id(
        &self,
        external_mission_id: &str,
        mutation: MissionRunMutation<'_>,
    ) -> Result<Option<MissionRun>>;

    /// Write controller-assigned external ids onto a stored mission run.
    ///
    /// All ids are applied or none are. Returns `None` when no mission run has
    /// `id`. Fails with `ExternalIdAlreadyAssigned` when an id is already set to a
    /// different value, and with `InvalidMissionRun` when the assignment names an
    /// unknown task or inspection or an external mission id another run holds.
    async fn assign_external_ids(
        &self,
        id: &str,
        assignment: &ExternalIdAssignment,
    ) -> Result<Option<MissionRun>>;

    /// Filtered, sorted page. `total_count` is taken from the same snapshot as
    /// `items`.
    async fn find_page(&self, query: &MissionRunQuery, window: PageWindow) -> Result<QueryPage>;
}
