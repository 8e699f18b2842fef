//! # Mission Run Service
//!
//! The operations the HTTP layer calls: list with query parameters, read by id,
//! delete by id, create from a scheduler-supplied skeleton, and record the
//! external ids the robot controller assigns once the run is dispatched.

use crate::config::QueryConfig;
use crate::error::{MissionRunError, Result};
use crate::models::{ExternalIdAssignment, MissionRun};
use crate::persistence::MissionRunStore;
use crate::query::{MissionRunQueryEngine, MissionRunQueryParameters, PagedList};
use crate::validation::validate_new_mission_run;
use std::sync::Arc;
use tracing::info;

const ENTITY: &str = "MissionRun";

pub struct MissionRunService {
    store: Arc<dyn MissionRunStore>,
    query_engine: MissionRunQueryEngine,
}

impl MissionRunService {
    pub fn new(store: Arc<dyn MissionRunStore>, query_config: QueryConfig) -> Self {
        Self {
            query_engine: MissionRunQueryEngine::new(store.clone(), query_config),
            store,
        }
    }

    pub async fn create(&self, mission_run: MissionRun) -> Result<MissionRun> {
        validate_new_mission_run(&mission_run)?;
        let created = self.store.create(mission_run).await?;
        info!(
            mission_run_id = %created.id,
            tasks = created.tasks.len(),
            "Created mission run"
        );
        Ok(created)
    }

    pub async fn read_by_id(&self, id: &str) -> Result<MissionRun> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| MissionRunError::not_found(ENTITY, id))
    }

    /// Delete a mission run with all of its tasks and inspections
    pub async fn delete(&self, id: &str) -> Result<MissionRun> {
        let deleted = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| MissionRunError::not_found(ENTITY, id))?;
        info!(mission_run_id = %deleted.id, "Deleted mission run");
        Ok(deleted)
    }

    /// Record controller-assigned external ids so status reports can resolve the
    /// mission run. Ids already set are never changed.
    pub async fn assign_external_ids(
        &self,
        id: &str,
        assignment: &ExternalIdAssignment,
    ) -> Result<MissionRun> {
        let updated = self
            .store
            .assign_external_ids(id, assignment)
            .await?
            .ok_or_else(|| MissionRunError::not_found(ENTITY, id))?;
        info!(
            mission_run_id = %updated.id,
            external_mission_id = updated.external_mission_id().unwrap_or_default(),
            "Assigned external ids"
        );
        Ok(updated)
    }

    pub async fn list(&self, params: &MissionRunQueryParameters) -> Result<PagedList<MissionRun>> {
        self.query_engine.query(params).await
    }

    pub fn query_engine(&self) -> &MissionRunQueryEngine {
        &self.query_engine
    }
}
