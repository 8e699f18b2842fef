use super::store::{MissionRunMutation, MissionRunStore, MutationDecision, QueryPage};
use crate::error::{Result, ValidationError};
use crate::models::{ExternalIdAssignment, MissionRun};
use crate::query::{MissionRunQuery, PageWindow};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<String, MissionRun>,
    /// external mission id -> mission run id
    by_external_id: HashMap<String, String>,
}

impl Records {
    fn index(&mut self, run: &MissionRun) {
        if let Some(external_id) = run.external_mission_id() {
            self.by_external_id
                .insert(external_id.to_string(), run.id.clone());
        }
    }

    fn unindex(&mut self, run: &MissionRun) {
        if let Some(external_id) = run.external_mission_id() {
            self.by_external_id.remove(external_id);
        }
    }
}

/// Mission run store held in process memory.
///
/// A single lock covers the records and the external id index, so every
/// operation, including resolve-then-mutate, is atomic with respect to all others.
#[derive(Debug, Default)]
pub struct InMemoryMissionRunStore {
    records: RwLock<Records>,
}

impl InMemoryMissionRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored mission run, in no particular order
    pub fn snapshot(&self) -> Vec<MissionRun> {
        self.records.read().by_id.values().cloned().collect()
    }
}

#[async_trait]
impl MissionRunStore for InMemoryMissionRunStore {
    async fn create(&self, mission_run: MissionRun) -> Result<MissionRun> {
        let mut records = self.records.write();

        if records.by_id.contains_key(&mission_run.id) {
            return Err(ValidationError::InvalidMissionRun {
                reason: format!("id '{}' is already in use", mission_run.id),
            }
            .into());
        }
        if let Some(external_id) = mission_run.external_mission_id() {
            if records.by_external_id.contains_key(external_id) {
                return Err(ValidationError::InvalidMissionRun {
                    reason: format!("external mission id '{external_id}' is already in use"),
                }
                .into());
            }
        }

        records.index(&mission_run);
        records
            .by_id
            .insert(mission_run.id.clone(), mission_run.clone());
        Ok(mission_run)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MissionRun>> {
        Ok(self.records.read().by_id.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<Option<MissionRun>> {
        let mut records = self.records.write();
        let removed = records.by_id.remove(id);
        if let Some(run) = &removed {
            records.unindex(run);
        }
        Ok(removed)
    }

    async fn mutate_by_external_mission_id(
        &self,
        external_mission_id: &str,
        mutation: MissionRunMutation<'_>,
    ) -> Result<Option<MissionRun>> {
        let mut records = self.records.write();

        let Some(id) = records.by_external_id.get(external_mission_id).cloned() else {
            return Ok(None);
        };
        let Some(stored) = records.by_id.get(&id) else {
            return Ok(None);
        };

        let mut working = stored.clone();
        match mutation(&mut working) {
            MutationDecision::Commit => {
                records.unindex(&working);
                records.index(&working);
                records.by_id.insert(id, working.clone());
                Ok(Some(working))
            }
            MutationDecision::Discard => Ok(Some(stored.clone())),
        }
    }

    async fn assign_external_ids(
        &self,
        id: &str,
        assignment: &ExternalIdAssignment,
    ) -> Result<Option<MissionRun>> {
        let mut records = self.records.write();

        let Some(stored) = records.by_id.get(id) else {
            return Ok(None);
        };
        let mut working = stored.clone();
        assignment.apply(&mut working)?;

        if let Some(external_id) = working.external_mission_id() {
            if records
                .by_external_id
                .get(external_id)
                .is_some_and(|owner| owner != id)
            {
                return Err(ValidationError::InvalidMissionRun {
                    reason: format!("external mission id '{external_id}' is already in use"),
                }
                .into());
            }
        }

        records.index(&working);
        records.by_id.insert(id.to_string(), working.clone());
        Ok(Some(working))
    }

    async fn find_page(&self, query: &MissionRunQuery, window: PageWindow) -> Result<QueryPage> {
        let records = self.records.read();
        Ok(query.apply(records.by_id.values(), window))
    }
}
