//! # Postgres Mission Run Store
//!
//! One row per mission run aggregate. The full aggregate is kept in `payload`
//! (JSONB) and the attributes queries filter and sort on are duplicated into plain
//! columns, rewritten on every save.
//!
//! Status mutations and external id assignments lock the row with `SELECT ... FOR UPDATE` for the whole
//! read-modify-write. Page reads take the count and the page inside one
//! `REPEATABLE READ` read-only transaction so both see the same snapshot.

use super::scope::MissionRunScope;
use super::store::{MissionRunMutation, MissionRunStore, MutationDecision, QueryPage};
use crate::error::{MissionRunError, Result, ValidationError};
use crate::models::{ExternalIdAssignment, MissionRun};
use crate::query::{MissionRunQuery, PageWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// Scalar columns derived from a mission run
struct MissionRunColumns<'a> {
    run: &'a MissionRun,
    status_rank: i16,
    area_name: Option<&'a str>,
    estimated_duration: Option<i64>,
    desired_start_time: DateTime<Utc>,
}

impl<'a> MissionRunColumns<'a> {
    fn of(run: &'a MissionRun) -> Self {
        Self {
            run,
            status_rank: run.status.rank(),
            area_name: run.area.as_ref().map(|area| area.name.as_str()),
            estimated_duration: run
                .estimated_duration
                .map(|secs| i64::try_from(secs).unwrap_or(i64::MAX)),
            desired_start_time: run.desired_start_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgMissionRunStore {
    pool: PgPool,
}

impl PgMissionRunStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn update_in(
        tx: &mut Transaction<'_, Postgres>,
        run: &MissionRun,
    ) -> Result<()> {
        let columns = MissionRunColumns::of(run);
        sqlx::query(
            r#"
            UPDATE mission_runs SET
                external_mission_id = $2, mission_id = $3, name = $4, status = $5,
                status_rank = $6, description = $7, status_reason = $8, comment = $9,
                asset_code = $10, area_name = $11, robot_id = $12, robot_name = $13,
                robot_model_type = $14, desired_start_time = $15, start_time = $16,
                end_time = $17, estimated_duration = $18, payload = $19, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&run.id)
        .bind(run.external_mission_id())
        .bind(run.mission_id.as_deref())
        .bind(&run.name)
        .bind(run.status.as_str())
        .bind(columns.status_rank)
        .bind(run.description.as_deref())
        .bind(run.status_reason.as_deref())
        .bind(run.comment.as_deref())
        .bind(&run.asset_code)
        .bind(columns.area_name)
        .bind(&run.robot.id)
        .bind(&run.robot.name)
        .bind(run.robot.model_type.as_str())
        .bind(columns.desired_start_time)
        .bind(run.start_time)
        .bind(run.end_time)
        .bind(columns.estimated_duration)
        .bind(Json(columns.run))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MissionRunStore for PgMissionRunStore {
    async fn create(&self, mission_run: MissionRun) -> Result<MissionRun> {
        let columns = MissionRunColumns::of(&mission_run);
        let inserted = sqlx::query(
            r#"
            INSERT INTO mission_runs (
                id, external_mission_id, mission_id, name, status, status_rank,
                description, status_reason, comment, asset_code, area_name, robot_id,
                robot_name, robot_model_type, desired_start_time, start_time, end_time,
                estimated_duration, payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(&mission_run.id)
        .bind(mission_run.external_mission_id())
        .bind(mission_run.mission_id.as_deref())
        .bind(&mission_run.name)
        .bind(mission_run.status.as_str())
        .bind(columns.status_rank)
        .bind(mission_run.description.as_deref())
        .bind(mission_run.status_reason.as_deref())
        .bind(mission_run.comment.as_deref())
        .bind(&mission_run.asset_code)
        .bind(columns.area_name)
        .bind(&mission_run.robot.id)
        .bind(&mission_run.robot.name)
        .bind(mission_run.robot.model_type.as_str())
        .bind(columns.desired_start_time)
        .bind(mission_run.start_time)
        .bind(mission_run.end_time)
        .bind(columns.estimated_duration)
        .bind(Json(columns.run))
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(mission_run),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ValidationError::InvalidMissionRun {
                    reason: format!(
                        "id '{}' or its external mission id is already in use",
                        mission_run.id
                    ),
                }
                .into())
            }
            Err(err) => Err(MissionRunError::Database(err)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MissionRun>> {
        let payload: Option<Json<MissionRun>> =
            sqlx::query_scalar("SELECT payload FROM mission_runs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(payload.map(|Json(run)| run))
    }

    async fn delete(&self, id: &str) -> Result<Option<MissionRun>> {
        let payload: Option<Json<MissionRun>> =
            sqlx::query_scalar("DELETE FROM mission_runs WHERE id = $1 RETURNING payload")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(payload.map(|Json(run)| run))
    }

    async fn mutate_by_external_mission_id(
        &self,
        external_mission_id: &str,
        mutation: MissionRunMutation<'_>,
    ) -> Result<Option<MissionRun>> {
        let mut tx = self.pool.begin().await?;

        let stored: Option<Json<MissionRun>> = sqlx::query_scalar(
            "SELECT payload FROM mission_runs WHERE external_mission_id = $1 FOR UPDATE",
        )
        .bind(external_mission_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(Json(stored)) = stored else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mut working = stored.clone();
        match mutation(&mut working) {
            MutationDecision::Commit => {
                Self::update_in(&mut tx, &working).await?;
                tx.commit().await?;
                debug!(mission_run_id = %working.id, "Committed mission run mutation");
                Ok(Some(working))
            }
            MutationDecision::Discard => {
                tx.rollback().await?;
                Ok(Some(stored))
            }
        }
    }

    async fn assign_external_ids(
        &self,
        id: &str,
        assignment: &ExternalIdAssignment,
    ) -> Result<Option<MissionRun>> {
        let mut tx = self.pool.begin().await?;

        let stored: Option<Json<MissionRun>> =
            sqlx::query_scalar("SELECT payload FROM mission_runs WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(Json(mut working)) = stored else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Err(err) = assignment.apply(&mut working) {
            tx.rollback().await?;
            return Err(err.into());
        }

        match Self::update_in(&mut tx, &working).await {
            Ok(()) => {}
            Err(MissionRunError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                tx.rollback().await?;
                return Err(ValidationError::InvalidMissionRun {
                    reason: format!(
                        "external mission id '{}' is already in use",
                        working.external_mission_id().unwrap_or_default()
                    ),
                }
                .into());
            }
            Err(err) => return Err(err),
        }
        tx.commit().await?;
        debug!(mission_run_id = %working.id, "Assigned external ids");
        Ok(Some(working))
    }

    async fn find_page(&self, query: &MissionRunQuery, window: PageWindow) -> Result<QueryPage> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count = MissionRunScope::count()
            .filtered(&query.filter)
            .into_builder();
        let total_count: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

        let mut page = MissionRunScope::page(query, window).into_builder();
        let items: Vec<Json<MissionRun>> = page.build_query_scalar().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        Ok(QueryPage {
            items: items.into_iter().map(|Json(run)| run).collect(),
            total_count: u64::try_from(total_count).unwrap_or_default(),
        })
    }
}
