#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Mission Run Core
//!
//! Tracks robotic inspection mission runs and reconciles them against the status
//! reports of the robot controller.
//!
//! ## Overview
//!
//! Two pieces carry the weight:
//!
//! - a **status state machine** that applies out-of-order, partial and possibly
//!   stale controller reports to the mission / task / inspection hierarchy,
//!   including the recovery reset that invalidates downstream progress after the
//!   controller reconnects mid-mission
//! - a **query engine** that composes optional filters, a validated sort
//!   specification and pagination into one deterministic page of mission runs
//!
//! ## Data flow
//!
//! ```text
//! controller report -> StatusEventDispatcher -> StatusEventIngestor
//!     -> MissionRunStore::mutate_by_external_mission_id
//!         -> MissionRunStateMachine -> commit -> StatusChangePublisher
//!
//! list request -> MissionRunQueryEngine -> MissionRunStore::find_page -> PagedList
//! ```
//!
//! ## Module Organization
//!
//! - [`models`] - The mission run aggregate and its references
//! - [`state_machine`] - Statuses, controller vocabulary, report types and transitions
//! - [`ingestion`] - Resolving and applying controller reports
//! - [`query`] - Filters, sorting, pagination and the query engine
//! - [`persistence`] - Store boundary with in-memory and Postgres implementations
//! - [`services`] - Read, delete, create and list operations for the HTTP layer
//! - [`events`] - Status change fan-out
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mission_run_core::ingestion::StatusEventIngestor;
//! use mission_run_core::persistence::InMemoryMissionRunStore;
//! use mission_run_core::state_machine::TaskStatus;
//! use std::sync::Arc;
//!
//! # async fn example() -> mission_run_core::Result<()> {
//! let store = Arc::new(InMemoryMissionRunStore::new());
//! let ingestor = StatusEventIngestor::new(store);
//!
//! let outcome = ingestor
//!     .apply_task_status("controller-mission-1", "controller-task-2", TaskStatus::InProgress)
//!     .await?;
//! if let Some(report) = outcome.report() {
//!     println!("{} status changes", report.changes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod ingestion;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod query;
pub mod services;
pub mod state_machine;
pub mod validation;

pub use config::{ConfigLoader, MissionRunConfig};
pub use error::{MissionRunError, Result, ValidationError};
pub use ingestion::{IngestOutcome, StatusEventDispatcher, StatusEventIngestor};
pub use models::{Inspection, MissionRun, MissionTask};
pub use persistence::{InMemoryMissionRunStore, MissionRunStore, PgMissionRunStore};
pub use query::{MissionRunQueryEngine, MissionRunQueryParameters, PagedList};
pub use services::MissionRunService;
pub use state_machine::{InspectionStatus, MissionRunStateMachine, MissionStatus, TaskStatus};
