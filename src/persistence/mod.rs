//! # Persistence
//!
//! The transactional store boundary for mission run aggregates and its two
//! implementations: [`InMemoryMissionRunStore`] for tests and embedding, and
//! [`PgMissionRunStore`] for Postgres.

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod scope;
pub mod store;

pub use connection::{connect, health_check};
pub use memory::InMemoryMissionRunStore;
pub use migrations::{run_migrations, MIGRATOR};
pub use postgres::PgMissionRunStore;
pub use scope::MissionRunScope;
pub use store::{MissionRunMutation, MissionRunStore, MutationDecision, QueryPage};
