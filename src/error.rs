//! # Error Taxonomy
//!
//! Every fallible operation in the crate returns [`MissionRunError`]. The variants
//! fall into four classes: not-found, validation, unknown external status and
//! infrastructure. Only infrastructure failures indicate a server-side problem;
//! the rest are the caller's to surface as client errors.

use thiserror::Error;

/// Errors raised while validating queries, filters or new mission runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("MissionRun has no property '{field}' for ordering")]
    InvalidSortField { field: String },

    #[error("Page number must be at least 1, got {0}")]
    InvalidPageNumber(u32),

    #[error("Page size must be at least 1, got {0}")]
    InvalidPageSize(u32),

    #[error("Invalid value for filter '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },

    #[error("Invalid mission run: {reason}")]
    InvalidMissionRun { reason: String },

    #[error("{entity} already has external id '{existing}', refusing to assign '{requested}'")]
    ExternalIdAlreadyAssigned {
        entity: &'static str,
        existing: String,
        requested: String,
    },
}

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum MissionRunError {
    #[error("{entity} with id '{id}' was not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Page {requested} is out of range, there are {total_pages} pages")]
    PageOutOfRange { requested: u32, total_pages: u32 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown {kind} status '{value}'")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MissionRunError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn unknown_status(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownStatus {
            kind,
            value: value.into(),
        }
    }

    /// Whether the failure is attributable to the caller's input rather than the
    /// infrastructure underneath
    pub fn is_client_error(&self) -> bool {
        !self.is_infrastructure()
    }

    /// Persistence or serialization failures, never retried by this crate
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Migration(_) | Self::Serialization(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MissionRunError>;
