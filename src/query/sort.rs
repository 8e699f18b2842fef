//! Sort specification parsing and ordering.
//!
//! `orderBy` is a comma separated list of `<field>[ desc]` tokens. Field names are
//! looked up in a closed whitelist ([`SortField`]) ignoring case and underscores.
//! Anything outside the whitelist is rejected before any data is read.
//!
//! Ordering rules shared by every store:
//! - strings compare byte-wise
//! - unset values sort first ascending and last descending
//! - status sorts by lifecycle declaration order
//! - `id` ascending is always appended as the final tie-breaker

use crate::error::ValidationError;
use crate::models::MissionRun;
use std::cmp::Ordering;

/// Mission run attributes that may appear in `orderBy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Name,
    Status,
    ExternalMissionId,
    MissionId,
    Description,
    StatusReason,
    Comment,
    AssetCode,
    DesiredStartTime,
    StartTime,
    EndTime,
    EstimatedDuration,
}

impl SortField {
    pub const ALL: [SortField; 13] = [
        Self::Id,
        Self::Name,
        Self::Status,
        Self::ExternalMissionId,
        Self::MissionId,
        Self::Description,
        Self::StatusReason,
        Self::Comment,
        Self::AssetCode,
        Self::DesiredStartTime,
        Self::StartTime,
        Self::EndTime,
        Self::EstimatedDuration,
    ];

    /// Canonical surface name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Status => "status",
            Self::ExternalMissionId => "externalMissionId",
            Self::MissionId => "missionId",
            Self::Description => "description",
            Self::StatusReason => "statusReason",
            Self::Comment => "comment",
            Self::AssetCode => "assetCode",
            Self::DesiredStartTime => "desiredStartTime",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::EstimatedDuration => "estimatedDuration",
        }
    }

    /// Whitelist lookup, ignoring case and underscores
    pub fn lookup(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|field| field.name().to_lowercase() == wanted)
    }

    /// Ascending comparison of two mission runs on this field
    pub fn compare(&self, a: &MissionRun, b: &MissionRun) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Status => a.status.rank().cmp(&b.status.rank()),
            Self::ExternalMissionId => a.external_mission_id().cmp(&b.external_mission_id()),
            Self::MissionId => a.mission_id.cmp(&b.mission_id),
            Self::Description => a.description.cmp(&b.description),
            Self::StatusReason => a.status_reason.cmp(&b.status_reason),
            Self::Comment => a.comment.cmp(&b.comment),
            Self::AssetCode => a.asset_code.cmp(&b.asset_code),
            Self::DesiredStartTime => a.desired_start_time.cmp(&b.desired_start_time),
            Self::StartTime => a.start_time.cmp(&b.start_time),
            Self::EndTime => a.end_time.cmp(&b.end_time),
            Self::EstimatedDuration => a.estimated_duration.cmp(&b.estimated_duration),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    pub fn compare(&self, a: &MissionRun, b: &MissionRun) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Validated, prioritised list of sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl Default for SortSpec {
    /// Ascending by name
    fn default() -> Self {
        Self {
            keys: vec![SortKey::ascending(SortField::Name)],
        }
    }
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        if keys.is_empty() {
            return Self::default();
        }
        Self { keys }
    }

    /// Parse an `orderBy` string. Blank input yields the default ordering.
    pub fn parse(order_by: Option<&str>) -> Result<Self, ValidationError> {
        let Some(order_by) = order_by else {
            return Ok(Self::default());
        };

        let mut keys = Vec::new();
        for token in order_by.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let field_name = token.split_whitespace().next().unwrap_or(token);
            let field = SortField::lookup(field_name).ok_or_else(|| {
                ValidationError::InvalidSortField {
                    field: field_name.to_string(),
                }
            })?;

            let direction = if token.to_lowercase().ends_with(" desc") {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            keys.push(SortKey { field, direction });
        }

        Ok(Self::new(keys))
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Total order: requested keys in priority order, then id ascending
    pub fn compare(&self, a: &MissionRun, b: &MissionRun) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    pub fn sort(&self, runs: &mut [MissionRun]) {
        runs.sort_by(|a, b| self.compare(a, b));
    }
}
