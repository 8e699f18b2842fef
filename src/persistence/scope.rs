//! # Mission Run Scopes
//!
//! Pushes a [`MissionRunQuery`] down to SQL against the `mission_runs` table.
//!
//! Every user supplied value is bound. The only text spliced into the statement
//! comes from [`sort_column`], which maps the closed [`SortField`] set onto
//! column expressions, so an unvalidated field name can never reach the database.
//!
//! The generated SQL reproduces the in-memory ordering rules: text columns are
//! compared with `COLLATE "C"` (byte-wise), ascending keys put `NULL` first,
//! descending keys put `NULL` last, and `id` closes every `ORDER BY`.
//!
//! Case-insensitive conditions fold with `lower(.. COLLATE "C")`. Under the C
//! collation `lower()` only maps ASCII letters whatever the database locale,
//! which is the same folding the in-memory filter applies.

use crate::query::{
    MissionRunFilter, MissionRunQuery, PageWindow, Predicate, SortDirection, SortField, SortSpec,
    TimeWindow,
};
use sqlx::{Postgres, QueryBuilder};

/// Column expression and whether it needs a byte-wise collation
pub fn sort_column(field: SortField) -> (&'static str, bool) {
    match field {
        SortField::Id => ("id", true),
        SortField::Name => ("name", true),
        SortField::Status => ("status_rank", false),
        SortField::ExternalMissionId => ("external_mission_id", true),
        SortField::MissionId => ("mission_id", true),
        SortField::Description => ("description", true),
        SortField::StatusReason => ("status_reason", true),
        SortField::Comment => ("comment", true),
        SortField::AssetCode => ("asset_code", true),
        SortField::DesiredStartTime => ("desired_start_time", false),
        SortField::StartTime => ("start_time", false),
        SortField::EndTime => ("end_time", false),
        SortField::EstimatedDuration => ("estimated_duration", false),
    }
}

/// Query builder for mission run scopes
pub struct MissionRunScope {
    query: QueryBuilder<'static, Postgres>,
    has_conditions: bool,
}

impl MissionRunScope {
    /// `SELECT payload` over the table, for materialising aggregates
    pub fn payloads() -> Self {
        Self::new("SELECT payload FROM mission_runs")
    }

    /// `SELECT COUNT(*)` over the table
    pub fn count() -> Self {
        Self::new("SELECT COUNT(*) FROM mission_runs")
    }

    fn new(select: &str) -> Self {
        Self {
            query: QueryBuilder::new(select),
            has_conditions: false,
        }
    }

    /// Page of payloads for a query
    pub fn page(query: &MissionRunQuery, window: PageWindow) -> Self {
        Self::payloads()
            .filtered(&query.filter)
            .sorted(&query.sort)
            .paginate(window)
    }

    /// Add WHERE clause helper
    fn add_condition(&mut self, condition: &str) {
        if self.has_conditions {
            self.query.push(" AND ");
        } else {
            self.query.push(" WHERE ");
            self.has_conditions = true;
        }
        self.query.push(condition);
    }

    pub fn filtered(mut self, filter: &MissionRunFilter) -> Self {
        for predicate in filter.predicates() {
            self = self.with_predicate(predicate);
        }
        self
    }

    pub fn with_predicate(mut self, predicate: &Predicate) -> Self {
        match predicate {
            Predicate::AssetCode(code) => {
                self.add_condition("lower(asset_code COLLATE \"C\") = ");
                self.query.push_bind(code.clone());
            }
            Predicate::Status(status) => {
                self.add_condition("status = ");
                self.query.push_bind(status.as_str());
            }
            Predicate::RobotId(robot_id) => {
                self.add_condition("robot_id = ");
                self.query.push_bind(robot_id.clone());
            }
            Predicate::RobotModelType(model_type) => {
                self.add_condition("robot_model_type = ");
                self.query.push_bind(model_type.as_str());
            }
            Predicate::AreaName(name) => {
                self.add_condition("lower(area_name COLLATE \"C\") = ");
                self.query.push_bind(name.clone());
            }
            Predicate::NameContains(needle) => {
                self.add_condition("strpos(lower(name COLLATE \"C\"), ");
                self.query.push_bind(needle.clone());
                self.query.push(") > 0");
            }
            Predicate::RobotNameContains(needle) => {
                self.add_condition("strpos(lower(robot_name COLLATE \"C\"), ");
                self.query.push_bind(needle.clone());
                self.query.push(") > 0");
            }
            Predicate::TagContains(needle) => {
                self.add_condition(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements(payload->'tasks') AS task \
                     WHERE strpos(lower((task->>'tagId') COLLATE \"C\"), ",
                );
                self.query.push_bind(needle.clone());
                self.query.push(") > 0)");
            }
            Predicate::StartTime(window) => self.push_window("start_time", window, true),
            Predicate::EndTime(window) => self.push_window("end_time", window, true),
            Predicate::DesiredStartTime(window) => {
                self.push_window("desired_start_time", window, false)
            }
        }
        self
    }

    /// Inclusive bounds; a nullable column lets `NULL` through
    fn push_window(&mut self, column: &str, window: &TimeWindow, nullable: bool) {
        if nullable {
            self.add_condition(&format!("({column} IS NULL OR ("));
        } else {
            self.add_condition("(");
        }

        let mut first = true;
        if let Some(min) = window.min {
            self.query.push(format!("{column} >= "));
            self.query.push_bind(min);
            first = false;
        }
        if let Some(max) = window.max {
            if !first {
                self.query.push(" AND ");
            }
            self.query.push(format!("{column} <= "));
            self.query.push_bind(max);
        }

        self.query.push(if nullable { "))" } else { ")" });
    }

    pub fn sorted(mut self, sort: &SortSpec) -> Self {
        self.query.push(" ORDER BY ");
        for key in sort.keys() {
            let (column, text) = sort_column(key.field);
            self.query.push(column);
            if text {
                self.query.push(" COLLATE \"C\"");
            }
            self.query.push(match key.direction {
                SortDirection::Ascending => " ASC NULLS FIRST, ",
                SortDirection::Descending => " DESC NULLS LAST, ",
            });
        }
        self.query.push("id COLLATE \"C\" ASC");
        self
    }

    pub fn paginate(mut self, window: PageWindow) -> Self {
        self.query.push(" LIMIT ");
        self.query.push_bind(i64::from(window.limit));
        self.query.push(" OFFSET ");
        self.query.push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
        self
    }

    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    pub fn into_builder(self) -> QueryBuilder<'static, Postgres> {
        self.query
    }
}
