//! # Mission Run Query Engine
//!
//! Filtered, sorted, paginated reads over mission runs.
//!
//! Filters and sort keys come from closed sets ([`Predicate`], [`SortField`]) that
//! every store evaluates the same way: the in-memory store through
//! [`MissionRunQuery::apply`], Postgres through
//! [`MissionRunScope`](crate::persistence::MissionRunScope).

pub mod engine;
pub mod filter;
pub mod mission_run_query;
pub mod pagination;
pub mod parameters;
pub mod sort;

pub use engine::{MissionRunQueryEngine, PreparedQuery};
pub use filter::{MissionRunFilter, Predicate, TimeWindow};
pub use mission_run_query::MissionRunQuery;
pub use pagination::{PageRequest, PageWindow, PagedList, PaginationMetadata};
pub use parameters::MissionRunQueryParameters;
pub use sort::{SortDirection, SortField, SortKey, SortSpec};
