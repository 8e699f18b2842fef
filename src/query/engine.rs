//! # Query Engine
//!
//! Turns surface [`MissionRunQueryParameters`] into one page of mission runs.
//!
//! Validation runs in a fixed order and always completes before the store is
//! touched: sort specification first, then page parameters, then filter values.
//! The filtered total is computed before paging and a page beyond the last one is
//! reported as [`crate::error::MissionRunError::PageOutOfRange`] rather than returned empty.

use super::filter::MissionRunFilter;
use super::mission_run_query::MissionRunQuery;
use super::pagination::{PageRequest, PagedList};
use super::parameters::MissionRunQueryParameters;
use super::sort::SortSpec;
use crate::config::QueryConfig;
use crate::error::Result;
use crate::models::MissionRun;
use crate::persistence::MissionRunStore;
use std::sync::Arc;
use tracing::debug;

/// A query whose parameters have all been validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    pub query: MissionRunQuery,
    pub page: PageRequest,
}

pub struct MissionRunQueryEngine {
    store: Arc<dyn MissionRunStore>,
    config: QueryConfig,
}

impl MissionRunQueryEngine {
    pub fn new(store: Arc<dyn MissionRunStore>, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Validate parameters without reading any data
    pub fn prepare(&self, params: &MissionRunQueryParameters) -> Result<PreparedQuery> {
        let sort = SortSpec::parse(params.order_by.as_deref())?;
        let page = PageRequest::new(
            params.page_number.unwrap_or(1),
            params.page_size.unwrap_or(self.config.default_page_size),
            self.config.max_page_size,
        )?;
        let filter = MissionRunFilter::from_parameters(params)?;

        Ok(PreparedQuery {
            query: MissionRunQuery::new(filter, sort),
            page,
        })
    }

    pub async fn query(&self, params: &MissionRunQueryParameters) -> Result<PagedList<MissionRun>> {
        let prepared = self.prepare(params)?;
        self.execute(&prepared).await
    }

    pub async fn execute(&self, prepared: &PreparedQuery) -> Result<PagedList<MissionRun>> {
        let window = prepared.page.window();
        debug!(
            predicates = prepared.query.filter.predicates().len(),
            sort_keys = prepared.query.sort.keys().len(),
            page_number = prepared.page.page_number,
            page_size = prepared.page.page_size,
            "Querying mission runs"
        );

        let page = self.store.find_page(&prepared.query, window).await?;
        prepared.page.ensure_in_range(page.total_count)?;

        Ok(PagedList {
            metadata: prepared.page.metadata(page.total_count),
            items: page.items,
        })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }
}
