use super::filter::MissionRunFilter;
use super::pagination::PageWindow;
use super::sort::SortSpec;
use crate::models::MissionRun;
use crate::persistence::QueryPage;

/// A validated filter and sort, ready to hand to a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionRunQuery {
    pub filter: MissionRunFilter,
    pub sort: SortSpec,
}

impl MissionRunQuery {
    pub fn new(filter: MissionRunFilter, sort: SortSpec) -> Self {
        Self { filter, sort }
    }

    /// Evaluate the query over mission runs held in memory
    pub fn apply<'a, I>(&self, runs: I, window: PageWindow) -> QueryPage
    where
        I: IntoIterator<Item = &'a MissionRun>,
    {
        let mut matching: Vec<&MissionRun> = runs
            .into_iter()
            .filter(|run| self.filter.matches(run))
            .collect();
        matching.sort_by(|a, b| self.sort.compare(a, b));

        let total_count = matching.len() as u64;
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        QueryPage { items, total_count }
    }
}
