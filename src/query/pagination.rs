use crate::error::{MissionRunError, ValidationError};
use serde::{Deserialize, Serialize};

/// Validated 1-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Validate page parameters. A page size above `max_page_size` is clamped
    /// rather than rejected.
    pub fn new(page_number: u32, page_size: u32, max_page_size: u32) -> Result<Self, ValidationError> {
        if page_number < 1 {
            return Err(ValidationError::InvalidPageNumber(page_number));
        }
        if page_size < 1 {
            return Err(ValidationError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page_number,
            page_size: page_size.min(max_page_size.max(1)),
        })
    }

    /// Row window for this page
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: u64::from(self.page_number - 1) * u64::from(self.page_size),
            limit: self.page_size,
        }
    }

    /// Ceiling division; zero when there is nothing to page over
    pub fn total_pages(&self, total_count: u64) -> u32 {
        let pages = total_count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Page 1 is always in range, even over an empty result
    pub fn ensure_in_range(&self, total_count: u64) -> Result<(), MissionRunError> {
        let total_pages = self.total_pages(total_count);
        if self.page_number > total_pages.max(1) {
            return Err(MissionRunError::PageOutOfRange {
                requested: self.page_number,
                total_pages,
            });
        }
        Ok(())
    }

    pub fn metadata(&self, total_count: u64) -> PaginationMetadata {
        let window = self.window();
        PaginationMetadata {
            current_page: self.page_number,
            total_pages: self.total_pages(total_count),
            page_size: self.page_size,
            total_count,
            has_next: window.offset + u64::from(window.limit) < total_count,
            has_previous: self.page_number > 1,
        }
    }
}

/// Offset and limit handed to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

impl PageWindow {
    pub fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: u32::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// One page of results with the metadata needed to navigate the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub metadata: PaginationMetadata,
}

impl<T> PagedList<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
