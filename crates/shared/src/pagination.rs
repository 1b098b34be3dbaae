//! Page-number pagination.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Error type for pagination parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Page number and page size must be specified together")]
    Incomplete,
    #[error("Page number must be greater than 0")]
    InvalidPageNumber,
    #[error("Page size must be greater than 0")]
    InvalidPageSize,
    #[error("Page size must be at most {MAX_PAGE_SIZE}")]
    PageSizeTooLarge,
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Number of rows to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.number as u64 - 1) * self.size as u64
    }

    /// Maximum number of rows on this page.
    pub fn limit(&self) -> u64 {
        self.size as u64
    }

    /// Applies this page to an already ordered collection.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

/// Builds a [`Page`] from optional request parameters.
///
/// Both values absent means no pagination. Supplying only one of them is an error.
pub fn page_from_parts(
    page_number: Option<i64>,
    page_size: Option<i64>,
) -> Result<Option<Page>, PageError> {
    match (page_number, page_size) {
        (None, None) => Ok(None),
        (Some(number), Some(size)) => {
            if number < 1 || number > u32::MAX as i64 {
                return Err(PageError::InvalidPageNumber);
            }
            if size < 1 {
                return Err(PageError::InvalidPageSize);
            }
            if size > MAX_PAGE_SIZE {
                return Err(PageError::PageSizeTooLarge);
            }
            Ok(Some(Page {
                number: number as u32,
                size: size as u32,
            }))
        }
        _ => Err(PageError::Incomplete),
    }
}
