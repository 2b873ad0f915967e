use serde::Serialize;
use crate::PAGINATION_WINDOW;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
    /// Inclusive range of page numbers to offer around the current page.
    pub window_start: Option<u64>,
    pub window_end: Option<u64>,
}

pub fn paginate(total_matching: u64, limit: u64, page: u64) -> Pagination {
    let total_pages = if limit == 0 {
        0
    } else {
        total_matching.div_ceil(limit)
    };

    let (window_start, window_end) = if total_pages == 0 {
        (None, None)
    } else {
        let last = total_pages - 1;
        let start = page.saturating_sub(PAGINATION_WINDOW).min(last);
        let end = page.saturating_add(PAGINATION_WINDOW).min(last);
        (Some(start), Some(end))
    };

    Pagination {
        total_pages,
        has_prev: page > 0,
        has_next: page + 1 < total_pages,
        window_start,
        window_end,
    }
}
