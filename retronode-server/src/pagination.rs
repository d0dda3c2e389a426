//! Pagination for the game list

use serde::Serialize;

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Largest page a client may request
pub const MAX_PAGE_SIZE: usize = 200;

/// Pagination metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    /// Current page number (1-indexed)
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_more: bool,
    /// Index of the first item on this page
    #[serde(skip)]
    pub offset: usize,
}

/// Calculate pagination metadata
///
/// Missing or zero `page` becomes 1. Missing or zero `limit` becomes
/// [`DEFAULT_PAGE_SIZE`]; larger values are capped at [`MAX_PAGE_SIZE`].
/// Pages past the end are allowed and simply come back empty.
///
/// # Examples
/// ```
/// use retronode_server::pagination::calculate_pagination;
///
/// // 250 total results at 100 per page = 3 pages
/// let p = calculate_pagination(250, Some(2), None);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 100);
/// assert!(p.has_more);
/// ```
pub fn calculate_pagination(
    total: usize,
    requested_page: Option<usize>,
    requested_limit: Option<usize>,
) -> Pagination {
    let page = requested_page.filter(|&p| p > 0).unwrap_or(1);
    let limit = requested_limit
        .filter(|&l| l > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let total_pages = total.div_ceil(limit);
    let offset = (page - 1).saturating_mul(limit);
    let has_more = page.saturating_mul(limit) < total;

    Pagination {
        total,
        page,
        limit,
        total_pages,
        has_more,
        offset,
    }
}

/// Slice `items` down to one page
pub fn paginate<T>(items: Vec<T>, pagination: &Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.offset)
        .take(pagination.limit)
        .collect()
}
