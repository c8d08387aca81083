/// One window of an ordered collection, plus the metadata the presentation
/// layer needs to draw prev/next controls.
///
/// Pages are 0-based. Ordering is the caller's responsibility (creation time
/// ascending for active tiers, completion time descending for the completed
/// list).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page around a window that was already fetched with
    /// limit/offset, given the total item count.
    pub fn from_window(items: Vec<T>, page: usize, page_size: usize, total_count: usize) -> Self {
        let total_pages = total_pages(total_count, page_size);
        Self {
            items,
            page,
            total_pages,
            has_prev: page > 0,
            has_next: page < total_pages.saturating_sub(1),
        }
    }
}

/// Window an ordered slice into the given 0-based page.
///
/// A page index past the end yields an empty window with `has_next = false`.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    if page_size == 0 {
        return Page::from_window(Vec::new(), page, page_size, items.len());
    }
    let start = page.saturating_mul(page_size);
    let window = if start >= items.len() {
        Vec::new()
    } else {
        let end = (start + page_size).min(items.len());
        items[start..end].to_vec()
    };
    Page::from_window(window, page, page_size, items.len())
}

fn total_pages(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}
