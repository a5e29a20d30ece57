//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The number of rows to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            max_pages: 5,
        }
    }
}

impl PaginationConfig {
    /// Clamp a requested page size to `[1, max_page_size]`.
    pub fn clamp_page_size(&self, page_size: u64) -> u64 {
        page_size.clamp(1, self.max_page_size.max(1))
    }
}

/// One page of a sequence together with the numbers needed to navigate it.
#[derive(Debug, PartialEq)]
pub struct PageSlice<'a, T> {
    /// The items on the page, in their original order.
    pub visible: &'a [T],
    /// The page that was shown, after clamping to `[1, total_pages]`.
    pub page: u64,
    /// The page size that was used, never zero.
    pub page_size: u64,
    /// The number of pages, at least one even for an empty sequence.
    pub total_pages: u64,
    /// The length of the whole sequence.
    pub total_items: usize,
}

/// Cut `items` into pages of `page_size` and return page `page` (1-based).
///
/// A page size of zero is treated as one and out of range pages are clamped,
/// so this never fails.
pub fn paginate<T>(items: &[T], page: u64, page_size: u64) -> PageSlice<'_, T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = (total_items as u64).div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = usize::try_from((page - 1) * page_size)
        .unwrap_or(usize::MAX)
        .min(total_items);
    let end = usize::try_from(page_size)
        .map(|size| start.saturating_add(size))
        .unwrap_or(usize::MAX)
        .min(total_items);

    PageSlice {
        visible: &items[start..end],
        page,
        page_size,
        total_pages,
        total_items,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The links of the pagination bar: at most `max_pages` page numbers around
/// the current page, the first and last page behind ellipses, and back/next
/// buttons.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let half = max_pages / 2;

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= half {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - half) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - half)..=(curr_page + half))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > half + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - half) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
