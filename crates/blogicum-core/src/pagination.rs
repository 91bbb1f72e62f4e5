//! Page-number pagination for post listings.

use serde::Serialize;

/// Default number of posts per page on the index, category and profile pages.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// A page number as requested by the client.
///
/// Missing or non-integer input resolves to the first page; integers outside
/// the valid range resolve to the last page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest(Option<i64>);

impl PageRequest {
    pub fn first() -> Self {
        Self(None)
    }

    pub fn number(number: i64) -> Self {
        Self(Some(number))
    }

    /// Parse the raw `page` query parameter.
    pub fn parse(raw: Option<&str>) -> Self {
        Self(raw.and_then(|s| s.trim().parse().ok()))
    }
}

/// The resolved position of one page within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageWindow {
    /// Resolve `request` against a collection of `total` items.
    pub fn resolve(total: u64, per_page: u64, request: PageRequest) -> Self {
        let per_page = per_page.max(1);
        // An empty collection still renders one empty page.
        let num_pages = total.div_ceil(per_page).max(1);

        let number = match request.0 {
            None => 1,
            Some(n) if n < 1 => num_pages,
            Some(n) => (n as u64).min(num_pages),
        };

        Self {
            number,
            num_pages,
            per_page,
            total,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }
}

/// One page of items plus its position.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    /// Slice an already-loaded, already-ordered collection.
    pub fn from_vec(items: Vec<T>, per_page: u64, request: PageRequest) -> Self {
        let window = PageWindow::resolve(items.len() as u64, per_page, request);
        let items = items
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect();

        Self { items, window }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
