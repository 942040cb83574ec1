//! # Listing
//!
//! Search, filter and pagination over a loaded collection. Everything here is
//! a pure function of the records and a [`ListState`]; nothing touches the
//! network.
//!
//! - **Search** is a case-insensitive substring match over the fields each
//!   record exposes through [`Searchable`]. An empty term matches everything.
//! - **Filters** are per-collection [`RecordFilter`] structs built from
//!   [`Choice`] values, where [`Choice::All`] admits every record.
//! - **Pagination** is 1-based. `total_pages = ceil(matches / page_size)`,
//!   and the current page is clamped to `[1, max(1, total_pages)]`.
//!
//! Changing the search term or any filter resets the list to page 1.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Exposes the text fields a search term is matched against.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// A per-collection filter. The default value admits everything.
pub trait RecordFilter<T>: Default + Clone + PartialEq {
    fn admits(&self, record: &T) -> bool;
}

/// No filter at all.
impl<T> RecordFilter<T> for () {
    fn admits(&self, _record: &T) -> bool {
        true
    }
}

/// One filter dimension: either everything or a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice<E> {
    #[default]
    All,
    Only(E),
}

impl<E: PartialEq> Choice<E> {
    pub fn admits(&self, value: &E) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<E: FromStr> FromStr for Choice<E> {
    type Err = E::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            s.parse().map(Choice::Only)
        }
    }
}

impl<E: fmt::Display> fmt::Display for Choice<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("all"),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

pub fn matches_search<T: Searchable>(record: &T, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Records passing both the search term and the filter, in their original order.
pub fn filter_records<'a, T, F>(records: &'a [T], term: &str, filter: &F) -> Vec<&'a T>
where
    T: Searchable,
    F: RecordFilter<T>,
{
    records
        .iter()
        .filter(|r| filter.admits(r) && matches_search(*r, term))
        .collect()
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
        }
    }
}

impl<T: Clone> Page<&T> {
    pub fn cloned(self) -> Page<T> {
        self.map(Clone::clone)
    }
}

/// Slice `items` to `page`, clamping it to the available range.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let page = page.clamp(1, total_pages.max(1));
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
        page_size,
    }
}

/// Search term, filter and page of one list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F> {
    search: String,
    filter: F,
    page: usize,
    page_size: usize,
}

impl<F: Default> ListState<F> {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            filter: F::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }
}

impl<F> ListState<F> {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.page = 1;
    }

    /// Change one field of the filter.
    pub fn update_filter(&mut self, change: impl FnOnce(&mut F)) {
        change(&mut self.filter);
        self.page = 1;
    }

    /// Requested page; clamped on the next [`ListState::apply`].
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn apply<'a, T>(&mut self, records: &'a [T]) -> Page<&'a T>
    where
        T: Searchable,
        F: RecordFilter<T>,
    {
        let matching = filter_records(records, &self.search, &self.filter);
        let page = paginate(matching, self.page, self.page_size);
        self.page = page.page;
        page
    }
}
