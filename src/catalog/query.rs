//! Event Listing Queries

use std::cmp::Ordering;

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::catalog::rows::EventRow;

/// Default number of events per listing page.
pub const DEFAULT_PER_PAGE: usize = 12;

/// Listing order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EventSort {
    /// Soonest first
    #[default]
    Date,

    /// Alphabetical by event name
    Name,

    /// Cheapest first
    PriceAsc,

    /// Most expensive first
    PriceDesc,
}

/// Filters, order and page of an event listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Free text matched against event name, venue and attractions
    pub search: Option<String>,

    /// Only events in this city
    pub city: Option<String>,

    /// Only events of this genre
    pub genre: Option<String>,

    /// Only events on or after this day
    pub from: Option<Date>,

    /// Only events on or before this day
    pub until: Option<Date>,

    /// Listing order
    pub sort: EventSort,

    /// 1-based page number
    pub page: usize,

    /// Events per page
    pub per_page: usize,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            search: None,
            city: None,
            genre: None,
            from: None,
            until: None,
            sort: EventSort::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl EventQuery {
    /// Check if an event passes every filter.
    pub fn matches(&self, event: &EventRow) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        if let Some(term) = search {
            let hit = contains_folded(&event.name, &term)
                || contains_folded(&event.venue_name, &term)
                || event
                    .attractions
                    .iter()
                    .any(|attraction| contains_folded(attraction, &term));

            if !hit {
                return false;
            }
        }

        if let Some(city) = &self.city
            && !event.venue_city.eq_ignore_ascii_case(city.trim())
        {
            return false;
        }

        if let Some(genre) = &self.genre
            && !event
                .genre
                .as_deref()
                .is_some_and(|event_genre| event_genre.eq_ignore_ascii_case(genre.trim()))
        {
            return false;
        }

        self.from.is_none_or(|from| event.date >= from)
            && self.until.is_none_or(|until| event.date <= until)
    }

    /// Order two events by the query's sort, ties left to the caller's stable sort.
    pub fn compare(&self, a: &EventRow, b: &EventRow) -> Ordering {
        match self.sort {
            EventSort::Date => a.date.cmp(&b.date),
            EventSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            EventSort::PriceAsc => compare_prices(a.price_from, b.price_from, false),
            EventSort::PriceDesc => compare_prices(a.price_from, b.price_from, true),
        }
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Events without a price always sort last.
fn compare_prices(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    page: usize,
    per_page: usize,
    total_items: usize,
}

impl<T> Page<T> {
    /// Cut page `page` (1-based) out of `items`.
    ///
    /// `page` and `per_page` below one are treated as one.
    pub fn paginate(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total_items = items.len();
        let offset = (page - 1).saturating_mul(per_page);

        let items = items.into_iter().skip(offset).take(per_page).collect();

        Self {
            items,
            page,
            per_page,
            total_items,
        }
    }

    /// Items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Page size.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of matching items across all pages.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of pages.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page)
    }

    /// Check if a page follows this one.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
