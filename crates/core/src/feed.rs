//! "Load more" product feed.
//!
//! [`ProductFeed`] is the state behind an infinite product listing: the
//! accumulated products, the continuation cursor and whether another page
//! may exist. Fetching is the caller's job. The feed hands out a
//! [`FetchTicket`] describing the request to make and later accepts the
//! result through [`ProductFeed::apply`].
//!
//! Every ticket carries a sequence number. Only the most recently issued
//! ticket may change the feed; results for superseded tickets are dropped.
//! Changing the filters while a page is in flight therefore can never mix
//! products from two filter sets, no matter in which order the responses
//! arrive.

use crate::query::{Cursor, Page, ProductFilters, ProductQuery};
use crate::types::Product;

/// A request the caller should execute and hand back to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    replace: bool,
    query: ProductQuery,
}

impl FetchTicket {
    /// The page request to execute.
    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Sequence number, increasing with every ticket the feed issues.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// What [`ProductFeed::apply`] did with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The ticket was superseded; the page was discarded.
    Stale,
    /// Products were added (or replaced the list for a reset).
    Accepted { added: usize, has_more: bool },
    /// An empty page after a full one; only `has_more` changed.
    Exhausted,
}

/// Accumulated state of a paginated product listing.
#[derive(Debug, Clone)]
pub struct ProductFeed {
    filters: ProductFilters,
    page_limit: usize,
    products: Vec<Product>,
    cursor: Option<Cursor>,
    has_more: bool,
    latest_seq: u64,
    loading: bool,
}

impl ProductFeed {
    /// Create an empty feed. Call [`ProductFeed::reset`] to issue the first
    /// fetch.
    #[must_use]
    pub fn new(page_limit: usize) -> Self {
        Self {
            filters: ProductFilters::default(),
            page_limit: page_limit.max(1),
            products: Vec::new(),
            cursor: None,
            has_more: true,
            latest_seq: 0,
            loading: false,
        }
    }

    /// Products accumulated so far.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Filters of the current listing.
    #[must_use]
    pub const fn filters(&self) -> &ProductFilters {
        &self.filters
    }

    /// Whether another page may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a new listing. Clears products and cursor and supersedes any
    /// outstanding ticket.
    pub fn reset(&mut self, filters: ProductFilters) -> FetchTicket {
        self.filters = filters.normalized();
        self.products.clear();
        self.cursor = None;
        self.has_more = true;
        self.issue(true, None)
    }

    /// Ticket for the next page, or `None` while a fetch is outstanding or
    /// once the listing is exhausted.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if self.loading || !self.has_more {
            return None;
        }
        let cursor = self.cursor.clone();
        Some(self.issue(false, cursor))
    }

    /// Accept the page fetched for `ticket`.
    pub fn apply(&mut self, ticket: &FetchTicket, page: Page) -> Applied {
        if ticket.seq != self.latest_seq {
            return Applied::Stale;
        }
        self.loading = false;

        if ticket.replace {
            self.products.clear();
        }

        if page.products.is_empty() {
            self.has_more = false;
            return Applied::Exhausted;
        }

        let added = page.products.len();
        self.has_more = page.has_more;
        if page.next_cursor.is_some() {
            self.cursor = page.next_cursor;
        }
        self.products.extend(page.products);

        Applied::Accepted {
            added,
            has_more: self.has_more,
        }
    }

    /// Record that the fetch for `ticket` failed. Returns `false` for a
    /// superseded ticket. The feed keeps its products so the caller can
    /// retry with [`ProductFeed::load_more`].
    pub fn fail(&mut self, ticket: &FetchTicket) -> bool {
        if ticket.seq != self.latest_seq {
            return false;
        }
        self.loading = false;
        true
    }

    fn issue(&mut self, replace: bool, cursor: Option<Cursor>) -> FetchTicket {
        self.latest_seq += 1;
        self.loading = true;
        FetchTicket {
            seq: self.latest_seq,
            replace,
            query: ProductQuery {
                filters: self.filters.clone(),
                page_limit: self.page_limit,
                cursor,
            },
        }
    }
}
