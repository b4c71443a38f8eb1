//! Client-side pagination of in-memory tables.
//!
//! The paginator is synchronous and knows nothing about the network: a
//! screen loads its rows, hands them to a [`Paginator`] and renders
//! [`Paginator::current_items`] plus a footer built from
//! [`Paginator::page_numbers`] and [`Paginator::summary`].

mod page_numbers;
mod paginator;

pub use page_numbers::{ItemLabel, PageMarker, page_numbers};
pub use paginator::{FilterFn, PaginationOptions, Paginator};

/// Page size used when none is configured.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Pages shown on each side of the current page in a footer.
pub const DEFAULT_SIBLING_COUNT: usize = 2;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 25, 50, 100];
