//! Filtered, paginated views over in-memory collections.

use larder_core::PerfSpan;

use crate::config::PaginationConfig;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_SIBLING_COUNT, ItemLabel, PageMarker, page_numbers};

/// A row predicate.
pub type FilterFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

// ============================================================================
// Options
// ============================================================================

/// Construction options for a [`Paginator`].
///
/// `dependencies` is any comparable value describing the screen's filter
/// criteria (search text, selected category, ...). Whenever it changes the
/// paginator returns to page 1.
pub struct PaginationOptions<T, D = ()> {
    pub data: Vec<T>,
    pub filter: Option<FilterFn<T>>,
    pub items_per_page_default: usize,
    pub dependencies: D,
}

impl<T> PaginationOptions<T> {
    /// Options over `data` with no filter and no dependencies.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            filter: None,
            items_per_page_default: DEFAULT_ITEMS_PER_PAGE,
            dependencies: (),
        }
    }
}

impl<T, D> PaginationOptions<T, D> {
    /// Set the row filter using builder pattern.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Set the initial page size using builder pattern.
    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page_default = items_per_page;
        self
    }

    /// Set the dependency value using builder pattern.
    pub fn with_dependencies<D2>(self, dependencies: D2) -> PaginationOptions<T, D2> {
        PaginationOptions {
            data: self.data,
            filter: self.filter,
            items_per_page_default: self.items_per_page_default,
            dependencies,
        }
    }
}

// ============================================================================
// Paginator
// ============================================================================

/// Derives the current page of a filtered collection.
///
/// `current_page` is always within `1..=max(1, total_pages)`. Any change to
/// the data, filter or page size re-derives the view; if the current page
/// no longer exists afterwards the paginator goes back to page 1.
///
/// ```
/// use larder::pagination::{PaginationOptions, Paginator};
///
/// let mut paginator = Paginator::new(PaginationOptions::new((1..=25).collect::<Vec<u32>>()));
/// paginator.go_to_page(3);
/// assert_eq!(paginator.current_items(), vec![&21, &22, &23, &24, &25]);
///
/// paginator.set_data(vec![1, 2, 3]);
/// assert_eq!(paginator.current_page(), 1);
/// assert_eq!(paginator.total_pages(), 1);
/// ```
pub struct Paginator<T, D = ()> {
    data: Vec<T>,
    filter: Option<FilterFn<T>>,
    dependencies: D,
    /// Indices into `data` of rows passing the filter.
    filtered: Vec<usize>,
    current_page: usize,
    items_per_page: usize,
    sibling_count: usize,
}

impl<T, D: PartialEq> Paginator<T, D> {
    /// Build a paginator on page 1.
    pub fn new(options: PaginationOptions<T, D>) -> Self {
        let mut paginator = Self {
            data: options.data,
            filter: options.filter,
            dependencies: options.dependencies,
            filtered: Vec::new(),
            current_page: 1,
            items_per_page: options.items_per_page_default.max(1),
            sibling_count: DEFAULT_SIBLING_COUNT,
        };
        paginator.recompute();
        paginator
    }

    /// Build a paginator whose page size and sibling window come from
    /// `config` rather than `options`.
    pub fn from_config(options: PaginationOptions<T, D>, config: &PaginationConfig) -> Self {
        let mut paginator = Self::new(options.with_items_per_page(config.items_per_page));
        paginator.sibling_count = config.sibling_count;
        paginator
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the source data.
    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.recompute();
    }

    /// Replace the row filter.
    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self.recompute();
    }

    /// Remove the row filter.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.recompute();
    }

    /// Update the dependency value. Returns to page 1 if it changed.
    pub fn set_dependencies(&mut self, dependencies: D) {
        if self.dependencies == dependencies {
            return;
        }
        tracing::debug!(target: "larder::pagination", "dependencies changed, returning to page 1");
        self.dependencies = dependencies;
        self.current_page = 1;
    }

    /// Change the filter and the dependency value describing it together.
    pub fn update_criteria<F>(&mut self, dependencies: D, filter: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.set_dependencies(dependencies);
        self.set_filter(filter);
    }

    /// Change the page size. Zero is treated as one.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page.max(1);
        self.recompute();
    }

    /// Go to page `page`, clamped into the valid range.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page.saturating_add(1));
    }

    fn recompute(&mut self) {
        let _span = PerfSpan::new("pagination.recompute");

        self.filtered = match &self.filter {
            Some(filter) => self
                .data
                .iter()
                .enumerate()
                .filter(|&(_, row)| filter(row))
                .map(|(i, _)| i)
                .collect(),
            None => (0..self.data.len()).collect(),
        };

        let total_pages = self.total_pages();
        if self.current_page > total_pages.max(1) {
            tracing::debug!(
                target: "larder::pagination",
                current_page = self.current_page,
                total_pages,
                "current page out of range, returning to page 1"
            );
            self.current_page = 1;
        }
        tracing::trace!(
            target: "larder::pagination",
            source = self.data.len(),
            filtered = self.filtered.len(),
            total_pages,
            "recomputed"
        );
    }
}

impl<T, D> Paginator<T, D> {
    // =========================================================================
    // Derived View
    // =========================================================================

    /// The 1-based current page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// `ceil(filtered / items_per_page)`; zero when nothing passes the filter.
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.items_per_page)
    }

    /// Offset of the first row of the current page within the filtered rows.
    pub fn start_index(&self) -> usize {
        (self.current_page - 1) * self.items_per_page
    }

    /// Exclusive end offset of the current page. Not clipped to the number
    /// of filtered rows.
    pub fn end_index(&self) -> usize {
        self.start_index() + self.items_per_page
    }

    /// Rows on the current page.
    pub fn current_items(&self) -> Vec<&T> {
        let len = self.filtered.len();
        let start = self.start_index().min(len);
        let end = self.end_index().min(len);
        self.filtered[start..end].iter().map(|&i| &self.data[i]).collect()
    }

    /// Every row passing the filter, in source order.
    pub fn filtered_items(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().map(|&i| &self.data[i])
    }

    /// Number of rows passing the filter.
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// The unfiltered source rows.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn dependencies(&self) -> &D {
        &self.dependencies
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Footer markers for the current page.
    pub fn page_numbers(&self) -> Vec<PageMarker> {
        page_numbers(self.current_page, self.total_pages(), self.sibling_count)
    }

    /// Footer text such as `"Showing 11 to 20 of 25 items"`.
    pub fn summary(&self, label: &ItemLabel) -> String {
        let count = self.filtered.len();
        let (first, last) = if count == 0 {
            (0, 0)
        } else {
            (self.start_index() + 1, self.end_index().min(count))
        };

        let mut text = format!("Showing {first} to {last} of {count} {}", label.noun(count));
        if let Some(context) = &label.context {
            text.push(' ');
            text.push_str(context);
        }
        text
    }
}

impl<T, D: std::fmt::Debug> std::fmt::Debug for Paginator<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("source", &self.data.len())
            .field("filtered", &self.filtered.len())
            .field("current_page", &self.current_page)
            .field("items_per_page", &self.items_per_page)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
