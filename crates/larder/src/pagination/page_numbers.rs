//! Page-number markers and footer wording.

use std::fmt;

/// One entry in a pagination footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageMarker {
    /// A clickable page number.
    Page(usize),
    /// A gap between page numbers, rendered as `...`.
    Ellipsis,
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Page markers for a footer.
///
/// Always starts with page 1 and ends with `total_pages` (when there is more
/// than one page), shows `siblings` pages on each side of `current_page` and
/// puts an [`PageMarker::Ellipsis`] wherever pages are left out.
///
/// ```
/// use larder::pagination::{PageMarker::{Ellipsis, Page}, page_numbers};
///
/// assert_eq!(
///     page_numbers(5, 10, 2),
///     vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(10)]
/// );
/// ```
pub fn page_numbers(current_page: usize, total_pages: usize, siblings: usize) -> Vec<PageMarker> {
    let mut markers = vec![PageMarker::Page(1)];
    if total_pages <= 1 {
        return markers;
    }

    let first = current_page.saturating_sub(siblings).max(2);
    let last = current_page.saturating_add(siblings).min(total_pages - 1);

    if current_page.saturating_sub(siblings) > 2 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.extend((first..=last).map(PageMarker::Page));
    if current_page.saturating_add(siblings) < total_pages - 1 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.push(PageMarker::Page(total_pages));

    markers
}

/// Nouns used in a pagination summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLabel {
    pub singular: String,
    pub plural: String,
    /// Appended after the noun, e.g. `"(filtered)"`.
    pub context: Option<String>,
}

impl Default for ItemLabel {
    fn default() -> Self {
        Self::new("item", "items")
    }
}

impl ItemLabel {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
            context: None,
        }
    }

    /// Set trailing context using builder pattern.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The noun for `count` rows.
    pub fn noun(&self, count: usize) -> &str {
        if count == 1 { &self.singular } else { &self.plural }
    }
}

#[cfg(test)]
mod tests {
    use super::PageMarker::{Ellipsis, Page};
    use super::*;

    #[test]
    fn test_single_page() {
        assert_eq!(page_numbers(1, 0, 2), vec![Page(1)]);
        assert_eq!(page_numbers(1, 1, 2), vec![Page(1)]);
    }

    #[test]
    fn test_no_gaps_for_small_totals() {
        assert_eq!(
            page_numbers(3, 5, 2),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
        );
        assert_eq!(page_numbers(1, 2, 2), vec![Page(1), Page(2)]);
    }

    #[test]
    fn test_gap_at_one_end() {
        assert_eq!(
            page_numbers(1, 10, 2),
            vec![Page(1), Page(2), Page(3), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_numbers(10, 10, 2),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn test_sibling_count() {
        assert_eq!(
            page_numbers(6, 12, 1),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Ellipsis, Page(12)]
        );
    }

    #[test]
    fn test_marker_display() {
        let rendered: Vec<String> = page_numbers(5, 10, 2).iter().map(ToString::to_string).collect();
        assert_eq!(rendered.join(" "), "1 ... 3 4 5 6 7 ... 10");
    }

    #[test]
    fn test_item_label_noun() {
        let label = ItemLabel::new("recipe", "recipes");
        assert_eq!(label.noun(1), "recipe");
        assert_eq!(label.noun(0), "recipes");
        assert_eq!(label.noun(3), "recipes");
    }
}
