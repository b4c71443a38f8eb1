//! Pagination as the dashboard tables use it.

use larder::PaginationConfig;
use larder::domain::ItemRecord;
use larder::pagination::PageMarker::{Ellipsis, Page};
use larder::pagination::{ItemLabel, PaginationOptions, Paginator, page_numbers};

fn item(i: usize, category: &str) -> ItemRecord {
    ItemRecord {
        id: Some(i.to_string()),
        code: format!("SKU-{i}"),
        name: format!("Item {i}"),
        stock: i as f64,
        unit: "pcs".into(),
        category: category.into(),
        extra: Default::default(),
    }
}

fn inventory(n: usize) -> Vec<ItemRecord> {
    (1..=n)
        .map(|i| item(i, if i % 3 == 0 { "menu" } else { "inventory_purchased" }))
        .collect()
}

/// Search text and category, as the items table tracks them.
#[derive(Debug, Clone, Default, PartialEq)]
struct Criteria {
    search: String,
    category: Option<String>,
}

impl Criteria {
    fn matches(&self, item: &ItemRecord) -> bool {
        let search = self.search.to_lowercase();
        let text_ok = search.is_empty()
            || item.code.to_lowercase().contains(&search)
            || item.name.to_lowercase().contains(&search);
        let category_ok = self.category.as_ref().is_none_or(|c| *c == item.category);
        text_ok && category_ok
    }
}

fn items_table(rows: Vec<ItemRecord>) -> Paginator<ItemRecord, Criteria> {
    Paginator::new(PaginationOptions::new(rows).with_dependencies(Criteria::default()))
}

fn apply(table: &mut Paginator<ItemRecord, Criteria>, criteria: Criteria) {
    let filter = criteria.clone();
    table.update_criteria(criteria, move |item| filter.matches(item));
}

#[test]
fn test_shrinking_source_returns_to_first_page() {
    let mut table = items_table(inventory(25));
    table.go_to_page(3);
    assert_eq!(table.current_items().len(), 5);

    table.set_data(inventory(3));
    assert_eq!(table.current_page(), 1);
    assert_eq!(table.total_pages(), 1);
    assert_eq!(table.current_items().len(), 3);
}

#[test]
fn test_page_markers_around_current_page() {
    assert_eq!(
        page_numbers(5, 10, 2),
        vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(10)]
    );

    let mut table = items_table(inventory(100));
    table.go_to_page(5);
    assert_eq!(table.page_numbers(), page_numbers(5, 10, 2));
}

#[test]
fn test_changing_criteria_returns_to_first_page() {
    let mut table = items_table(inventory(60));
    table.go_to_page(4);

    apply(
        &mut table,
        Criteria {
            search: String::new(),
            category: Some("menu".into()),
        },
    );
    assert_eq!(table.current_page(), 1);
    assert_eq!(table.filtered_len(), 20);
    assert!(table.filtered_items().all(|i| i.category == "menu"));

    table.go_to_page(2);
    apply(
        &mut table,
        Criteria {
            search: String::new(),
            category: Some("menu".into()),
        },
    );
    assert_eq!(table.current_page(), 2);

    apply(
        &mut table,
        Criteria {
            search: "sku-1".into(),
            category: None,
        },
    );
    assert_eq!(table.current_page(), 1);
    // SKU-1 and SKU-10..SKU-19
    assert_eq!(table.filtered_len(), 11);
}

#[test]
fn test_footer_summary() {
    let mut table = items_table(inventory(25));
    table.go_to_page(2);
    assert_eq!(table.summary(&ItemLabel::default()), "Showing 11 to 20 of 25 items");

    table.set_items_per_page(25);
    let label = ItemLabel::new("transaction", "transactions").with_context("in the last 30 days");
    assert_eq!(
        table.summary(&label),
        "Showing 1 to 25 of 25 transactions in the last 30 days"
    );

    apply(
        &mut table,
        Criteria {
            search: "nothing matches".into(),
            category: None,
        },
    );
    assert_eq!(table.total_pages(), 0);
    assert_eq!(table.current_page(), 1);
    assert_eq!(table.summary(&label), "Showing 0 to 0 of 0 transactions in the last 30 days");
    assert_eq!(table.page_numbers(), vec![Page(1)]);
}

#[test]
fn test_configured_page_size() {
    let config = PaginationConfig::default().with_items_per_page(25);
    let table = Paginator::from_config(PaginationOptions::new(inventory(60)), &config);

    assert_eq!(table.items_per_page(), 25);
    assert_eq!(table.total_pages(), 3);
    assert_eq!((table.start_index(), table.end_index()), (0, 25));
    assert!(config.page_size_options.contains(&table.items_per_page()));
}
