//! Table listing: search, filters, sort and pagination
//!
//! Operates on store snapshots. Rows are filtered first, then sorted, then
//! cut into a page, so `total` always counts the filtered rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::entities::Entity;
use crate::ContentStatus;

/// Rows per page when the request does not say
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string of a table request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring matched against the whole row
    pub search: Option<String>,
    pub status: Option<ContentStatus>,
    pub category: Option<String>,
    /// Earliest creation date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest creation date, inclusive
    pub to: Option<NaiveDate>,
    /// Top-level field to sort by
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub page_size: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Index of the first row on the page
    pub offset: i64,
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`
pub fn clamp_page_size(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages].
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}

/// One page of table rows
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// True when `row` passes every predicate in `query`
pub fn matches<T: Entity>(row: &T, query: &ListQuery) -> bool {
    if let Some(status) = query.status {
        if row.status() != Some(status) {
            return false;
        }
    }

    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        match row.category() {
            Some(c) if c.eq_ignore_ascii_case(category) => {}
            _ => return false,
        }
    }

    if query.from.is_some() || query.to.is_some() {
        let created = match row.created_at() {
            Some(ts) => ts.date_naive(),
            None => return false,
        };
        if query.from.is_some_and(|from| created < from) {
            return false;
        }
        if query.to.is_some_and(|to| created > to) {
            return false;
        }
    }

    if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let haystack = match serde_json::to_string(row) {
            Ok(json) => json.to_lowercase(),
            Err(_) => return false,
        };
        if !haystack.contains(&needle.to_lowercase()) {
            return false;
        }
    }

    true
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Ordering of two JSON field values; missing fields sort first
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Stable sort by a top-level field
pub fn sort_rows<T: Entity>(rows: Vec<T>, field: &str, order: SortOrder) -> Vec<T> {
    let mut keyed: Vec<(Value, T)> = rows
        .into_iter()
        .map(|row| {
            let key = serde_json::to_value(&row)
                .ok()
                .and_then(|v| v.get(field).cloned())
                .unwrap_or(Value::Null);
            (key, row)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = compare_values(a, b);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, row)| row).collect()
}

/// Filter, sort and paginate a store snapshot
pub fn list<T: Entity>(rows: Vec<T>, query: &ListQuery, default_page_size: i64) -> ListPage<T> {
    let mut filtered: Vec<T> = rows.into_iter().filter(|row| matches(row, query)).collect();

    if let Some(field) = query.sort.as_deref().filter(|f| !f.is_empty()) {
        filtered = sort_rows(filtered, field, query.order);
    }

    let total = filtered.len();
    let page_size = clamp_page_size(query.page_size, default_page_size);
    let p = calculate_pagination(total as i64, query.page.unwrap_or(1), page_size);

    let items = filtered
        .into_iter()
        .skip(p.offset as usize)
        .take(p.page_size as usize)
        .collect();

    ListPage {
        items,
        total,
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Tip;
    use crate::EntityId;
    use chrono::{TimeZone, Utc};

    fn tip(id: i64, title: &str, status: ContentStatus, day: u32) -> Tip {
        Tip {
            id: EntityId(id),
            title: title.to_string(),
            body: format!("body of {}", title),
            category: Some(if id % 2 == 0 { "sleep" } else { "diet" }.to_string()),
            status,
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()),
            updated_at: None,
        }
    }

    fn rows() -> Vec<Tip> {
        vec![
            tip(1, "Banana", ContentStatus::Draft, 1),
            tip(2, "apple", ContentStatus::Published, 5),
            tip(3, "Cherry", ContentStatus::Draft, 10),
        ]
    }

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(250, 2, 100);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 100);
    }

    #[test]
    fn test_pagination_out_of_bounds() {
        let p = calculate_pagination(60, 99, 25);
        assert_eq!(p.page, 3); // Clamped to last page
        assert_eq!(p.offset, 50);

        let p = calculate_pagination(60, 0, 25);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, 25);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(clamp_page_size(None, DEFAULT_PAGE_SIZE), 25);
        assert_eq!(clamp_page_size(Some(1000), DEFAULT_PAGE_SIZE), MAX_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0), DEFAULT_PAGE_SIZE), 1);
    }

    #[test]
    fn test_search_is_case_insensitive_over_whole_row() {
        let query = ListQuery {
            search: Some("BODY OF cherry".into()),
            ..Default::default()
        };
        let page = list(rows(), &query, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, EntityId(3));
    }

    #[test]
    fn test_status_category_and_dates() {
        let query = ListQuery {
            status: Some(ContentStatus::Draft),
            ..Default::default()
        };
        assert_eq!(list(rows(), &query, 25).total, 2);

        let query = ListQuery {
            category: Some("SLEEP".into()),
            ..Default::default()
        };
        assert_eq!(list(rows(), &query, 25).items[0].id, EntityId(2));

        let query = ListQuery {
            from: NaiveDate::from_ymd_opt(2024, 3, 2),
            to: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        let ids: Vec<EntityId> = list(rows(), &query, 25).items.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_sort_by_title_both_orders() {
        let query = ListQuery {
            sort: Some("title".into()),
            ..Default::default()
        };
        let titles: Vec<String> = list(rows(), &query, 25).items.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["apple", "Banana", "Cherry"]);

        let query = ListQuery {
            sort: Some("id".into()),
            order: SortOrder::Desc,
            ..Default::default()
        };
        let ids: Vec<i64> = list(rows(), &query, 25).items.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_list_pages_after_filtering() {
        let query = ListQuery {
            page: Some(2),
            page_size: Some(2),
            ..Default::default()
        };
        let page = list(rows(), &query, 25);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
    }
}
