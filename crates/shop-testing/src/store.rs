//! Listing over in-memory rows, following the repository rules: view filter,
//! search predicate, id descending, offset/limit, total before paging.

use chrono::Utc;

use shop_domain::pagination::{Page, PageRequest};
use shop_domain::view::{ListView, SoftDeletable};

use crate::fixture::Trashable;

pub fn paginate<T, F>(rows: &[T], view: ListView, page: &PageRequest, matches: F) -> Page<T>
where
    T: SoftDeletable + Clone,
    F: Fn(&T) -> bool,
{
    let mut selected: Vec<T> = rows
        .iter()
        .filter(|row| view.contains(row.lifecycle()))
        .filter(|row| !page.has_search() || matches(row))
        .cloned()
        .collect();
    selected.sort_by_key(|row| std::cmp::Reverse(row.id()));
    let total_records = selected.len() as u64;
    let items = selected
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page {
        items,
        total_records,
    }
}

/// Next id for an in-memory table.
pub fn next_id<T: SoftDeletable>(rows: &[T]) -> i32 {
    rows.iter().map(SoftDeletable::id).max().unwrap_or(0) + 1
}

/// Apply a trash/restore transition in place. `None` when the row is
/// missing or not in the source state.
pub fn transition<T>(rows: &mut [T], id: i32, trash: bool) -> Option<T>
where
    T: SoftDeletable + Trashable + Clone,
{
    let row = rows.iter_mut().find(|row| row.id() == id)?;
    let is_trashed = row.deleted_at().is_some();
    if is_trashed == trash {
        return None;
    }
    row.set_deleted_at(if trash { Some(Utc::now()) } else { None });
    Some(row.clone())
}
