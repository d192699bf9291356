// src/pipeline/paginate.rs

//! Deduplication and page slicing.

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::PaginationInfo;

/// One page of items plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
}

/// Drop repeated items, keeping the first occurrence of each.
pub fn dedupe<T>(items: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    dedupe_by_key(items, T::clone)
}

/// Drop items whose key was already seen, keeping first occurrences in order.
pub fn dedupe_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Slice out page `page` (1-based) of size `limit`.
///
/// Page and limit below 1 are treated as 1. Pages past the end come back
/// empty with `has_next_page == false`.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Paginated<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len();
    let offset = (page - 1).saturating_mul(limit);

    let data = items.into_iter().skip(offset).take(limit).collect();

    Paginated {
        data,
        pagination: PaginationInfo {
            current_page: page,
            has_next_page: offset.saturating_add(limit) < total,
            next_page: page.saturating_add(1),
            total,
        },
    }
}
