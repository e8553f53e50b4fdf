//! Client-side search and status filtering of loaded lists.

use crate::payload::PLACEHOLDER;
use crate::types::NormalizedStatus;
use crate::views::HasStatus;

/// A row that can be matched by the free-text search box.
pub trait Searchable {
    /// The fields the search box looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether any searchable field contains `needle` (already lower-cased).
    ///
    /// Placeholder values stand for missing data and never match.
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .filter(|field| **field != PLACEHOLDER)
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Keep the items whose searchable fields contain `query`, case-insensitively.
///
/// A blank query returns the list unchanged. Order is preserved.
#[must_use]
pub fn filter_by_query<T: Searchable + Clone>(items: &[T], query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.matches(&needle))
        .cloned()
        .collect()
}

/// Keep the items in `status`, or everything when `status` is `None`.
#[must_use]
pub fn filter_by_status<T>(items: &[T], status: Option<T::Status>) -> Vec<T>
where
    T: HasStatus + Clone,
{
    match status {
        None => items.to_vec(),
        Some(wanted) => items
            .iter()
            .filter(|item| item.status() == wanted)
            .cloned()
            .collect(),
    }
}

/// Parse a status filter from a select box value; `"all"` and blanks mean no filter.
#[must_use]
pub fn parse_status_filter<S: NormalizedStatus>(raw: &str) -> Option<S> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(S::from_backend(trimmed))
    }
}
