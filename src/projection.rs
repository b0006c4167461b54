use crate::models::{Lead, SortKey, StatusFilter};
use std::cmp::Ordering;

/// Computes the visible, ordered subset of leads for the current preferences.
/// Pure over its inputs; callers recompute whenever leads or preferences change.
pub fn project(
    leads: &[Lead],
    search_term: &str,
    status_filter: StatusFilter,
    sort_by: SortKey,
) -> Vec<Lead> {
    let needle = search_term.to_lowercase();
    let mut visible = leads
        .iter()
        .filter(|lead| matches_search(lead, &needle) && status_filter.matches(lead.status))
        .cloned()
        .collect::<Vec<_>>();

    match sort_by {
        SortKey::Score => visible.sort_by(|a, b| b.score.cmp(&a.score)),
        SortKey::Name => visible.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }

    visible
}

fn matches_search(lead: &Lead, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    lead.name.to_lowercase().contains(needle)
        || lead.company.to_lowercase().contains(needle)
        || lead.email.to_lowercase().contains(needle)
}

// Case-folded ordering with a raw tiebreak; `sort_by` is stable, so equal
// names keep their original relative order.
fn compare_names(a: &str, b: &str) -> Ordering {
    match a.to_lowercase().cmp(&b.to_lowercase()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}
