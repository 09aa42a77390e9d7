//! Search over list titles and item names.

use serde::Serialize;

use crate::domain::{ListId, ListRecord};

/// A list whose title or one of whose items matched the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub list_id: ListId,
    pub title: String,
    /// The title or item name that matched
    pub matched_text: String,
}

/// Case-insensitive substring search.
///
/// Per list, a title hit comes first, then one hit per matching item in item
/// order. An empty query matches nothing.
pub fn search(lists: &[ListRecord], query: &str) -> Vec<SearchHit> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    let mut hits = Vec::new();
    for list in lists {
        let hit = |text: &str| SearchHit {
            list_id: list.id,
            title: list.title.clone(),
            matched_text: text.to_string(),
        };
        if matches(&list.title) {
            hits.push(hit(&list.title));
        }
        hits.extend(
            list.items
                .iter()
                .filter(|item| matches(&item.name))
                .map(|item| hit(&item.name)),
        );
    }
    hits
}
