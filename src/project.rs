//! Field projection: reduce a raw task to the report allow-list.
//!
//! Projection is a pure function over the raw record. Fields absent from
//! the raw task are omitted from the result, and the two free-text fields
//! are capped at a character budget with an ellipsis marker.

use crate::types::{Member, ProjectedTask, RawTask};

/// Marker appended to truncated text fields.
pub const ELLIPSIS: &str = "...";

/// Project a raw task onto the report field allow-list.
///
/// Container tags, enrichment lists, and the latest-comment summary start
/// empty; later pipeline stages append them. The input is never mutated.
pub fn project(raw: &RawTask, text_budget: usize) -> ProjectedTask {
    ProjectedTask {
        id: raw.id.clone(),
        custom_id: raw.custom_id.clone(),
        name: raw.name.clone(),
        text_content: raw
            .text_content
            .as_deref()
            .map(|t| truncate_text(t, text_budget)),
        description: raw
            .description
            .as_deref()
            .map(|t| truncate_text(t, text_budget)),
        status: raw.status_label(),
        date_created: raw.date_created.clone(),
        date_updated: raw.date_updated.clone(),
        due_date: raw.due_date.clone(),
        creator: raw.creator.as_ref().map(Member::display_name),
        assignees: raw.assignees.iter().map(Member::display_name).collect(),
        url: raw.url.clone(),
        list_id: None,
        list_name: None,
        folder_id: None,
        folder_name: None,
        comments: Vec::new(),
        activities: Vec::new(),
        latest_comment: None,
    }
}

/// Cap `text` at `budget` characters; past the cap, keep the first `budget`
/// characters and append [`ELLIPSIS`].
fn truncate_text(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let head: String = text.chars().take(budget).collect();
    format!("{head}{ELLIPSIS}")
}
