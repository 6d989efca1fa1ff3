//! Conversation-list maintenance.

use chrono::{DateTime, Utc};

use crate::api::ConversationSummary;

/// Title given to conversations before their first message names them.
pub const DEFAULT_TITLE: &str = "New chat";

/// How many characters of the first message become the candidate title.
const TITLE_CANDIDATE_CHARS: usize = 40;

/// Derives a candidate title from a user message.
pub fn title_candidate(text: &str) -> String {
    text.chars().take(TITLE_CANDIDATE_CHARS).collect()
}

/// Moves the touched conversation to the front of the list, updating its
/// title, preview, timestamp, and message count.
///
/// Rules:
/// - An existing non-default title is kept; the candidate only replaces the
///   default placeholder.
/// - The preview becomes the first non-empty of {new preview, existing}.
/// - `increment` is added to the message count (0 on re-promotion).
/// - Relative order of all other entries is preserved; no duplicates.
///
/// Idempotent beyond the count increment and timestamp.
pub fn promote(
    list: Vec<ConversationSummary>,
    id: &str,
    title_candidate: &str,
    preview: &str,
    increment: u32,
    now: DateTime<Utc>,
) -> Vec<ConversationSummary> {
    let now = now.to_rfc3339();
    let current = list.iter().find(|entry| entry.id == id);

    let title = match current {
        Some(entry) if entry.title != DEFAULT_TITLE => entry.title.clone(),
        _ if !title_candidate.is_empty() => title_candidate.to_string(),
        Some(entry) => entry.title.clone(),
        None => DEFAULT_TITLE.to_string(),
    };

    let next = ConversationSummary {
        id: id.to_string(),
        title,
        created_at: current.map_or_else(|| now.clone(), |entry| entry.created_at.clone()),
        updated_at: now,
        message_count: current.map_or(0, |entry| entry.message_count) + increment,
        last_message_preview: if preview.is_empty() {
            current.map_or_else(String::new, |entry| entry.last_message_preview.clone())
        } else {
            preview.to_string()
        },
    };

    std::iter::once(next)
        .chain(list.into_iter().filter(|entry| entry.id != id))
        .collect()
}
