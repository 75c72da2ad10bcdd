// File: src/collector/normalize.rs

use persona_common::models::ContentNode;

/// Flattens a message into the single line stored in the history.
///
/// A blank raw text yields an empty string no matter what the nodes hold,
/// so mention-only and attachment-only messages are dropped by the caller.
pub fn normalize_content(raw: &str, nodes: &[ContentNode]) -> String {
    if raw.trim_end().is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for node in nodes {
        match node {
            ContentNode::Text { content } => {
                if content.trim_end().is_empty() {
                    continue;
                }
                out.push_str(content);
            }
            ContentNode::At { id, name } => {
                out.push_str(&mention_marker(id, name.as_deref().unwrap_or_default()));
            }
            ContentNode::Other => {}
        }
    }
    out
}

pub fn mention_marker(id: &str, name: &str) -> String {
    format!("[at:{},name: {}]", id, name)
}
