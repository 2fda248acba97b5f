//! Lenient JSON extraction from generated text
//!
//! Generation backends wrap JSON in prose or markdown fences. Candidates are
//! tried in order: the whole text, each fenced code block, then the span
//! between the first opening and last closing bracket.

use serde_json::Value;

/// Extract a JSON object from free-form text
pub fn extract_json(text: &str) -> Option<Value> {
    extract_with(text, '{', '}', Value::is_object)
}

/// Extract a JSON array from free-form text
pub fn extract_json_array(text: &str) -> Option<Value> {
    extract_with(text, '[', ']', Value::is_array)
}

fn extract_with(text: &str, open: char, close: char, accept: fn(&Value) -> bool) -> Option<Value> {
    let parse = |candidate: &str| {
        serde_json::from_str::<Value>(candidate.trim())
            .ok()
            .filter(accept)
    };

    if let Some(value) = parse(text) {
        return Some(value);
    }

    for block in fenced_blocks(text) {
        if let Some(value) = parse(block) {
            return Some(value);
        }
    }

    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    parse(&text[start..=end])
}

/// Bodies of ```-fenced blocks, language tags stripped
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let tag_len = after
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after.len());
        let body = &after[tag_len..];

        match body.find("```") {
            Some(end) => {
                blocks.push(&body[..end]);
                rest = &body[end + 3..];
            }
            None => break,
        }
    }

    blocks
}
