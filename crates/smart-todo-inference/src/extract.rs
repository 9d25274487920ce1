//! Best-effort JSON extraction from free-text model replies.
//!
//! Models wrap their JSON in prose, markdown fences, or emit several
//! objects. Candidates are tried in order until one deserializes into the
//! requested type:
//!
//! 1. the greedy span from the first `{` to the last `}`;
//! 2. each top-level balanced `{...}` block, skipping braces inside strings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static GREEDY_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex is valid"));

/// Extract the first candidate object in `text` that deserializes as `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    candidates(text)
        .into_iter()
        .find_map(|candidate| serde_json::from_str(candidate).ok())
}

/// Candidate JSON spans in the order they should be tried.
pub fn candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    if let Some(m) = GREEDY_OBJECT.find(text) {
        out.push(m.as_str());
    }
    for block in balanced_blocks(text) {
        if !out.contains(&block) {
            out.push(block);
        }
    }
    out
}

/// Top-level `{...}` blocks with balanced braces. Braces inside JSON string
/// literals are ignored; an unterminated trailing block is dropped.
fn balanced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    blocks.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Category {
        suggested_category: String,
    }

    #[test]
    fn test_plain_object() {
        let v: Value = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn test_fenced_and_prefixed_reply() {
        let reply = "Sure! Here is the analysis:\n```json\n{\"suggested_category\": \"Work\"}\n```\nLet me know.";
        let parsed: Category = extract_json(reply).unwrap();
        assert_eq!(parsed.suggested_category, "Work");
    }

    #[test]
    fn test_multiple_objects_falls_back_to_first_valid_block() {
        // Greedy span covers both objects and is not valid JSON.
        let reply = r#"{"suggested_category": "Health"} and also {"suggested_category": "Work"}"#;
        let parsed: Category = extract_json(reply).unwrap();
        assert_eq!(parsed.suggested_category, "Health");
    }

    #[test]
    fn test_skips_blocks_missing_required_field() {
        let reply = r#"{"note": "thinking"} {"suggested_category": "Finance"}"#;
        let parsed: Category = extract_json(reply).unwrap();
        assert_eq!(parsed.suggested_category, "Finance");
    }

    #[test]
    fn test_braces_inside_strings_do_not_split_blocks() {
        let reply = r#"prefix {"suggested_category": "a } b"} suffix }"#;
        let parsed: Category = extract_json(reply).unwrap();
        assert_eq!(parsed.suggested_category, "a } b");
    }

    #[test]
    fn test_no_json_returns_none() {
        assert!(extract_json::<Value>("I could not analyse this.").is_none());
        assert!(extract_json::<Value>("").is_none());
    }

    #[test]
    fn test_malformed_json_returns_none() {
        assert!(extract_json::<Value>(r#"{"keywords": [1, 2,}"#).is_none());
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        assert_eq!(balanced_blocks(r#"{"a": 1} {"b": "#), vec![r#"{"a": 1}"#]);
    }

    #[test]
    fn test_candidates_order_greedy_first() {
        let text = r#"x {"a":1} y {"b":2} z"#;
        let c = candidates(text);
        assert_eq!(c[0], r#"{"a":1} y {"b":2}"#);
        assert_eq!(&c[1..], &[r#"{"a":1}"#, r#"{"b":2}"#]);
    }
}
