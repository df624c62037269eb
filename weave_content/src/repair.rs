//! Tolerant JSON recovery for extraction-LLM responses (§6, §7 kind 4
//! "parsing failure"). The contract only promises plain-text JSON, but real
//! responses arrive wrapped in markdown fences or followed by trailing
//! prose; this module strips both before falling back to a brace-balanced
//! extraction of the first JSON value in the text.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes `T` from `raw`, repairing markdown fences and trailing prose
/// before giving up. `None` means the response is unrecoverable and the
/// caller should log the truncated raw response and fall back to an empty
/// result (§7 kind 4 propagation policy).
pub fn parse_with_repair<T: DeserializeOwned>(raw: &str) -> Option<T> {
    extract_json_value(raw).and_then(|v| serde_json::from_value(v).ok())
}

/// Recovers the first JSON value in `text`, trying a direct parse, then a
/// fence-stripped parse, then brace/bracket-balanced extraction.
pub fn extract_json_value(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Some(v);
    }
    let unfenced = strip_code_fences(trimmed);
    if let Ok(v) = serde_json::from_str(&unfenced) {
        return Some(v);
    }
    extract_balanced(&unfenced).and_then(|s| serde_json::from_str(&s).ok())
}

fn strip_code_fences(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest;
        if let Some(newline) = s.find('\n') {
            let (first_line, tail) = s.split_at(newline);
            if first_line.chars().all(|c| c.is_alphanumeric()) {
                s = &tail[1..];
            }
        }
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}

/// Finds the first `{` or `[` and returns the substring up to its matching
/// close, skipping braces that occur inside string literals.
fn extract_balanced(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.iter().position(|&c| c == '{' || c == '[')?;
    let open = chars[start];
    let close = if open == '{' { '}' } else { ']' };
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(chars[start..=i].iter().collect());
                }
            }
            _ => {}
        }
    }
    None
}
