//! Word-boundary name scanning shared by NPC text verification (§4.2) and
//! turn-mode resolution (§4.3): both need "does this name appear in this
//! text, and where" with the same case-insensitive, whole-word semantics.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

/// Case-insensitive, whole-word regex matching `name` exactly, cached so
/// repeated scans over the same roster don't recompile a pattern per call.
pub fn word_boundary_regex(name: &str) -> Regex {
    static CACHE: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));
    let mut cache = CACHE.lock().expect("text_scan regex cache lock");
    if let Some(re) = cache.get(name) {
        return re.clone();
    }
    let escaped = regex::escape(name);
    let re = Regex::new(&format!(r"(?i)\b{escaped}\b")).expect("escaped literal is always a valid pattern");
    cache.insert(name.to_string(), re.clone());
    re
}

/// Byte offset of the first whole-word, case-insensitive occurrence of
/// `name` in `haystack`, or `None` if it never appears.
pub fn find_name_occurrence(haystack: &str, name: &str) -> Option<usize> {
    word_boundary_regex(name).find(haystack).map(|m| m.start())
}

/// Scans `haystack` for every name in `names` (tried as both the literal
/// form and, if it contains whitespace, its first word), returning the
/// subset that occur, ordered by first-match byte offset (§4.3 "ordered by
/// mention position").
pub fn mentioned_names_ordered<'a>(haystack: &str, names: &[&'a str]) -> Vec<&'a str> {
    let mut hits: Vec<(usize, &str)> = Vec::new();
    for &name in names {
        let first_word = name.split_whitespace().next().unwrap_or(name);
        let position = find_name_occurrence(haystack, name).or_else(|| {
            if first_word != name {
                find_name_occurrence(haystack, first_word)
            } else {
                None
            }
        });
        if let Some(pos) = position {
            hits.push((pos, name));
        }
    }
    hits.sort_by_key(|(pos, _)| *pos);
    hits.into_iter().map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_whole_word_occurrence_case_insensitively() {
        assert_eq!(find_name_occurrence("mira walked in.", "Mira"), Some(0));
        assert!(find_name_occurrence("Miranda walked in.", "Mira").is_none());
    }

    #[test]
    fn mentioned_names_ordered_by_position_with_first_name_fallback() {
        let names = ["Sheriff Reynolds", "Mira"];
        let hits = mentioned_names_ordered("Mira waited while Reynolds approached.", &names);
        assert_eq!(hits, vec!["Mira", "Sheriff Reynolds"]);
    }

    #[test]
    fn names_never_mentioned_are_excluded() {
        let names = ["Gareth"];
        assert!(mentioned_names_ordered("An empty room.", &names).is_empty());
    }
}
