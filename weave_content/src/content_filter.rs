//! Content-rating gating for the system prompt's content-permission clause
//! (§4.3 message 1). Keyword- and pattern-based NSFW detection used at story
//! creation time, plus the prevention clause injected into generation
//! prompts for SFW-rated stories.

use once_cell::sync::Lazy;
use regex::Regex;

const NSFW_KEYWORDS: &[&str] = &[
    "sex", "sexual", "erotic", "porn", "pornography", "xxx", "nude", "naked", "nsfw", "explicit",
    "mature", "sensual", "orgasm", "arousal", "intercourse", "seduction", "lust", "bedroom",
    "strip", "undress", "gore", "brutal", "torture", "mutilate", "dismember", "decapitate",
    "massacre", "slaughter", "carnage", "disturbing", "gruesome", "macabre", "morbid",
    "drug abuse", "overdose", "narcotic", "18+", "adults only", "not safe for work",
];

static NSFW_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)\b(sex|porn|nude|naked)\b", r"18\+", r"(?i)xxx", r"(?i)nsfw"]
        .iter()
        .map(|p| Regex::new(p).expect("static NSFW pattern is valid"))
        .collect()
});

/// Scans `text` for NSFW keywords/patterns, returning every distinct hit
/// (case-insensitive, deduplicated, order of first appearance in
/// `NSFW_KEYWORDS` then pattern order).
pub fn has_disallowed_keywords(text: &str) -> Vec<&'static str> {
    if text.is_empty() {
        return Vec::new();
    }
    let lower = text.to_lowercase();
    let mut found: Vec<&'static str> = NSFW_KEYWORDS.iter().copied().filter(|k| lower.contains(k)).collect();
    for pattern in NSFW_PATTERNS.iter() {
        if pattern.is_match(text) {
            if let Some(&matched) = NSFW_KEYWORDS.iter().find(|k| pattern.is_match(k)) {
                if !found.contains(&matched) {
                    found.push(matched);
                }
            }
        }
    }
    found
}

/// Outcome of validating title/description against a user's NSFW permission.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentVerdict {
    Allowed,
    Blocked { keywords: Vec<&'static str> },
}

/// §4 "validate_story_content": title/description gating at story-creation
/// time. Always `Allowed` when `allow_nsfw` is set.
pub fn validate_title_and_description(title: &str, description: &str, allow_nsfw: bool) -> ContentVerdict {
    if allow_nsfw {
        return ContentVerdict::Allowed;
    }
    let mut keywords = has_disallowed_keywords(title);
    for kw in has_disallowed_keywords(description) {
        if !keywords.contains(&kw) {
            keywords.push(kw);
        }
    }
    if keywords.is_empty() {
        ContentVerdict::Allowed
    } else {
        ContentVerdict::Blocked { keywords }
    }
}

/// Injected into the system prompt's content-permission clause (§4.3 message
/// 1) for SFW-rated stories, steering the main LLM away from disallowed
/// content rather than relying solely on post-hoc detection.
pub fn nsfw_prevention_clause() -> &'static str {
    "CRITICAL CONTENT POLICY - FAMILY-FRIENDLY MODE: this story is being generated \
     for a user with content restrictions. Avoid sexual content beyond affectionate \
     gestures, avoid graphic violence or gore, avoid explicit language and drug or \
     alcohol abuse, and avoid horror or disturbing imagery. Keep all content \
     appropriate for ages 13 and up, redirecting inappropriate requests toward \
     adventure, friendship, and positive themes."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_keywords() {
        assert!(has_disallowed_keywords("").is_empty());
    }

    #[test]
    fn detects_keyword_case_insensitively() {
        let found = has_disallowed_keywords("A deeply EROTIC tale of two rival bakers.");
        assert!(found.contains(&"erotic"));
    }

    #[test]
    fn clean_text_passes_validation() {
        let verdict = validate_title_and_description("The Baker's Rivalry", "Two bakers compete for a blue ribbon.", false);
        assert_eq!(verdict, ContentVerdict::Allowed);
    }

    #[test]
    fn nsfw_text_blocked_unless_allowed() {
        let verdict = validate_title_and_description("Explicit Desires", "A story about lust and seduction.", false);
        assert!(matches!(verdict, ContentVerdict::Blocked { .. }));
        let allowed = validate_title_and_description("Explicit Desires", "A story about lust and seduction.", true);
        assert_eq!(allowed, ContentVerdict::Allowed);
    }

    #[test]
    fn pattern_detects_age_restriction_marker() {
        let found = has_disallowed_keywords("Rated 18+ for mature themes.");
        assert!(found.contains(&"18+"));
    }
}
