//! Error types for the narrative context engine's pure-logic crates (§7).
//!
//! Hand-rolled `Display`/`Error`, mirroring the teacher's `SynError` shape but
//! widened to the error taxonomy kinds a pure-logic crate can raise:
//! validation, consistency conflicts, and internal invariant violations.
//! External-dependency failures and parse-repair live in `weave_api`/`weave_content`
//! where `thiserror` is used instead (see DESIGN.md for the split).

use std::fmt;

/// Error kinds raised by the branch store, NPC tracker, and context assembler.
#[derive(Debug)]
pub enum CoreError {
    /// Bad input reaching a public method: missing branch, empty text, out-of-range id.
    InvalidInput(String),
    /// A foreign-key or uniqueness conflict surfaced mid-operation (§7 kind 2).
    Conflict(String),
    /// Referenced entity does not exist.
    NotFound(String),
    /// An internal invariant was violated (§7 kind 5) — always logged at error level
    /// by the caller before this is turned into a sentinel empty result.
    InvariantViolation(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CoreError::Conflict(msg) => write!(f, "consistency conflict: {msg}"),
            CoreError::NotFound(msg) => write!(f, "not found: {msg}"),
            CoreError::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Result alias using [`CoreError`].
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let err = CoreError::NotFound("scene 9".into());
        assert_eq!(err.to_string(), "not found: scene 9");
    }
}
