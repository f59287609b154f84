//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Lookup key for a display name: accents stripped, lowercase, punctuation
/// and repeated whitespace collapsed to single spaces.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Trim and bound a text field by character count.
pub(crate) fn bounded_text(value: &str, label: &str, min: usize, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_folds_accents_and_case() {
        assert_eq!(normalize_key("  José  Núñez "), "jose nunez");
        assert_eq!(normalize_key("ANDI-putra"), "andi putra");
        assert_eq!(normalize_key("   "), "");
    }

    #[test]
    fn bounded_text_counts_chars_not_bytes() {
        assert_eq!(bounded_text(" ñé ", "name", 2, 255), Ok("ñé".to_string()));
        assert!(bounded_text("a", "name", 2, 255).is_err());
        assert!(bounded_text(&"x".repeat(256), "name", 2, 255).is_err());
    }
}
