//! Slug validation and generation.
//!
//! A slug is the storage key of a redirection and the path segment visitors use,
//! so only lowercase ASCII letters, digits and hyphens are allowed.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Maximum slug length accepted on creation.
pub const MAX_SLUG_LEN: usize = 100;

/// Compiled slug pattern, shared with request DTO validation.
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug regex is valid"));

/// Validates a slug supplied at creation time.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the slug is empty, too long, or contains
/// characters outside `[a-z0-9-]`.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() {
        return Err(AppError::bad_request(
            "Slug is required",
            json!({ "field": "slug" }),
        ));
    }

    if slug.len() > MAX_SLUG_LEN {
        return Err(AppError::bad_request(
            "Slug is too long",
            json!({ "field": "slug", "max_length": MAX_SLUG_LEN }),
        ));
    }

    if !SLUG_REGEX.is_match(slug) {
        return Err(AppError::bad_request(
            "Slug must contain only lowercase letters, numbers, and hyphens",
            json!({ "field": "slug", "slug": slug }),
        ));
    }

    Ok(())
}

/// Derives a slug from a title.
///
/// Lowercases, drops everything except `[a-z0-9]`, whitespace and hyphens,
/// turns whitespace runs into single hyphens, collapses repeated hyphens and
/// trims them from both ends. May return an empty string for titles without
/// any usable characters.
///
/// ```ignore
/// assert_eq!(slugify("Hello, World!  2025"), "hello-world-2025");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}
