//! URL slug normalization for product titles.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize `raw` into a product slug.
///
/// Lowercases, decomposes accented characters and drops their combining marks,
/// removes everything outside `[a-z0-9]` and whitespace, trims, then joins the
/// remaining words with a single `_`. Existing underscores count as word
/// separators, so `slugify(slugify(x)) == slugify(x)`.
///
/// ```
/// use domain_products::slug::slugify;
///
/// assert_eq!(slugify("Men's Chill Crew Neck"), "mens_chill_crew_neck");
/// assert_eq!(slugify("Camiseta Básica"), "camiseta_basica");
/// ```
pub fn slugify(raw: &str) -> String {
    let decomposed: String = raw
        .to_lowercase()
        .replace('_', " ")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let cleaned = DISALLOWED.replace_all(&decomposed, "");
    WHITESPACE_RUN.replace_all(cleaned.trim(), "_").into_owned()
}
