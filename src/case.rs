//! Identifier case conversion.

use std::sync::LazyLock;

use regex::Regex;

// Boundary before a capitalised word, e.g. `anotherA|Test`.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static CAPITALISED_WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());

// Boundary between a lowercase letter or digit and an uppercase letter.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static LOWER_UPPER_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Converts a camelCase or PascalCase identifier to snake_case.
///
/// Capitalised words are split off first, then any remaining
/// lowercase-to-uppercase transitions, so an acronym followed by a
/// capitalised word splits before the word rather than inside the
/// acronym (`HTTPResponse` becomes `http_response`). The passes must run
/// in this order; merging them changes the result for mixed input.
///
/// Never fails: any string is accepted and the empty string maps to itself.
pub fn camel_to_snake(camel: &str) -> String {
    let split_words = CAPITALISED_WORD_BOUNDARY.replace_all(camel, "${1}_${2}");
    LOWER_UPPER_BOUNDARY
        .replace_all(&split_words, "${1}_${2}")
        .to_lowercase()
}
