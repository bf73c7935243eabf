//! Utility Functions

use once_cell::sync::Lazy;
use regex::Regex;

static DASH_CASE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+([a-z0-9])").unwrap());
static CAMEL_CASE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])").unwrap());

/// Convert dash-case to camelCase
pub fn dash_case_to_camel_case(input: &str) -> String {
    DASH_CASE_REGEXP
        .replace_all(input, |caps: &regex::Captures| caps[1].to_uppercase())
        .to_string()
}

/// Convert camelCase to dash-case
pub fn camel_case_to_dash_case(input: &str) -> String {
    CAMEL_CASE_REGEXP
        .replace_all(input, |caps: &regex::Captures| {
            format!("-{}", caps[1].to_lowercase())
        })
        .to_string()
}

/// Split string at the first occurrence of `character`, trimming both parts.
pub fn split_at(input: &str, character: char) -> Option<(&str, &str)> {
    input
        .find(character)
        .map(|i| (input[..i].trim(), input[i + character.len_utf8()..].trim()))
}
