//! Style URL Resolver
//!
//! Rewrites relative urls inside stylesheets (`url(...)` values and quoted
//! `@import` rules) so that they are relative to the template the style came
//! from instead of the document.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

static CSS_URL_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(url\()\s*["']?([^'")]*)["']?\s*(\))"#).unwrap());

/// Only matches quoted imports; `@import url(...)` is handled as a url value.
static CSS_IMPORT_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(@import\s+)["']([^'"]*)["'](.*;)"#).unwrap());

/// Resolves `url` against `base_url`. Absolute urls and urls that cannot be
/// resolved are returned unchanged.
pub fn resolve_url(base_url: Option<&str>, url: &str) -> String {
    if Url::parse(url).is_ok() {
        return url.to_string();
    }
    let Some(base) = base_url.filter(|b| !b.is_empty()) else {
        return url.to_string();
    };
    match Url::parse(base).and_then(|b| b.join(url)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) if url.starts_with('/') => url.to_string(),
        Err(_) => match base.rfind('/') {
            Some(i) => format!("{}{}", &base[..=i], url),
            None => url.to_string(),
        },
    }
}

/// Rewrites every `url(...)` and quoted `@import` of `css_text`, quoting the
/// result with single quotes.
pub fn resolve_urls(css_text: &str, base_url: &str) -> String {
    let css = CSS_URL_REGEXP.replace_all(css_text, |caps: &Captures| {
        format!(
            "{}'{}'{}",
            &caps[1],
            resolve_url(Some(base_url), &caps[2]),
            &caps[3]
        )
    });
    CSS_IMPORT_REGEXP
        .replace_all(&css, |caps: &Captures| {
            format!(
                "{}'{}'{}",
                &caps[1],
                resolve_url(Some(base_url), &caps[2]),
                &caps[3]
            )
        })
        .into_owned()
}
