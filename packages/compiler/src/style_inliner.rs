//! Style Inliner
//!
//! Replaces `@import` rules with the content of the imported stylesheet.
//! Imports are fetched through [`Xhr`] and inlined recursively; a url that
//! was already inlined is not imported again.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::try_join_all;
use futures::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::RenderError;
use crate::pending::{LocalFuture, SyncOrPending};
use crate::style_url_resolver::{resolve_url, resolve_urls};
use crate::xhr::Xhr;

static IMPORT_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"@import\s+([^;]+);").unwrap());
/// `url(x)`, `url('x')`, `url("x")`, `'x'` or `"x"`
static URL_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(\s*?['"]?([^'")]+)['"]?|['"]([^'")]+)['"]"#).unwrap());
static MEDIA_QUERY_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"][^'"]+['"]\s*\)?\s*(.*)"#).unwrap());

pub struct StyleInliner {
    xhr: Rc<dyn Xhr>,
}

impl StyleInliner {
    pub fn new(xhr: Rc<dyn Xhr>) -> Self {
        StyleInliner { xhr }
    }

    /// Inlines the imports of `css_text`. Without imports the text is returned
    /// as is, otherwise the inlined text is pending until every import has
    /// been fetched.
    pub fn inline_imports(&self, css_text: &str, base_url: &str) -> SyncOrPending<String> {
        inline(self.xhr.clone(), css_text, base_url, Rc::new(RefCell::new(Vec::new())))
    }
}

fn inline(
    xhr: Rc<dyn Xhr>,
    css_text: &str,
    base_url: &str,
    inlined_urls: Rc<RefCell<Vec<String>>>,
) -> SyncOrPending<String> {
    if !IMPORT_REGEXP.is_match(css_text) {
        return SyncOrPending::Ready(css_text.to_string());
    }

    let mut parts: Vec<LocalFuture<String>> = Vec::new();
    let mut last = 0;
    for cap in IMPORT_REGEXP.captures_iter(css_text) {
        let (Some(whole), Some(rule)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let prefix = css_text[last..whole.start()].to_string();
        last = whole.end();
        let rule = rule.as_str();

        let Some(url) = extract_url(rule).map(|url| resolve_url(Some(base_url), &url)) else {
            let comment = format!("{}/* Invalid import rule: \"@import {};\" */", prefix, rule);
            parts.push(futures::future::ready(Ok(comment)).boxed_local());
            continue;
        };
        if inlined_urls.borrow().contains(&url) {
            // importing twice could loop forever
            parts.push(futures::future::ready(Ok(prefix)).boxed_local());
            continue;
        }
        inlined_urls.borrow_mut().push(url.clone());

        let media_query = extract_media_query(rule);
        let xhr = xhr.clone();
        let inlined_urls = inlined_urls.clone();
        parts.push(
            async move {
                debug!(url = %url, "inlining stylesheet");
                let css = xhr.get(&url).await?;
                let css = match inline(xhr, &css, &url, inlined_urls) {
                    SyncOrPending::Ready(css) => css,
                    SyncOrPending::Pending(nested) => nested.await?,
                };
                Ok::<_, RenderError>(format!("{}{}\n", prefix, transform_imported_css(&css, media_query.as_deref(), &url)))
            }
            .boxed_local(),
        );
    }
    let suffix = css_text[last..].to_string();
    SyncOrPending::Pending(
        try_join_all(parts)
            .map(move |parts| parts.map(|parts| parts.concat() + &suffix))
            .boxed_local(),
    )
}

fn transform_imported_css(css: &str, media_query: Option<&str>, url: &str) -> String {
    let css = resolve_urls(css, url);
    match media_query {
        Some(query) => format!("@media {} {{\n{}\n}}", query, css),
        None => css,
    }
}

fn extract_url(import_rule: &str) -> Option<String> {
    let cap = URL_REGEXP.captures(import_rule)?;
    cap.get(1)
        .or_else(|| cap.get(2))
        .map(|m| m.as_str().to_string())
}

fn extract_media_query(import_rule: &str) -> Option<String> {
    let cap = MEDIA_QUERY_REGEXP.captures(import_rule)?;
    let query = cap.get(1)?.as_str().trim();
    (!query.is_empty()).then(|| query.to_string())
}
