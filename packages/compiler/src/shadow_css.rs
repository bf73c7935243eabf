//! Shadow CSS
//!
//! Emulates shadow DOM style encapsulation by rewriting selectors. Every
//! compound selector of a rule gets the content attribute of the component
//! appended (`.foo` becomes `.foo[_ngcontent-0]`) and `:host` selectors are
//! replaced by the host attribute (`:host(.a)` becomes `[_nghost-0].a`).
//!
//! Rules are re-emitted as `selector {\n<declarations>\n}` separated by a blank
//! line. Comments are dropped. `@media`, `@supports` and `@document` blocks are
//! scoped recursively, other at-rules are kept verbatim.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").unwrap());

static COLON_HOST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":host(?:\(([^)]*)\))?").unwrap());

const SCOPED_AT_RULES: &[&str] = &["@media", "@supports", "@document"];

#[derive(Debug, Clone, PartialEq)]
enum CssBlock {
    Rule { selector: String, body: String },
    AtRule { prelude: String, body: Option<String> },
}

#[derive(Debug, Default)]
pub struct ShadowCss;

impl ShadowCss {
    pub fn new() -> Self {
        ShadowCss
    }

    /// Shim `css_text` for one component.
    ///
    /// `content_attr` is added to all elements of the component's template,
    /// `host_attr` to the host element itself.
    pub fn shim_css_text(&self, css_text: &str, content_attr: &str, host_attr: &str) -> String {
        let css_text = COMMENT_RE.replace_all(css_text, "");
        self.scope_blocks(&parse_blocks(&css_text), content_attr, host_attr)
    }

    fn scope_blocks(&self, blocks: &[CssBlock], content_attr: &str, host_attr: &str) -> String {
        blocks
            .iter()
            .map(|block| match block {
                CssBlock::Rule { selector, body } => format!(
                    "{} {{\n{}\n}}",
                    self.scope_selector(selector, content_attr, host_attr),
                    body.trim()
                ),
                CssBlock::AtRule {
                    prelude,
                    body: Some(body),
                } if SCOPED_AT_RULES.iter().any(|r| prelude.starts_with(r)) => format!(
                    "{} {{\n{}\n}}",
                    prelude,
                    self.scope_blocks(&parse_blocks(body), content_attr, host_attr)
                ),
                CssBlock::AtRule {
                    prelude,
                    body: Some(body),
                } => format!("{} {{\n{}\n}}", prelude, body.trim()),
                CssBlock::AtRule { prelude, body: None } => format!("{};", prelude),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Scope a selector list.
    pub fn scope_selector(&self, selector: &str, content_attr: &str, host_attr: &str) -> String {
        split_outside_groups(selector, |c| c == ',')
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| self.scope_complex_selector(part, content_attr, host_attr))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn scope_complex_selector(&self, selector: &str, content_attr: &str, host_attr: &str) -> String {
        let mut out = String::new();
        for (compound, combinator) in split_compounds(selector) {
            if !compound.is_empty() {
                out.push_str(&self.scope_compound(&compound, content_attr, host_attr));
            }
            out.push_str(&combinator);
        }
        out
    }

    fn scope_compound(&self, compound: &str, content_attr: &str, host_attr: &str) -> String {
        if COLON_HOST_RE.is_match(compound) {
            return COLON_HOST_RE
                .replace_all(compound, |caps: &Captures| {
                    let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                    format!("[{}]{}", host_attr, inner)
                })
                .into_owned();
        }
        let attr = format!("[{}]", content_attr);
        match pseudo_start(compound) {
            Some(0) => format!("{}{}", attr, compound),
            Some(i) => format!("{}{}{}", &compound[..i], attr, &compound[i..]),
            None => format!("{}{}", compound, attr),
        }
    }
}

/// Index of the first pseudo class or element outside brackets.
fn pseudo_start(compound: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in compound.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits on characters matching `is_separator` that are not nested in
/// brackets, parentheses or quotes.
fn split_outside_groups(input: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                c if depth == 0 && is_separator(c) => {
                    parts.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            },
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

/// Splits a complex selector into compound selectors, each followed by the
/// combinator text that separates it from the next one.
fn split_compounds(selector: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();
    let mut compound = String::new();
    let mut combinator = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in selector.chars() {
        let is_combinator = quote.is_none()
            && depth == 0
            && (c.is_whitespace() || matches!(c, '>' | '+' | '~'));
        if is_combinator {
            combinator.push(c);
            continue;
        }
        if !combinator.is_empty() {
            if compound.is_empty() {
                // leading combinator such as `> .a`
                result.push((String::new(), std::mem::take(&mut combinator)));
            } else {
                result.push((std::mem::take(&mut compound), normalize(&combinator)));
                combinator.clear();
            }
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                _ => {}
            },
        }
        compound.push(c);
    }
    if !compound.is_empty() {
        result.push((compound, String::new()));
    }
    result
        .into_iter()
        .filter(|(compound, combinator)| !compound.is_empty() || !combinator.trim().is_empty())
        .collect()
}

fn normalize(combinator: &str) -> String {
    match combinator.trim() {
        "" => " ".to_string(),
        c => format!(" {} ", c),
    }
}

/// Splits css text into top level rules and at-rules.
fn parse_blocks(css: &str) -> Vec<CssBlock> {
    let mut blocks = Vec::new();
    let mut prelude = String::new();
    let mut chars = css.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '{' => {
                let start = i + 1;
                let mut depth = 1;
                let mut end = css.len();
                let mut quote: Option<char> = None;
                for (j, d) in chars.by_ref() {
                    match quote {
                        Some(q) if d == q => quote = None,
                        Some(_) => {}
                        None => match d {
                            '"' | '\'' => quote = Some(d),
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    end = j;
                                    break;
                                }
                            }
                            _ => {}
                        },
                    }
                }
                let head = prelude.trim().to_string();
                let body = css[start..end].to_string();
                prelude.clear();
                if head.starts_with('@') {
                    blocks.push(CssBlock::AtRule {
                        prelude: head,
                        body: Some(body),
                    });
                } else {
                    blocks.push(CssBlock::Rule {
                        selector: head,
                        body,
                    });
                }
            }
            ';' if prelude.trim_start().starts_with('@') => {
                blocks.push(CssBlock::AtRule {
                    prelude: prelude.trim().to_string(),
                    body: None,
                });
                prelude.clear();
            }
            _ => prelude.push(c),
        }
    }
    blocks
}
