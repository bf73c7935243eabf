//! HTML fragment parser
//!
//! Parses template source into a fragment of [`Node`]s. Tag names are
//! lower cased, attribute names keep their case so that binding syntax like
//! `[someProp]` survives. The content of `<template>` elements goes into the
//! template's content fragment.

use super::node::Node;
use crate::error::{RenderError, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn parse_html(html: &str) -> Result<Node> {
    let root = Node::fragment();
    let mut parser = HtmlParser {
        input: html,
        pos: 0,
        stack: vec![(String::new(), root.clone())],
    };
    parser.parse()?;
    Ok(root)
}

struct HtmlParser<'a> {
    input: &'a str,
    pos: usize,
    /// Open elements with the node receiving their children.
    stack: Vec<(String, Node)>,
}

impl<'a> HtmlParser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn container(&self) -> &Node {
        // the fragment root is never popped
        &self.stack[self.stack.len() - 1].1
    }

    fn error(&self, message: &str) -> RenderError {
        RenderError::compile(message, format!("template source at offset {}", self.pos))
    }

    fn parse(&mut self) -> Result<()> {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                let end = rest[4..]
                    .find("-->")
                    .ok_or_else(|| self.error("Unterminated comment"))?;
                let comment = Node::comment(&rest[4..4 + end]);
                self.container().append_child(&comment);
                self.pos += 4 + end + 3;
            } else if rest.starts_with("</") {
                let end = rest
                    .find('>')
                    .ok_or_else(|| self.error("Unterminated closing tag"))?;
                let name = rest[2..end].trim().to_ascii_lowercase();
                self.pos += end + 1;
                self.close(&name);
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.parse_open_tag()?;
            } else {
                let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                let end = rest[first..]
                    .find('<')
                    .map(|i| i + first)
                    .unwrap_or(rest.len());
                let text = Node::text(&decode_entities(&rest[..end]));
                self.container().append_child(&text);
                self.pos += end;
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &str) {
        if let Some(depth) = self.stack.iter().rposition(|(tag, _)| tag == name) {
            if depth > 0 {
                self.stack.truncate(depth);
            }
        }
    }

    fn parse_open_tag(&mut self) -> Result<()> {
        self.pos += 1;
        let name_len = self
            .rest()
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(self.rest().len());
        let tag = self.rest()[..name_len].to_ascii_lowercase();
        self.pos += name_len;
        let element = Node::element(&tag);

        let self_closing = loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(&format!("Unterminated tag <{}>", tag)));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            let (name, value) = self.parse_attribute();
            if name.is_empty() {
                // stray character such as a lone '/'
                self.pos += self.rest().chars().next().map_or(1, char::len_utf8);
                continue;
            }
            element.set_attribute(&name, &value);
        };

        self.container().append_child(&element);
        if self_closing || is_void_element(&tag) {
            return Ok(());
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let closing = format!("</{}", tag);
            let rest = self.rest();
            let end = rest.find(&closing).unwrap_or(rest.len());
            if end > 0 {
                element.append_child(&Node::text(&rest[..end]));
            }
            self.pos += end;
            if let Some(gt) = self.rest().find('>') {
                self.pos += gt + 1;
            }
            return Ok(());
        }
        let target = element.template_aware_root();
        self.stack.push((tag, target));
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let rest = self.rest();
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_string();
        self.pos += name_len;
        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return (name, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();
        let rest = self.rest();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = rest[1..].find(quote).map(|i| i + 1).unwrap_or(rest.len());
                let value = &rest[1..end];
                self.pos += (end + 1).min(rest.len());
                value
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        };
        (name, decode_entities(value))
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
