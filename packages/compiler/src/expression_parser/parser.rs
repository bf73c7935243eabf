/**
 * Binding Expression Parser
 *
 * Splits binding sources into their pipe chain, interpolation parts and
 * template microsyntax. Expression bodies are validated for balanced
 * delimiters and kept as source.
 */
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::ast::{Ast, AstWithSource, TemplateBinding};
use crate::error::{RenderError, Result};

static INTERPOLATION_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([\s\S]*?)\}\}").unwrap());

/// Service turning template strings into expression ASTs.
pub trait ExpressionParser {
    fn parse_binding(&self, input: &str, location: &str) -> Result<AstWithSource>;

    fn parse_action(&self, input: &str, location: &str) -> Result<AstWithSource>;

    /// `None` when `input` has no `{{ }}` part.
    fn parse_interpolation(&self, input: &str, location: &str) -> Result<Option<AstWithSource>>;

    fn parse_template_bindings(&self, input: &str, location: &str) -> Result<Vec<TemplateBinding>>;

    fn wrap_literal_primitive(&self, input: &str, location: &str) -> AstWithSource {
        AstWithSource::new(
            Ast::LiteralPrimitive {
                value: Value::String(input.to_string()),
            },
            input,
            location,
        )
    }

    fn add_pipes(&self, binding: AstWithSource, pipes: &[String]) -> AstWithSource {
        pipes.iter().fold(binding, |inner, pipe| {
            let source = format!("{} | {}", inner.source, pipe);
            AstWithSource::new(
                Ast::Pipe {
                    exp: Box::new(inner.ast),
                    name: pipe.clone(),
                    args: Vec::new(),
                },
                source,
                inner.location,
            )
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct SourceExpressionParser;

impl SourceExpressionParser {
    pub fn new() -> Self {
        SourceExpressionParser
    }

    fn error(&self, message: &str, input: &str, location: &str) -> RenderError {
        RenderError::ExpressionParse {
            message: message.to_string(),
            source_text: input.to_string(),
            location: location.to_string(),
        }
    }

    fn parse_expression(&self, input: &str, location: &str) -> Result<Ast> {
        if input.trim().is_empty() {
            return Err(self.error("Blank expressions are not allowed", input, location));
        }
        check_balanced(input).map_err(|message| self.error(&message, input, location))?;
        let mut segments = split_top_level(input, '|').into_iter();
        let head = segments.next().unwrap_or_default();
        if head.trim().is_empty() {
            return Err(self.error("Missing expression before a pipe", input, location));
        }
        let mut ast = Ast::Source {
            source: head.trim().to_string(),
        };
        for segment in segments {
            let mut parts = split_top_level(&segment, ':').into_iter();
            let name = parts.next().unwrap_or_default().trim().to_string();
            if name.is_empty() {
                return Err(self.error("Missing pipe name", input, location));
            }
            let args = parts
                .map(|arg| Ast::Source {
                    source: arg.trim().to_string(),
                })
                .collect();
            ast = Ast::Pipe {
                exp: Box::new(ast),
                name,
                args,
            };
        }
        Ok(ast)
    }
}

impl ExpressionParser for SourceExpressionParser {
    fn parse_binding(&self, input: &str, location: &str) -> Result<AstWithSource> {
        if INTERPOLATION_REGEXP.is_match(input) {
            return Err(self.error(
                "Got interpolation ({{}}) where expression was expected",
                input,
                location,
            ));
        }
        if split_top_level(input, ';').len() > 1 {
            return Err(self.error(
                "Binding expression cannot contain chained expression",
                input,
                location,
            ));
        }
        let ast = self.parse_expression(input, location)?;
        Ok(AstWithSource::new(ast, input, location))
    }

    fn parse_action(&self, input: &str, location: &str) -> Result<AstWithSource> {
        check_balanced(input).map_err(|message| self.error(&message, input, location))?;
        if split_top_level(input, '|').len() > 1 {
            return Err(self.error(
                "Cannot have a pipe in an action expression",
                input,
                location,
            ));
        }
        if input.trim().is_empty() {
            return Err(self.error("Blank expressions are not allowed", input, location));
        }
        Ok(AstWithSource::new(
            Ast::Source {
                source: input.trim().to_string(),
            },
            input,
            location,
        ))
    }

    fn parse_interpolation(&self, input: &str, location: &str) -> Result<Option<AstWithSource>> {
        if !INTERPOLATION_REGEXP.is_match(input) {
            return Ok(None);
        }
        let mut strings = Vec::new();
        let mut expressions = Vec::new();
        let mut last = 0;
        for cap in INTERPOLATION_REGEXP.captures_iter(input) {
            let (Some(whole), Some(expression)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            strings.push(input[last..whole.start()].to_string());
            expressions.push(self.parse_expression(expression.as_str(), location)?);
            last = whole.end();
        }
        strings.push(input[last..].to_string());
        Ok(Some(AstWithSource::new(
            Ast::Interpolation {
                strings,
                expressions,
            },
            input,
            location,
        )))
    }

    fn parse_template_bindings(&self, input: &str, location: &str) -> Result<Vec<TemplateBinding>> {
        let mut bindings = Vec::new();
        let mut prefix: Option<String> = None;
        let mut rest = input.trim_start();
        while !rest.is_empty() {
            let key_is_var = if let Some(r) = rest.strip_prefix('#') {
                rest = r;
                true
            } else if let Some(r) = strip_var_keyword(rest) {
                rest = r.trim_start();
                true
            } else {
                false
            };
            let (mut key, r) = take_key(rest);
            if key.is_empty() {
                return Err(self.error("expected identifier", input, location));
            }
            rest = r.trim_start();
            if !key_is_var {
                match &prefix {
                    None => prefix = Some(key.clone()),
                    Some(p) => key = format!("{}-{}", p, key),
                }
            }
            if let Some(r) = rest.strip_prefix(':') {
                rest = r.trim_start();
            }

            let mut name = None;
            let mut expression = None;
            if key_is_var {
                if let Some(r) = rest.strip_prefix('=') {
                    let (exported, r) = take_key(r.trim_start());
                    if exported.is_empty() {
                        return Err(self.error("expected identifier", input, location));
                    }
                    name = Some(exported);
                    rest = r.trim_start();
                } else {
                    name = Some("$implicit".to_string());
                }
            } else if !rest.is_empty()
                && !rest.starts_with(['#', ';', ','])
                && strip_var_keyword(rest).is_none()
            {
                let end = expression_end(rest);
                let source = rest[..end].trim();
                let ast = self.parse_expression(source, location)?;
                expression = Some(AstWithSource::new(ast, source, location));
                rest = rest[end..].trim_start();
            }
            bindings.push(TemplateBinding {
                key,
                key_is_var,
                name,
                expression,
            });
            if let Some(r) = rest.strip_prefix([';', ',']) {
                rest = r.trim_start();
            }
        }
        Ok(bindings)
    }
}

fn strip_var_keyword(input: &str) -> Option<&str> {
    input
        .strip_prefix("var")
        .filter(|r| r.starts_with(char::is_whitespace))
}

fn take_key(input: &str) -> (String, &str) {
    let end = input
        .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '$' | '.')))
        .unwrap_or(input.len());
    (input[..end].to_string(), &input[end..])
}

/// End of a microsyntax expression: a top level `;` or `,`, or the start of
/// a variable declaration.
fn expression_end(input: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut previous_is_space = false;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ';' | ',' if depth == 0 => return i,
                '#' if depth == 0 && previous_is_space => return i,
                'v' if depth == 0
                    && previous_is_space
                    && strip_var_keyword(&input[i..]).is_some() =>
                {
                    return i
                }
                _ => {}
            },
        }
        previous_is_space = c.is_whitespace();
    }
    input.len()
}

/// Splits on `separator` outside of strings and groups. A `|` that is part
/// of `||` is not a separator.
fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let chars: Vec<char> = input.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    let doubled = separator == '|'
                        && (chars.get(i + 1) == Some(&'|') || (i > 0 && chars[i - 1] == '|'));
                    if !doubled {
                        parts.push(std::mem::take(&mut current));
                        continue;
                    }
                }
                _ => {}
            },
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

fn check_balanced(input: &str) -> std::result::Result<(), String> {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => {
                    if stack.pop() != Some(c) {
                        return Err(format!("Unexpected token '{}'", c));
                    }
                }
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    match stack.last() {
        Some(expected) => Err(format!("Missing expected {}", expected)),
        None => Ok(()),
    }
}
