//! Property Binding Parser
//!
//! Parses the binding attributes of an element:
//! - `bind-name` / `[name]`: property bindings,
//! - `var-name` / `#name`: local variables,
//! - `on-name` / `(name)`: event bindings,
//! - plain attributes whose value contains `{{ }}`.

use std::rc::Rc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::compile_control::CompileControl;
use super::compile_element::CompileElement;
use super::compile_step::CompileStep;
use crate::error::Result;
use crate::expression_parser::{AstWithSource, ExpressionParser};
use crate::util::dash_case_to_camel_case;

static BIND_NAME_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:(?:(bind-)|(var-|#)|(on-))(.+))|\[([^\]]+)\]|\(([^\)]+)\))$").unwrap()
});

const IMPLICIT_VARIABLE: &str = "$implicit";

pub struct PropertyBindingParser {
    parser: Rc<dyn ExpressionParser>,
}

impl PropertyBindingParser {
    pub fn new(parser: Rc<dyn ExpressionParser>) -> Self {
        PropertyBindingParser { parser }
    }

    fn bind_property_ast(
        &self,
        name: &str,
        ast: AstWithSource,
        current: &mut CompileElement,
        new_attrs: &mut IndexMap<String, String>,
    ) {
        new_attrs.insert(name.to_string(), ast.source.clone());
        current
            .bind_element()
            .borrow_mut()
            .bind_property(&dash_case_to_camel_case(name), ast);
    }

    fn bind_property(
        &self,
        name: &str,
        expression: &str,
        current: &mut CompileElement,
        new_attrs: &mut IndexMap<String, String>,
    ) -> Result<()> {
        let ast = self
            .parser
            .parse_binding(expression, &current.element_description)?;
        self.bind_property_ast(name, ast, current, new_attrs);
        Ok(())
    }

    fn bind_variable(
        &self,
        identifier: &str,
        value: &str,
        current: &mut CompileElement,
        new_attrs: &mut IndexMap<String, String>,
    ) {
        current
            .bind_element()
            .borrow_mut()
            .bind_variable(&dash_case_to_camel_case(identifier), value);
        new_attrs.insert(identifier.to_string(), value.to_string());
    }

    /// Event names are not added to the attributes, directives never match on them.
    fn bind_event(&self, name: &str, expression: &str, current: &mut CompileElement) -> Result<()> {
        let ast = self
            .parser
            .parse_action(expression, &current.element_description)?;
        current
            .bind_element()
            .borrow_mut()
            .bind_event(&dash_case_to_camel_case(name), ast);
        Ok(())
    }
}

impl CompileStep for PropertyBindingParser {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if current.ignore_bindings {
            return Ok(());
        }
        let attrs = current.attrs().clone();
        let mut new_attrs = IndexMap::new();
        for (attr_name, attr_value) in &attrs {
            let Some(parts) = BIND_NAME_REGEXP.captures(attr_name) else {
                let interpolation = self
                    .parser
                    .parse_interpolation(attr_value, &current.element_description)?;
                if let Some(ast) = interpolation {
                    self.bind_property_ast(attr_name, ast, current, &mut new_attrs);
                }
                continue;
            };
            let rest = parts.get(4).map_or("", |m| m.as_str());
            if parts.get(1).is_some() {
                self.bind_property(rest, attr_value, current, &mut new_attrs)?;
            } else if parts.get(2).is_some() {
                let value = if attr_value.is_empty() {
                    IMPLICIT_VARIABLE
                } else {
                    attr_value.as_str()
                };
                self.bind_variable(rest, value, current, &mut new_attrs);
            } else if parts.get(3).is_some() {
                self.bind_event(rest, attr_value, current)?;
            } else if let Some(name) = parts.get(5) {
                self.bind_property(name.as_str(), attr_value, current, &mut new_attrs)?;
            } else if let Some(name) = parts.get(6) {
                self.bind_event(name.as_str(), attr_value, current)?;
            }
        }
        current.attrs().extend(new_attrs);
        Ok(())
    }
}
