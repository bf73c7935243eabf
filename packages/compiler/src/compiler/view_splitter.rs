//! View Splitter
//!
//! Splits a template into nested proto views:
//! - `<template>` elements become the root of a nested view whose content
//!   is moved into a fresh template,
//! - elements with a `template` attribute or a `*name` shortcut are wrapped
//!   in a new `<template>` parent that hosts them as a nested view.

use std::rc::Rc;

use super::compile_control::CompileControl;
use super::compile_element::CompileElement;
use super::compile_step::CompileStep;
use crate::dom::Node;
use crate::error::{RenderError, Result};
use crate::expression_parser::ExpressionParser;
use crate::util::dash_case_to_camel_case;

const TEMPLATE_ATTR: &str = "template";
const TEMPLATE_SHORTCUT_PREFIX: char = '*';

pub struct ViewSplitter {
    parser: Rc<dyn ExpressionParser>,
}

impl ViewSplitter {
    pub fn new(parser: Rc<dyn ExpressionParser>) -> Self {
        ViewSplitter { parser }
    }

    fn template_bindings(current: &mut CompileElement) -> Result<Option<String>> {
        let description = current.element_description.clone();
        let attrs = current.attrs();
        let mut bindings = attrs.get(TEMPLATE_ATTR).cloned();
        for (name, value) in attrs.iter() {
            let Some(key) = name.strip_prefix(TEMPLATE_SHORTCUT_PREFIX) else {
                continue;
            };
            if let Some(existing) = &bindings {
                return Err(RenderError::compile(
                    format!(
                        "Only one template directive per element is allowed: {} and {} cannot be used simultaneously",
                        existing, key
                    ),
                    description,
                ));
            }
            bindings = Some(if value.is_empty() {
                key.to_string()
            } else {
                format!("{} {}", key, value)
            });
        }
        Ok(bindings)
    }

    fn parse_template_bindings(&self, bindings: &str, element: &mut CompileElement) -> Result<()> {
        let parsed = self
            .parser
            .parse_template_bindings(bindings, &element.element_description)?;
        for binding in parsed {
            if binding.key_is_var {
                let name = binding.name.unwrap_or_default();
                element
                    .bind_element()
                    .borrow_mut()
                    .bind_variable(&dash_case_to_camel_case(&binding.key), &name);
                element.attrs().insert(binding.key, name);
            } else if let Some(expression) = binding.expression {
                let source = expression.source.clone();
                element
                    .bind_element()
                    .borrow_mut()
                    .bind_property(&dash_case_to_camel_case(&binding.key), expression);
                element.attrs().insert(binding.key, source);
            } else {
                element.element.set_attribute(&binding.key, "");
            }
        }
        Ok(())
    }
}

impl CompileStep for ViewSplitter {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        control: &mut CompileControl<'_>,
    ) -> Result<()> {
        let bindings = Self::template_bindings(current)?;

        if current.element.is_template() {
            if !current.is_view_root {
                let view_root_element = Node::create_template("")?;
                let nested = current
                    .bind_element()
                    .borrow_mut()
                    .bind_nested_proto_view(view_root_element.clone(), &current.element_description)?;
                if let (Some(from), Some(to)) = (current.element.content(), view_root_element.content()) {
                    for child in from.children() {
                        to.append_child(&child);
                    }
                }
                let mut view_root = CompileElement::new(view_root_element, "", nested);
                // the new root is not part of the template, report errors against the original
                view_root.element_description = current.element_description.clone();
                view_root.is_view_root = true;
                control.add_child(view_root);
            }
        } else if let Some(bindings) = bindings {
            let new_parent_element = Node::create_template("")?;
            let mut new_parent = CompileElement::new(
                new_parent_element.clone(),
                "",
                current.inherited_proto_view.clone(),
            );
            new_parent.inherited_element_binder = current.inherited_element_binder.clone();
            new_parent.distance_to_inherited_binder = current.distance_to_inherited_binder;
            new_parent.element_description = current.element_description.clone();

            let nested = new_parent
                .bind_element()
                .borrow_mut()
                .bind_nested_proto_view(current.element.clone(), &current.element_description)?;
            current.inherited_proto_view = nested;
            current.inherited_element_binder = None;
            current.distance_to_inherited_binder = 0;
            current.is_view_root = true;

            self.parse_template_bindings(&bindings, &mut new_parent)?;
            current.element.insert_before(&new_parent_element);
            current.element.remove();
            control.add_parent(new_parent)?;
        }
        Ok(())
    }
}
