//! Directive Parser
//!
//! Matches the directives of a template against every element and binds
//! their properties, events and setters.

use std::rc::Rc;

use tracing::trace;

use super::compile_control::CompileControl;
use super::compile_element::CompileElement;
use super::compile_step::CompileStep;
use crate::api::{DirectiveMetadata, DirectiveType};
use crate::directive_matching::{CssSelector, SelectorMatcher};
use crate::error::Result;
use crate::expression_parser::ExpressionParser;
use crate::util::{camel_case_to_dash_case, dash_case_to_camel_case};
use crate::view::DirectiveBuilder;

pub struct DirectiveParser {
    parser: Rc<dyn ExpressionParser>,
    directives: Vec<DirectiveMetadata>,
    selector_matcher: SelectorMatcher<usize>,
}

impl DirectiveParser {
    pub fn new(parser: Rc<dyn ExpressionParser>, directives: Vec<DirectiveMetadata>) -> Result<Self> {
        let mut selector_matcher = SelectorMatcher::new();
        for (index, directive) in directives.iter().enumerate() {
            selector_matcher.add_selectables(CssSelector::parse(&directive.selector)?, index);
        }
        Ok(DirectiveParser {
            parser,
            directives,
            selector_matcher,
        })
    }

    fn candidate_selector(current: &mut CompileElement) -> CssSelector {
        let mut selector = CssSelector::new();
        selector.set_element(current.element.tag_name());
        for class_name in current.class_list() {
            selector.add_class_name(class_name);
        }
        for (name, value) in current.attrs().iter() {
            selector.add_attribute(name, value);
        }
        selector
    }

    /// `bind_config` is `elementProperty | pipe1 | pipe2`. The element
    /// property comes from a property binding, or else from a static
    /// attribute. Nothing is bound when neither exists.
    fn bind_directive_property(
        &self,
        directive_property: &str,
        bind_config: &str,
        current: &mut CompileElement,
        directive: &mut DirectiveBuilder,
    ) {
        let mut pipes: Vec<String> = bind_config.split('|').map(|s| s.trim().to_string()).collect();
        let element_property = pipes.remove(0);

        let binding = current
            .bind_element()
            .borrow()
            .property_bindings()
            .get(&dash_case_to_camel_case(&element_property))
            .cloned();
        let binding = match binding {
            Some(binding) => Some(binding),
            None => {
                let description = current.element_description.clone();
                current
                    .attrs()
                    .get(&camel_case_to_dash_case(&element_property))
                    .map(|value| self.parser.wrap_literal_primitive(value, &description))
            }
        };
        if let Some(binding) = binding {
            directive.bind_property(directive_property, self.parser.add_pipes(binding, &pipes));
        }
    }
}

impl CompileStep for DirectiveParser {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if current.ignore_bindings {
            return Ok(());
        }
        let candidate = Self::candidate_selector(current);
        let mut matched = Vec::new();
        self.selector_matcher
            .match_selector(&candidate, |_, index| matched.push(*index));

        for index in matched {
            let metadata = &self.directives[index];
            trace!(directive = %metadata.id, element = %current.element_description, "matched directive");
            current.compile_children = current.compile_children && metadata.compile_children;

            let binder = current.bind_element();
            let mut directive = DirectiveBuilder::new(index);
            for (directive_property, bind_config) in &metadata.bind {
                self.bind_directive_property(directive_property, bind_config, current, &mut directive);
            }
            for (event_name, action) in &metadata.events {
                let ast = self
                    .parser
                    .parse_action(action, &current.element_description)?;
                directive.bind_event(event_name, ast);
            }
            for setter in &metadata.setters {
                directive.bind_property_setter(setter);
            }
            let mut binder = binder.borrow_mut();
            binder.add_directive(directive);
            if metadata.directive_type == DirectiveType::Component {
                binder.set_component_id(&metadata.id, &current.element_description)?;
            }
        }
        Ok(())
    }
}
