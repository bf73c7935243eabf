//! Compile steps rewriting component templates for emulated shadow DOM.

use std::rc::Rc;

use super::style_host::{content_attribute, StyleHost};
use crate::api::Template;
use crate::compiler::{CompileControl, CompileElement, CompileStep};
use crate::dom::Node;
use crate::error::Result;

/// Replaces `<content select="...">` with a pair of script markers. The
/// start marker becomes the bound element and carries the selector.
pub struct ContentTagStep;

impl CompileStep for ContentTagStep {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if current.ignore_bindings || current.element.tag_name() != "content" {
            return Ok(());
        }
        let selector = current.attrs().get("select").cloned().unwrap_or_default();

        let content = current.element.clone();
        let start = Node::create_script_tag("type", "ng/contentStart");
        if cfg!(debug_assertions) {
            start.set_attribute("select", &selector);
        }
        let end = Node::create_script_tag("type", "ng/contentEnd");
        content.insert_before(&start);
        content.insert_before(&end);
        content.remove();
        current.element = start.clone();

        let binder = if current.is_bound() {
            let binder = current.bind_element();
            binder.borrow_mut().set_element(start);
            binder
        } else {
            current.bind_element()
        };
        binder.borrow_mut().set_content_tag_selector(&selector);
        Ok(())
    }
}

/// Rewrites content tags, then marks every element of the template with the
/// content attribute of the component.
pub struct ShimShadowDomStep {
    content_attribute: String,
}

impl ShimShadowDomStep {
    pub fn new(template: &Template, style_host: &Rc<StyleHost>) -> Self {
        ShimShadowDomStep {
            content_attribute: content_attribute(style_host.component_uid(&template.id)),
        }
    }
}

impl CompileStep for ShimShadowDomStep {
    fn process(
        &self,
        parent: Option<&CompileElement>,
        current: &mut CompileElement,
        control: &mut CompileControl<'_>,
    ) -> Result<()> {
        ContentTagStep.process(parent, current, control)?;
        if current.ignore_bindings || !current.element.is_element() {
            return Ok(());
        }
        current.element.set_attribute(&self.content_attribute, "");
        Ok(())
    }
}
