use std::rc::Rc;

use super::css_steps::EmulatedUnscopedCssStep;
use super::style_host::StyleHost;
use super::template_steps::ContentTagStep;
use super::{move_view_nodes_into_parent, ShadowDomStrategy};
use crate::api::Template;
use crate::compiler::CompileStep;
use crate::dom::Node;
use crate::pending::SubTasks;
use crate::view::View;

/// Emulates shadow DOM without style encapsulation: component views replace
/// the children of their host and styles are shared through the style host.
pub struct EmulatedUnscopedShadowDomStrategy {
    style_host: Rc<StyleHost>,
}

impl EmulatedUnscopedShadowDomStrategy {
    pub fn new(style_host: Node) -> Self {
        EmulatedUnscopedShadowDomStrategy {
            style_host: Rc::new(StyleHost::new(style_host)),
        }
    }

    pub fn style_host(&self) -> &Rc<StyleHost> {
        &self.style_host
    }
}

impl ShadowDomStrategy for EmulatedUnscopedShadowDomStrategy {
    fn attach_template(&self, host: &Node, view: &View) {
        host.clear_nodes();
        move_view_nodes_into_parent(host, view);
    }

    fn get_style_compile_step(&self, template: &Template, _sub_tasks: &SubTasks) -> Box<dyn CompileStep> {
        Box::new(EmulatedUnscopedCssStep::new(template, self.style_host.clone()))
    }

    fn get_template_compile_step(&self, _template: &Template) -> Box<dyn CompileStep> {
        Box::new(ContentTagStep)
    }

    fn reset(&self) {
        self.style_host.reset();
    }
}
