use super::css_steps::NativeCssStep;
use super::{move_view_nodes_into_parent, ShadowDomStrategy};
use crate::api::Template;
use crate::compiler::CompileStep;
use crate::dom::Node;
use crate::pending::SubTasks;
use crate::view::View;

/// Relies on the shadow root of the host element for encapsulation.
#[derive(Debug, Default)]
pub struct NativeShadowDomStrategy;

impl NativeShadowDomStrategy {
    pub fn new() -> Self {
        NativeShadowDomStrategy
    }
}

impl ShadowDomStrategy for NativeShadowDomStrategy {
    fn attach_template(&self, host: &Node, view: &View) {
        move_view_nodes_into_parent(&host.create_shadow_root(), view);
    }

    fn get_style_compile_step(&self, template: &Template, _sub_tasks: &SubTasks) -> Box<dyn CompileStep> {
        Box::new(NativeCssStep::new(template))
    }
}
