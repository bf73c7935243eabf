use std::rc::Rc;

use tracing::trace;

use super::css_steps::EmulatedScopedCssStep;
use super::emulated_unscoped::EmulatedUnscopedShadowDomStrategy;
use super::style_host::host_attribute;
use super::template_steps::ShimShadowDomStep;
use super::ShadowDomStrategy;
use crate::api::Template;
use crate::compiler::CompileStep;
use crate::dom::Node;
use crate::pending::SubTasks;
use crate::style_inliner::StyleInliner;
use crate::view::View;

/// Emulates shadow DOM with scoped styles. Component styles are shimmed so
/// they only match elements carrying the `_ngcontent-N` attribute of their
/// component, and hosts get `_nghost-N`.
pub struct EmulatedScopedShadowDomStrategy {
    unscoped: EmulatedUnscopedShadowDomStrategy,
    inliner: Rc<StyleInliner>,
}

impl EmulatedScopedShadowDomStrategy {
    pub fn new(inliner: StyleInliner, style_host: Node) -> Self {
        EmulatedScopedShadowDomStrategy {
            unscoped: EmulatedUnscopedShadowDomStrategy::new(style_host),
            inliner: Rc::new(inliner),
        }
    }
}

impl ShadowDomStrategy for EmulatedScopedShadowDomStrategy {
    fn attach_template(&self, host: &Node, view: &View) {
        self.unscoped.attach_template(host, view);
        if let Some(component_id) = &view.proto().component_id {
            let uid = self.unscoped.style_host().component_uid(component_id);
            trace!(component_id = %component_id, uid, "marking component host");
            host.set_attribute(&host_attribute(uid), "");
        }
    }

    fn get_style_compile_step(&self, template: &Template, sub_tasks: &SubTasks) -> Box<dyn CompileStep> {
        Box::new(EmulatedScopedCssStep::new(
            template,
            self.unscoped.style_host().clone(),
            self.inliner.clone(),
            sub_tasks.clone(),
        ))
    }

    fn get_template_compile_step(&self, template: &Template) -> Box<dyn CompileStep> {
        Box::new(ShimShadowDomStep::new(template, self.unscoped.style_host()))
    }

    fn reset(&self) {
        self.unscoped.reset();
    }
}
