//! Shadow DOM Strategies
//!
//! A strategy decides how a component view is attached to its host element
//! and how the styles and `<content>` tags of component templates are
//! compiled.

mod css_steps;
mod emulated_scoped;
mod emulated_unscoped;
mod native;
mod style_host;
mod template_steps;

pub use css_steps::{EmulatedScopedCssStep, EmulatedUnscopedCssStep, NativeCssStep};
pub use emulated_scoped::EmulatedScopedShadowDomStrategy;
pub use emulated_unscoped::EmulatedUnscopedShadowDomStrategy;
pub use native::NativeShadowDomStrategy;
pub use style_host::{content_attribute, host_attribute, StyleHost};
pub use template_steps::{ContentTagStep, ShimShadowDomStep};

use crate::api::Template;
use crate::compiler::{CompileStep, EmptyStep};
use crate::dom::Node;
use crate::pending::SubTasks;
use crate::view::View;

pub trait ShadowDomStrategy {
    /// Attaches the component view `view` to its host element.
    fn attach_template(&self, host: &Node, view: &View);

    /// Step processing the `<style>` elements of `template`. Asynchronous
    /// work is pushed onto `sub_tasks`.
    fn get_style_compile_step(&self, _template: &Template, _sub_tasks: &SubTasks) -> Box<dyn CompileStep> {
        Box::new(EmptyStep)
    }

    fn get_template_compile_step(&self, _template: &Template) -> Box<dyn CompileStep> {
        Box::new(EmptyStep)
    }

    /// Forgets the styles and component ids seen so far.
    fn reset(&self) {}
}

pub(crate) fn move_view_nodes_into_parent(parent: &Node, view: &View) {
    for node in view.root_nodes() {
        parent.append_child(node);
    }
}
