//! Compile steps for the `<style>` elements of component templates.

use std::rc::Rc;

use futures::FutureExt;
use tracing::trace;

use super::style_host::{content_attribute, host_attribute, StyleHost};
use crate::api::Template;
use crate::compiler::{CompileControl, CompileElement, CompileStep};
use crate::error::{RenderError, Result};
use crate::pending::{SubTasks, SyncOrPending};
use crate::shadow_css::ShadowCss;
use crate::style_inliner::StyleInliner;
use crate::style_url_resolver::resolve_urls;

fn is_style_element(current: &CompileElement) -> bool {
    current.element.is_element() && current.element.tag_name() == "style"
}

/// Marks the style element as opaque to binding steps and returns its css
/// with urls rewritten against the template url.
fn take_style(current: &mut CompileElement, base_url: &str) -> String {
    current.ignore_bindings = true;
    resolve_urls(&current.element.text_content(), base_url)
}

/// Keeps styles in the template, only fixing their urls.
pub struct NativeCssStep {
    base_url: String,
}

impl NativeCssStep {
    pub fn new(template: &Template) -> Self {
        NativeCssStep {
            base_url: template.abs_url.clone().unwrap_or_default(),
        }
    }
}

impl CompileStep for NativeCssStep {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if is_style_element(current) {
            let css = take_style(current, &self.base_url);
            current.element.set_text(&css);
        }
        Ok(())
    }
}

/// Moves styles into the style host, each distinct css text once.
pub struct EmulatedUnscopedCssStep {
    base_url: String,
    style_host: Rc<StyleHost>,
}

impl EmulatedUnscopedCssStep {
    pub fn new(template: &Template, style_host: Rc<StyleHost>) -> Self {
        EmulatedUnscopedCssStep {
            base_url: template.abs_url.clone().unwrap_or_default(),
            style_host,
        }
    }
}

impl CompileStep for EmulatedUnscopedCssStep {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if !is_style_element(current) {
            return Ok(());
        }
        let css = take_style(current, &self.base_url);
        let style = &current.element;
        style.set_text(&css);
        style.remove();
        self.style_host.insert_shared_style_text(&css, style);
        Ok(())
    }
}

/// Inlines imports, scopes the css to the component and moves the style
/// into the style host. Styles with imports are empty until their imports
/// are fetched.
pub struct EmulatedScopedCssStep {
    base_url: String,
    component_uid: usize,
    style_host: Rc<StyleHost>,
    inliner: Rc<StyleInliner>,
    sub_tasks: SubTasks,
}

impl EmulatedScopedCssStep {
    pub fn new(
        template: &Template,
        style_host: Rc<StyleHost>,
        inliner: Rc<StyleInliner>,
        sub_tasks: SubTasks,
    ) -> Self {
        EmulatedScopedCssStep {
            base_url: template.abs_url.clone().unwrap_or_default(),
            component_uid: style_host.component_uid(&template.id),
            style_host,
            inliner,
            sub_tasks,
        }
    }
}

fn shim(css: &str, component_uid: usize) -> String {
    ShadowCss::new().shim_css_text(
        css,
        &content_attribute(component_uid),
        &host_attribute(component_uid),
    )
}

impl CompileStep for EmulatedScopedCssStep {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if !is_style_element(current) {
            return Ok(());
        }
        let css = take_style(current, &self.base_url);
        let style = current.element.clone();
        let uid = self.component_uid;
        match self.inliner.inline_imports(&css, &self.base_url) {
            SyncOrPending::Ready(css) => style.set_text(&shim(&css, uid)),
            SyncOrPending::Pending(inlined) => {
                trace!(component_uid = uid, "style is waiting for its imports");
                style.set_text("");
                let target = style.clone();
                let task = async move {
                    let css = inlined.await?;
                    target.set_text(&shim(&css, uid));
                    Ok::<_, RenderError>(())
                };
                self.sub_tasks.borrow_mut().push(task.boxed_local());
            }
        }
        style.remove();
        self.style_host.insert_style_element(&style);
        Ok(())
    }
}
