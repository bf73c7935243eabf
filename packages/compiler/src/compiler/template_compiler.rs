//! Template Compiler
//!
//! Loads a template, runs it through the compile pipeline and turns the
//! collected builders into a [`ProtoView`]. Nested components are compiled
//! by separate calls and merged into their parent afterwards.

use std::rc::Rc;

use futures::future::try_join_all;
use futures::FutureExt;
use tracing::debug;

use super::compile_pipeline::CompilePipeline;
use super::compile_step::CompileStep;
use super::directive_parser::DirectiveParser;
use super::property_binding_parser::PropertyBindingParser;
use super::template_loader::TemplateLoader;
use super::text_interpolation_parser::TextInterpolationParser;
use super::view_splitter::ViewSplitter;
use crate::api::Template;
use crate::dom::Node;
use crate::error::{RenderError, Result};
use crate::expression_parser::ExpressionParser;
use crate::pending::{new_sub_tasks, SubTasks, SyncOrPending};
use crate::shadow_dom::ShadowDomStrategy;
use crate::view::ProtoView;

/// Provides the compile steps for one template. Steps doing asynchronous
/// work register it on `sub_tasks`.
pub trait CompileStepFactory {
    fn create_steps(&self, template: &Template, sub_tasks: &SubTasks) -> Result<Vec<Box<dyn CompileStep>>>;
}

pub struct DefaultStepFactory {
    parser: Rc<dyn ExpressionParser>,
    shadow_dom_strategy: Rc<dyn ShadowDomStrategy>,
}

impl DefaultStepFactory {
    pub fn new(parser: Rc<dyn ExpressionParser>, shadow_dom_strategy: Rc<dyn ShadowDomStrategy>) -> Self {
        DefaultStepFactory {
            parser,
            shadow_dom_strategy,
        }
    }
}

impl CompileStepFactory for DefaultStepFactory {
    fn create_steps(&self, template: &Template, sub_tasks: &SubTasks) -> Result<Vec<Box<dyn CompileStep>>> {
        Ok(vec![
            Box::new(ViewSplitter::new(self.parser.clone())),
            self.shadow_dom_strategy.get_style_compile_step(template, sub_tasks),
            Box::new(PropertyBindingParser::new(self.parser.clone())),
            Box::new(DirectiveParser::new(self.parser.clone(), template.directives.clone())?),
            Box::new(TextInterpolationParser::new(self.parser.clone())),
            self.shadow_dom_strategy.get_template_compile_step(template),
        ])
    }
}

#[derive(Clone)]
pub struct Compiler {
    loader: Rc<dyn TemplateLoader>,
    step_factory: Rc<dyn CompileStepFactory>,
}

impl Compiler {
    pub fn new(loader: Rc<dyn TemplateLoader>, step_factory: Rc<dyn CompileStepFactory>) -> Self {
        Compiler { loader, step_factory }
    }

    /// Compiles `template`. The result is ready right away unless loading the
    /// template or one of its styles is asynchronous.
    pub fn compile(&self, template: &Template) -> Result<SyncOrPending<Rc<ProtoView>>> {
        debug!(template_id = %template.id, "compiling template");
        let loaded = self
            .loader
            .load(template)
            .map_err(|err| load_error(&template.id, err))?;
        match loaded {
            SyncOrPending::Ready(element) => self.compile_template(template, &element),
            SyncOrPending::Pending(element) => {
                let compiler = self.clone();
                let template = template.clone();
                Ok(SyncOrPending::Pending(
                    async move {
                        let element = element.await.map_err(|err| load_error(&template.id, err))?;
                        compiler.compile_template(&template, &element)?.into_future().await
                    }
                    .boxed_local(),
                ))
            }
        }
    }

    fn compile_template(&self, template: &Template, element: &Node) -> Result<SyncOrPending<Rc<ProtoView>>> {
        let sub_tasks = new_sub_tasks();
        let steps = self.step_factory.create_steps(template, &sub_tasks)?;
        let results = CompilePipeline::new(steps).process(element, &template.id)?;
        let root = results
            .first()
            .ok_or_else(|| RenderError::compile("The template produced no elements", template.id.as_str()))?;

        let builder = root.borrow().inherited_proto_view.clone();
        builder.borrow_mut().set_component_id(&template.id);
        let proto_view = Rc::new(builder.borrow_mut().build()?);

        let tasks = std::mem::take(&mut *sub_tasks.borrow_mut());
        if tasks.is_empty() {
            debug!(template_id = %template.id, "compiled template");
            return Ok(SyncOrPending::Ready(proto_view));
        }
        debug!(template_id = %template.id, sub_tasks = tasks.len(), "waiting for sub tasks");
        Ok(SyncOrPending::Pending(
            try_join_all(tasks)
                .map(move |done| done.map(|_| proto_view))
                .boxed_local(),
        ))
    }
}

fn load_error(template_id: &str, err: RenderError) -> RenderError {
    match err {
        RenderError::TemplateLoad { .. } => err,
        other => RenderError::TemplateLoad {
            template_id: template_id.to_string(),
            reason: other.to_string(),
        },
    }
}
