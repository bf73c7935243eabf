//! Direct Renderer
//!
//! In-process renderer working on opaque handles. It wires the compiler, a
//! shadow DOM strategy and the view factory together and forwards the
//! element-index addressed view operations.

use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::api::Template;
use crate::compiler::{Compiler, DefaultStepFactory, DefaultTemplateLoader};
use crate::config::{RenderConfig, ShadowDomMode};
use crate::dom::Node;
use crate::error::Result;
use crate::events::{DomEventManager, EventDispatcher, EventManager};
use crate::expression_parser::SourceExpressionParser;
use crate::pending::SyncOrPending;
use crate::shadow_dom::{
    EmulatedScopedShadowDomStrategy, EmulatedUnscopedShadowDomStrategy, NativeShadowDomStrategy,
    ShadowDomStrategy,
};
use crate::style_inliner::StyleInliner;
use crate::style_url_resolver::resolve_url;
use crate::view::{ProtoView, ProtoViewBuilder, View, ViewFactory};
use crate::xhr::Xhr;

/// Handle to a compiled proto view.
#[derive(Debug, Clone)]
pub struct ProtoViewRef(Rc<ProtoView>);

impl ProtoViewRef {
    pub fn new(proto_view: Rc<ProtoView>) -> Self {
        ProtoViewRef(proto_view)
    }

    pub fn proto_view(&self) -> &Rc<ProtoView> {
        &self.0
    }
}

/// Handle to a view created by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRef(View);

impl ViewRef {
    pub fn view(&self) -> &View {
        &self.0
    }
}

/// The view container anchored at `element_index` of `view`.
#[derive(Debug, Clone)]
pub struct ViewContainerRef {
    pub view: ViewRef,
    pub element_index: usize,
}

impl ViewContainerRef {
    pub fn new(view: ViewRef, element_index: usize) -> Self {
        ViewContainerRef { view, element_index }
    }
}

pub struct DirectRenderer {
    compiler: Compiler,
    view_factory: ViewFactory,
    shadow_dom_strategy: Rc<dyn ShadowDomStrategy>,
    base_url: Option<String>,
}

impl DirectRenderer {
    pub fn new(compiler: Compiler, view_factory: ViewFactory) -> Self {
        let shadow_dom_strategy = view_factory.shadow_dom_strategy().clone();
        DirectRenderer {
            compiler,
            view_factory,
            shadow_dom_strategy,
            base_url: None,
        }
    }

    /// Builds a renderer with the default pipeline, the strategy selected by
    /// `config` and styles moved into `style_host`.
    pub fn from_config(config: &RenderConfig, xhr: Rc<dyn Xhr>, style_host: Node) -> Self {
        let shadow_dom_strategy: Rc<dyn ShadowDomStrategy> = match config.shadow_dom {
            ShadowDomMode::Native => Rc::new(NativeShadowDomStrategy::new()),
            ShadowDomMode::EmulatedUnscoped => Rc::new(EmulatedUnscopedShadowDomStrategy::new(style_host)),
            ShadowDomMode::EmulatedScoped => Rc::new(EmulatedScopedShadowDomStrategy::new(
                StyleInliner::new(xhr.clone()),
                style_host,
            )),
        };
        debug!(shadow_dom = ?config.shadow_dom, pool = config.view_pool_capacity, "creating renderer");
        let step_factory = DefaultStepFactory::new(Rc::new(SourceExpressionParser::new()), shadow_dom_strategy.clone());
        let compiler = Compiler::new(Rc::new(DefaultTemplateLoader::new(xhr)), Rc::new(step_factory));
        let event_manager: Rc<dyn EventManager> = Rc::new(DomEventManager::new());
        let view_factory = ViewFactory::new(config.view_pool_capacity, event_manager, shadow_dom_strategy);
        DirectRenderer {
            base_url: config.base_url.clone(),
            ..DirectRenderer::new(compiler, view_factory)
        }
    }

    pub fn shadow_dom_strategy(&self) -> &Rc<dyn ShadowDomStrategy> {
        &self.shadow_dom_strategy
    }

    /// Compiles `template`, resolving a relative template url against the
    /// configured base url first.
    pub fn compile(&self, template: &Template) -> Result<SyncOrPending<ProtoViewRef>> {
        let mut template = template.clone();
        if let Some(url) = &template.abs_url {
            template.abs_url = Some(resolve_url(self.base_url.as_deref(), url));
        }
        Ok(self.compiler.compile(&template)?.map(ProtoViewRef))
    }

    /// Proto view of the host element of the application: the element is
    /// used in place and hosts the component `component_id`.
    pub fn create_root_proto_view(&self, host: &Node, component_id: &str) -> Result<ProtoViewRef> {
        let builder = ProtoViewBuilder::new_ref(host.clone());
        builder.borrow_mut().set_is_root_view(true);
        let binder = builder.borrow_mut().bind_element(host, "root element");
        binder.borrow_mut().bind_directive(0);
        binder.borrow_mut().set_component_id(component_id, "root element")?;
        let proto_view = builder.borrow_mut().build()?;
        Ok(ProtoViewRef(Rc::new(proto_view)))
    }

    pub fn merge_child_component_proto_views(
        &self,
        proto_view: &ProtoViewRef,
        component_proto_views: &[Option<ProtoViewRef>],
    ) -> Result<ProtoViewRef> {
        let components: Vec<Option<Rc<ProtoView>>> = component_proto_views
            .iter()
            .map(|pv| pv.as_ref().map(|pv| pv.0.clone()))
            .collect();
        let merged = proto_view.0.merge_child_component_proto_views(&components)?;
        Ok(ProtoViewRef(Rc::new(merged)))
    }

    pub fn create_root_view(&self, proto_view: &ProtoViewRef) -> Result<ViewRef> {
        Ok(ViewRef(self.view_factory.get_view(&proto_view.0)?))
    }

    /// Creates a view of `proto_view`. The result lists the view followed by
    /// its static component views, depth first.
    pub fn create_view(&self, proto_view: &ProtoViewRef) -> Result<Vec<ViewRef>> {
        let view = self.view_factory.get_view(&proto_view.0)?;
        let mut views = Vec::new();
        collect_component_views(&view, &mut views);
        Ok(views)
    }

    pub fn destroy_view(&self, view: &ViewRef) -> Result<()> {
        self.view_factory.return_view(&view.0)
    }

    pub fn insert_view_into_container(
        &self,
        container: &ViewContainerRef,
        view: &ViewRef,
        at_index: Option<usize>,
    ) -> Result<()> {
        container
            .view
            .0
            .get_view_container(container.element_index)?
            .insert(&view.0, at_index)
    }

    pub fn detach_view_from_container(&self, container: &ViewContainerRef, at_index: usize) -> Result<ViewRef> {
        let detached = container
            .view
            .0
            .get_view_container(container.element_index)?
            .detach(at_index)?;
        Ok(ViewRef(detached))
    }

    pub fn set_element_property(
        &self,
        view: &ViewRef,
        element_index: usize,
        property_name: &str,
        value: &Value,
    ) -> Result<()> {
        view.0.set_element_property(element_index, property_name, value)
    }

    pub fn set_component_view(&self, host_view: &ViewRef, element_index: usize, component_view: &ViewRef) -> Result<()> {
        host_view
            .0
            .set_component_view(self.shadow_dom_strategy.as_ref(), element_index, component_view.0.clone())
    }

    /// Hosts a component view created at runtime on the element at
    /// `element_index`, replacing any previous one.
    pub fn set_dynamic_component_view(
        &self,
        host_view: &ViewRef,
        element_index: usize,
        component_view: &ViewRef,
    ) -> Result<()> {
        self.set_component_view(host_view, element_index, component_view)
    }

    pub fn set_text(&self, view: &ViewRef, text_index: usize, text: &str) -> Result<()> {
        view.0.set_text(text_index, text)
    }

    pub fn set_event_dispatcher(&self, view: &ViewRef, dispatcher: Rc<dyn EventDispatcher>) {
        view.0.set_event_dispatcher(Some(dispatcher));
    }
}

fn collect_component_views(view: &View, out: &mut Vec<ViewRef>) {
    out.push(ViewRef(view.clone()));
    for child in view.component_child_views() {
        collect_component_views(&child, out);
    }
}
