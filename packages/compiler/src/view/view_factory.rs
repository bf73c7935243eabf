//! View Factory
//!
//! Instantiates views from proto views and pools returned views per proto
//! view, keyed by the identity of the proto view.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use super::proto_view::{ProtoView, NG_BINDING_CLASS};
use super::view::View;
use crate::dom::EventHandler;
use crate::error::{RenderError, Result};
use crate::events::EventManager;
use crate::shadow_dom::ShadowDomStrategy;

pub struct ViewFactory {
    pool_capacity_per_proto_view: usize,
    event_manager: Rc<dyn EventManager>,
    shadow_dom_strategy: Rc<dyn ShadowDomStrategy>,
    pooled_views: RefCell<HashMap<usize, Vec<View>>>,
}

fn pool_key(proto_view: &Rc<ProtoView>) -> usize {
    Rc::as_ptr(proto_view) as usize
}

impl ViewFactory {
    pub fn new(
        pool_capacity_per_proto_view: usize,
        event_manager: Rc<dyn EventManager>,
        shadow_dom_strategy: Rc<dyn ShadowDomStrategy>,
    ) -> Self {
        ViewFactory {
            pool_capacity_per_proto_view,
            event_manager,
            shadow_dom_strategy,
            pooled_views: RefCell::new(HashMap::new()),
        }
    }

    pub fn shadow_dom_strategy(&self) -> &Rc<dyn ShadowDomStrategy> {
        &self.shadow_dom_strategy
    }

    /// Returns a pooled view of `proto_view` or creates a new one.
    pub fn get_view(&self, proto_view: &Rc<ProtoView>) -> Result<View> {
        let pooled = self
            .pooled_views
            .borrow_mut()
            .get_mut(&pool_key(proto_view))
            .and_then(Vec::pop);
        if let Some(view) = pooled {
            trace!(component_id = ?proto_view.component_id, "reusing pooled view");
            return Ok(view);
        }
        trace!(component_id = ?proto_view.component_id, "creating view");
        self.create_view(proto_view)
    }

    /// Gives `view` back to the factory. The view is kept for reuse while
    /// the pool of its proto view has room, otherwise its listeners are
    /// removed and it is dropped.
    pub fn return_view(&self, view: &View) -> Result<()> {
        view.set_event_dispatcher(None);
        if let Some(container) = view.host_container() {
            if let Some(index) = container.index_of(view) {
                container.detach(index)?;
            }
        }
        let mut pool = self.pooled_views.borrow_mut();
        let pooled = pool.entry(pool_key(view.proto())).or_default();
        if pooled.len() < self.pool_capacity_per_proto_view {
            pooled.push(view.clone());
        } else {
            debug!(component_id = ?view.proto().component_id, "view pool is full, discarding view");
            drop(pool);
            discard(view);
        }
        Ok(())
    }

    pub fn pooled_view_count(&self, proto_view: &Rc<ProtoView>) -> usize {
        self.pooled_views
            .borrow()
            .get(&pool_key(proto_view))
            .map_or(0, Vec::len)
    }

    /// Drops every pooled view.
    pub fn clear(&self) {
        let pooled: Vec<View> = self
            .pooled_views
            .borrow_mut()
            .drain()
            .flat_map(|(_, views)| views)
            .collect();
        for view in &pooled {
            discard(view);
        }
    }

    fn create_view(&self, proto_view: &Rc<ProtoView>) -> Result<View> {
        let root_element = if proto_view.is_root_view {
            proto_view.element.clone()
        } else {
            proto_view.element.deep_clone()
        };

        let (root_nodes, elements_with_bindings) = if proto_view.is_template_element {
            let content = root_element.template_aware_root();
            (content.children(), content.elements_by_class_name(NG_BINDING_CLASS))
        } else {
            (
                vec![root_element.clone()],
                root_element.elements_by_class_name(NG_BINDING_CLASS),
            )
        };

        let binders = &proto_view.element_binders;
        let mut bound_elements = Vec::with_capacity(binders.len());
        let mut bound_text_nodes = Vec::new();
        for binder in binders {
            let element = if binder.index == 0 && proto_view.root_binding_offset == 1 {
                root_element.clone()
            } else {
                elements_with_bindings
                    .get(binder.index - proto_view.root_binding_offset)
                    .cloned()
                    .ok_or_else(|| {
                        RenderError::addressing(format!(
                            "Bound element {} is missing from the proto view DOM",
                            binder.index
                        ))
                    })?
            };
            let child_nodes = element.template_aware_root().children();
            for index in &binder.text_node_indices {
                let node = child_nodes.get(*index).cloned().ok_or_else(|| {
                    RenderError::addressing(format!(
                        "Bound text node {} of element {} is missing",
                        index, binder.index
                    ))
                })?;
                bound_text_nodes.push(node);
            }
            bound_elements.push(element);
        }

        let view = View::new(proto_view.clone(), root_nodes, bound_elements, bound_text_nodes);
        for binder in binders {
            if binder.has_static_component() {
                if let Some(nested) = &binder.nested_proto_view {
                    let child = self.create_view(nested)?;
                    view.set_component_view(self.shadow_dom_strategy.as_ref(), binder.index, child)?;
                }
            }
            let element = view.bound_elements()[binder.index].clone();
            for event_name in &binder.local_events {
                let handler = self.event_handler(&view, binder.index, event_name);
                let unsubscribe = self
                    .event_manager
                    .add_event_listener(&element, event_name, handler);
                view.add_unsubscribe(unsubscribe);
            }
            for (target, event_name) in &binder.global_events {
                let full_name = format!("{}:{}", target, event_name);
                let handler = self.event_handler(&view, binder.index, &full_name);
                let unsubscribe = self
                    .event_manager
                    .add_global_event_listener(target, event_name, handler)?;
                view.add_unsubscribe(unsubscribe);
            }
        }
        Ok(view)
    }

    fn event_handler(&self, view: &View, element_index: usize, event_name: &str) -> EventHandler {
        let view = view.downgrade();
        let event_name = event_name.to_string();
        Rc::new(move |event: &Value| {
            if let Some(view) = View::upgrade(&view) {
                view.dispatch_event(element_index, &event_name, event);
            }
        })
    }
}

/// Removes the listeners of `view` and of every view it hosts.
fn discard(view: &View) {
    view.unsubscribe_all();
    for child in view.component_child_views() {
        discard(&child);
    }
    for container in view.view_containers() {
        for nested in container.views() {
            discard(&nested);
        }
    }
}
