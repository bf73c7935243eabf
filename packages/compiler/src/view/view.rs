//! Views
//!
//! A [`View`] is one instance of a [`ProtoView`]: its own DOM nodes plus
//! the bound elements and text nodes addressed by index.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde_json::Value;

use super::proto_view::ProtoView;
use super::view_container::{ViewContainer, WeakViewContainer};
use crate::dom::Node;
use crate::error::{RenderError, Result};
use crate::events::{read_event_path, EventDispatcher, Unsubscribe};
use crate::shadow_dom::ShadowDomStrategy;

#[derive(Clone)]
pub struct View(Rc<ViewInner>);

pub(crate) struct ViewInner {
    proto: Rc<ProtoView>,
    root_nodes: Vec<Node>,
    bound_elements: Vec<Node>,
    bound_text_nodes: Vec<Node>,
    view_containers: RefCell<Vec<Option<ViewContainer>>>,
    component_child_views: RefCell<Vec<Option<View>>>,
    event_dispatcher: RefCell<Option<Rc<dyn EventDispatcher>>>,
    unsubscribes: RefCell<Vec<Unsubscribe>>,
    host_container: RefCell<Option<WeakViewContainer>>,
}

impl View {
    pub fn new(
        proto: Rc<ProtoView>,
        root_nodes: Vec<Node>,
        bound_elements: Vec<Node>,
        bound_text_nodes: Vec<Node>,
    ) -> Self {
        let binder_count = proto.element_binders.len();
        View(Rc::new(ViewInner {
            proto,
            root_nodes,
            bound_elements,
            bound_text_nodes,
            view_containers: RefCell::new(vec![None; binder_count]),
            component_child_views: RefCell::new(vec![None; binder_count]),
            event_dispatcher: RefCell::new(None),
            unsubscribes: RefCell::new(Vec::new()),
            host_container: RefCell::new(None),
        }))
    }

    pub fn proto(&self) -> &Rc<ProtoView> {
        &self.0.proto
    }

    pub fn root_nodes(&self) -> &[Node] {
        &self.0.root_nodes
    }

    pub fn bound_elements(&self) -> &[Node] {
        &self.0.bound_elements
    }

    pub fn bound_text_nodes(&self) -> &[Node] {
        &self.0.bound_text_nodes
    }

    pub fn ptr_eq(&self, other: &View) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<ViewInner> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(inner: &Weak<ViewInner>) -> Option<View> {
        inner.upgrade().map(View)
    }

    fn bound_element(&self, element_index: usize) -> Result<&Node> {
        self.0.bound_elements.get(element_index).ok_or_else(|| {
            RenderError::addressing(format!(
                "Element index {} is out of range, the view has {} bound elements",
                element_index,
                self.0.bound_elements.len()
            ))
        })
    }

    pub fn set_element_property(&self, element_index: usize, property_name: &str, value: &Value) -> Result<()> {
        let element = self.bound_element(element_index)?;
        let setter = self.0.proto.property_setters.get(property_name).ok_or_else(|| {
            RenderError::addressing(format!("No setter registered for property {}", property_name))
        })?;
        setter.set(element, value);
        Ok(())
    }

    pub fn set_text(&self, text_index: usize, text: &str) -> Result<()> {
        let node = self.0.bound_text_nodes.get(text_index).ok_or_else(|| {
            RenderError::addressing(format!(
                "Text node index {} is out of range, the view has {} bound text nodes",
                text_index,
                self.0.bound_text_nodes.len()
            ))
        })?;
        node.set_text(text);
        Ok(())
    }

    /// Hosts `child` as the component view of the element at `element_index`.
    pub fn set_component_view(
        &self,
        strategy: &dyn ShadowDomStrategy,
        element_index: usize,
        child: View,
    ) -> Result<()> {
        let host = self.bound_element(element_index)?;
        strategy.attach_template(host, &child);
        self.0.component_child_views.borrow_mut()[element_index] = Some(child);
        Ok(())
    }

    pub fn component_child_view(&self, element_index: usize) -> Option<View> {
        self.0
            .component_child_views
            .borrow()
            .get(element_index)
            .cloned()
            .flatten()
    }

    pub fn component_child_views(&self) -> Vec<View> {
        self.0
            .component_child_views
            .borrow()
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// The container anchored at the element, created on first access.
    pub fn get_view_container(&self, element_index: usize) -> Result<ViewContainer> {
        let anchor = self.bound_element(element_index)?.clone();
        let mut containers = self.0.view_containers.borrow_mut();
        Ok(containers[element_index]
            .get_or_insert_with(|| ViewContainer::new(anchor))
            .clone())
    }

    pub(crate) fn view_containers(&self) -> Vec<ViewContainer> {
        self.0.view_containers.borrow().iter().flatten().cloned().collect()
    }

    pub fn set_event_dispatcher(&self, dispatcher: Option<Rc<dyn EventDispatcher>>) {
        *self.0.event_dispatcher.borrow_mut() = dispatcher;
    }

    pub fn has_event_dispatcher(&self) -> bool {
        self.0.event_dispatcher.borrow().is_some()
    }

    /// Forwards an event to the dispatcher together with `$event` and the
    /// `$event` paths read by the handlers of the element.
    pub fn dispatch_event(&self, element_index: usize, event_name: &str, event: &Value) {
        let dispatcher = self.0.event_dispatcher.borrow().clone();
        let Some(dispatcher) = dispatcher else {
            return;
        };
        let mut locals = IndexMap::new();
        locals.insert("$event".to_string(), event.clone());
        if let Some(binder) = self.0.proto.element_binders.get(element_index) {
            for path in &binder.event_locals {
                locals.insert(path.clone(), read_event_path(event, path));
            }
        }
        dispatcher.dispatch_event(element_index, event_name, &locals);
    }

    pub(crate) fn add_unsubscribe(&self, unsubscribe: Unsubscribe) {
        self.0.unsubscribes.borrow_mut().push(unsubscribe);
    }

    /// Removes every listener installed for the view.
    pub(crate) fn unsubscribe_all(&self) {
        let unsubscribes = std::mem::take(&mut *self.0.unsubscribes.borrow_mut());
        for unsubscribe in unsubscribes {
            unsubscribe();
        }
    }

    pub fn host_container(&self) -> Option<ViewContainer> {
        self.0
            .host_container
            .borrow()
            .as_ref()
            .and_then(WeakViewContainer::upgrade)
    }

    pub(crate) fn set_host_container(&self, container: Option<WeakViewContainer>) {
        *self.0.host_container.borrow_mut() = container;
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("component_id", &self.0.proto.component_id)
            .field("root_nodes", &self.0.root_nodes)
            .finish()
    }
}
