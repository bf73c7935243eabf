//! Proto View Builders
//!
//! Mutable accumulators filled by the compile steps. One
//! [`ElementBinderBuilder`] exists per bound element; [`ProtoViewBuilder::build`]
//! flattens them into the immutable [`ProtoView`] records.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::element_binder::{DirectiveBinder, ElementBinder, EventBinding};
use super::property_setter::{setter_factory, PropertySetter};
use super::proto_view::{ProtoView, NG_BINDING_CLASS};
use crate::dom::Node;
use crate::error::{RenderError, Result};
use crate::expression_parser::AstWithSource;

pub type ProtoViewBuilderRef = Rc<RefCell<ProtoViewBuilder>>;
pub type ElementBinderBuilderRef = Rc<RefCell<ElementBinderBuilder>>;

static EVENT_LOCAL_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$event(?:\.[A-Za-z_$][\w$]*)+").unwrap());

#[derive(Debug)]
pub struct ProtoViewBuilder {
    root_element: Node,
    variable_bindings: IndexMap<String, String>,
    elements: Vec<ElementBinderBuilderRef>,
    is_root_view: bool,
    component_id: Option<String>,
    built: bool,
}

impl ProtoViewBuilder {
    pub fn new(root_element: Node) -> Self {
        ProtoViewBuilder {
            root_element,
            variable_bindings: IndexMap::new(),
            elements: Vec::new(),
            is_root_view: false,
            component_id: None,
            built: false,
        }
    }

    pub fn new_ref(root_element: Node) -> ProtoViewBuilderRef {
        Rc::new(RefCell::new(Self::new(root_element)))
    }

    pub fn root_element(&self) -> &Node {
        &self.root_element
    }

    /// Creates the binder of `element`, whose index is the number of
    /// elements bound so far, and marks the element as bound.
    pub fn bind_element(&mut self, element: &Node, description: &str) -> ElementBinderBuilderRef {
        let index = self.elements.len();
        trace!(index, element = description, "binding element");
        let builder = Rc::new(RefCell::new(ElementBinderBuilder::new(index, element.clone())));
        element.add_class(NG_BINDING_CLASS);
        self.elements.push(builder.clone());
        builder
    }

    pub fn bind_variable(&mut self, name: &str, value: &str) {
        // keyed by the exported value so that a view can look up locals by export name
        self.variable_bindings
            .insert(value.to_string(), name.to_string());
    }

    pub fn set_is_root_view(&mut self, value: bool) {
        self.is_root_view = value;
    }

    pub fn set_component_id(&mut self, component_id: &str) {
        self.component_id = Some(component_id.to_string());
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Finalizes the builder. A builder can only be built once.
    pub fn build(&mut self) -> Result<ProtoView> {
        if self.built {
            return Err(RenderError::AlreadyBuilt);
        }
        self.built = true;

        let mut element_binders = Vec::with_capacity(self.elements.len());
        for ebb in &self.elements {
            element_binders.push(ebb.borrow_mut().build()?);
        }
        Ok(ProtoView::new(
            self.root_element.clone(),
            element_binders,
            self.variable_bindings.clone(),
            self.component_id.clone(),
            self.is_root_view,
        ))
    }
}

#[derive(Debug)]
pub struct ElementBinderBuilder {
    pub index: usize,
    element: Node,
    parent: Option<ElementBinderBuilderRef>,
    distance_to_parent: usize,
    directives: Vec<DirectiveBuilder>,
    nested_proto_view: Option<ProtoViewBuilderRef>,
    property_bindings: IndexMap<String, AstWithSource>,
    variable_bindings: IndexMap<String, String>,
    event_bindings: Vec<EventBinding>,
    text_node_indices: Vec<usize>,
    text_bindings: Vec<AstWithSource>,
    content_tag_selector: Option<String>,
    property_setters: IndexMap<String, PropertySetter>,
    component_id: Option<String>,
}

impl ElementBinderBuilder {
    fn new(index: usize, element: Node) -> Self {
        ElementBinderBuilder {
            index,
            element,
            parent: None,
            distance_to_parent: 0,
            directives: Vec::new(),
            nested_proto_view: None,
            property_bindings: IndexMap::new(),
            variable_bindings: IndexMap::new(),
            event_bindings: Vec::new(),
            text_node_indices: Vec::new(),
            text_bindings: Vec::new(),
            content_tag_selector: None,
            property_setters: IndexMap::new(),
            component_id: None,
        }
    }

    pub fn element(&self) -> &Node {
        &self.element
    }

    /// Rebinds the binder to another element, e.g. a marker replacing it.
    pub fn set_element(&mut self, element: Node) {
        self.element.remove_class(NG_BINDING_CLASS);
        element.add_class(NG_BINDING_CLASS);
        self.element = element;
    }

    pub fn set_parent(&mut self, parent: Option<ElementBinderBuilderRef>, distance_to_parent: usize) {
        self.distance_to_parent = if parent.is_some() {
            distance_to_parent
        } else {
            0
        };
        self.parent = parent;
    }

    pub fn bind_directive(&mut self, directive_index: usize) -> &mut DirectiveBuilder {
        self.directives.push(DirectiveBuilder::new(directive_index));
        let last = self.directives.len() - 1;
        &mut self.directives[last]
    }

    /// Adds a directive built outside of the binder.
    pub fn add_directive(&mut self, directive: DirectiveBuilder) {
        self.directives.push(directive);
    }

    pub fn has_directives(&self) -> bool {
        !self.directives.is_empty()
    }

    pub fn nested_proto_view(&self) -> Option<ProtoViewBuilderRef> {
        self.nested_proto_view.clone()
    }

    pub fn bind_nested_proto_view(
        &mut self,
        root_element: Node,
        description: &str,
    ) -> Result<ProtoViewBuilderRef> {
        if self.nested_proto_view.is_some() {
            return Err(RenderError::compile(
                "Only one nested view per element is allowed",
                description,
            ));
        }
        let nested = ProtoViewBuilder::new_ref(root_element);
        self.nested_proto_view = Some(nested.clone());
        Ok(nested)
    }

    pub fn property_bindings(&self) -> &IndexMap<String, AstWithSource> {
        &self.property_bindings
    }

    pub fn bind_property(&mut self, name: &str, expression: AstWithSource) {
        self.property_bindings.insert(name.to_string(), expression);
        self.bind_property_setter(name);
    }

    pub fn bind_property_setter(&mut self, name: &str) {
        self.property_setters
            .insert(name.to_string(), setter_factory(name));
    }

    /// Variables of an element hosting a nested view belong to that view.
    pub fn bind_variable(&mut self, name: &str, value: &str) {
        match &self.nested_proto_view {
            Some(nested) => nested.borrow_mut().bind_variable(name, value),
            None => {
                self.variable_bindings
                    .insert(value.to_string(), name.to_string());
            }
        }
    }

    pub fn bind_event(&mut self, name: &str, expression: AstWithSource) {
        self.event_bindings.push(EventBinding {
            full_name: name.to_string(),
            source: expression,
        });
    }

    pub fn bind_text(&mut self, index: usize, expression: AstWithSource) {
        self.text_node_indices.push(index);
        self.text_bindings.push(expression);
    }

    pub fn set_content_tag_selector(&mut self, value: &str) {
        self.content_tag_selector = Some(value.to_string());
    }

    pub fn content_tag_selector(&self) -> Option<&str> {
        self.content_tag_selector.as_deref()
    }

    pub fn component_id(&self) -> Option<&str> {
        self.component_id.as_deref()
    }

    pub fn set_component_id(&mut self, component_id: &str, description: &str) -> Result<()> {
        if let Some(existing) = &self.component_id {
            return Err(RenderError::compile(
                format!(
                    "Only one component directive is allowed per element: {} and {} cannot be used together",
                    existing, component_id
                ),
                description,
            ));
        }
        self.component_id = Some(component_id.to_string());
        Ok(())
    }

    /// Walks up the parent chain to the closest binder with directives.
    fn parent_with_directives(&self) -> (Option<usize>, usize) {
        let mut distance = self.distance_to_parent;
        let mut current = self.parent.clone();
        while let Some(parent) = current {
            let parent = parent.borrow();
            if parent.has_directives() {
                return (Some(parent.index), distance);
            }
            distance += parent.distance_to_parent;
            current = parent.parent.clone();
        }
        (None, 0)
    }

    fn build(&mut self) -> Result<ElementBinder> {
        let mut property_setters = IndexMap::new();
        let mut event_bindings = self.event_bindings.clone();
        let mut local_events = Vec::new();
        let mut global_events = Vec::new();

        let directives: Vec<DirectiveBinder> = self
            .directives
            .iter()
            .map(|db| {
                event_bindings.extend(db.event_bindings.iter().cloned());
                for (name, setter) in &db.property_setters {
                    property_setters.insert(name.clone(), setter.clone());
                }
                DirectiveBinder {
                    directive_index: db.directive_index,
                    property_bindings: db.property_bindings.clone(),
                    event_bindings: db.event_bindings.clone(),
                }
            })
            .collect();
        for (name, setter) in &self.property_setters {
            property_setters.insert(name.clone(), setter.clone());
        }

        let mut event_locals: Vec<String> = Vec::new();
        for binding in &event_bindings {
            match binding.target() {
                Some(target) => {
                    let global = (target.to_string(), binding.name().to_string());
                    if !global_events.contains(&global) {
                        global_events.push(global);
                    }
                }
                None => {
                    if !local_events.iter().any(|e| e == &binding.full_name) {
                        local_events.push(binding.full_name.clone());
                    }
                }
            }
            for local in EVENT_LOCAL_REGEXP.find_iter(&binding.source.source) {
                if !event_locals.iter().any(|l| l == local.as_str()) {
                    event_locals.push(local.as_str().to_string());
                }
            }
        }

        let nested_proto_view = match &self.nested_proto_view {
            Some(nested) => Some(Rc::new(nested.borrow_mut().build()?)),
            None => None,
        };
        let parent_index = self.parent.as_ref().map(|p| p.borrow().index);
        let (parent_with_directives_index, distance_to_parent_with_directives) =
            self.parent_with_directives();

        Ok(ElementBinder {
            index: self.index,
            parent_index,
            distance_to_parent: self.distance_to_parent,
            parent_with_directives_index,
            distance_to_parent_with_directives,
            directives,
            nested_proto_view,
            property_bindings: self.property_bindings.clone(),
            variable_bindings: self.variable_bindings.clone(),
            event_bindings: self.event_bindings.clone(),
            local_events,
            global_events,
            event_locals,
            text_node_indices: self.text_node_indices.clone(),
            text_bindings: self.text_bindings.clone(),
            content_tag_selector: self.content_tag_selector.clone(),
            component_id: self.component_id.clone(),
            property_setters,
        })
    }
}

#[derive(Debug)]
pub struct DirectiveBuilder {
    pub directive_index: usize,
    property_bindings: IndexMap<String, AstWithSource>,
    event_bindings: Vec<EventBinding>,
    property_setters: IndexMap<String, PropertySetter>,
}

impl DirectiveBuilder {
    pub fn new(directive_index: usize) -> Self {
        DirectiveBuilder {
            directive_index,
            property_bindings: IndexMap::new(),
            event_bindings: Vec::new(),
            property_setters: IndexMap::new(),
        }
    }

    pub fn bind_property(&mut self, name: &str, expression: AstWithSource) {
        self.property_bindings.insert(name.to_string(), expression);
    }

    pub fn bind_property_setter(&mut self, name: &str) {
        self.property_setters
            .insert(name.to_string(), setter_factory(name));
    }

    pub fn bind_event(&mut self, name: &str, expression: AstWithSource) {
        self.event_bindings.push(EventBinding {
            full_name: name.to_string(),
            source: expression,
        });
    }
}
