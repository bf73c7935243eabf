//! Compile Element
//!
//! Wraps a DOM element while it passes through the compile pipeline and
//! carries the binding state the steps accumulate for it.

use indexmap::IndexMap;

use crate::dom::Node;
use crate::view::{ElementBinderBuilderRef, ProtoViewBuilderRef};

#[derive(Debug)]
pub struct CompileElement {
    pub element: Node,
    attrs: Option<IndexMap<String, String>>,
    class_list: Option<Vec<String>>,
    /// Root of a (nested) proto view.
    pub is_view_root: bool,
    pub inherited_proto_view: ProtoViewBuilderRef,
    /// Binder of the closest bound ancestor, or of this element once bound.
    pub inherited_element_binder: Option<ElementBinderBuilderRef>,
    pub distance_to_inherited_binder: usize,
    pub compile_children: bool,
    /// Set for elements whose content is not template syntax, e.g. `<style>`.
    pub ignore_bindings: bool,
    pub element_description: String,
}

impl CompileElement {
    pub fn new(element: Node, compilation_unit: &str, proto_view: ProtoViewBuilderRef) -> Self {
        let description = get_element_description(&element);
        let element_description = if compilation_unit.is_empty() {
            description
        } else {
            format!("{}: {}", compilation_unit, description)
        };
        CompileElement {
            element,
            attrs: None,
            class_list: None,
            is_view_root: false,
            inherited_proto_view: proto_view,
            inherited_element_binder: None,
            distance_to_inherited_binder: 0,
            compile_children: true,
            ignore_bindings: false,
            element_description,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.inherited_element_binder.is_some() && self.distance_to_inherited_binder == 0
    }

    /// Returns the binder of this element, creating it on first use.
    pub fn bind_element(&mut self) -> ElementBinderBuilderRef {
        if let (true, Some(binder)) = (self.is_bound(), &self.inherited_element_binder) {
            return binder.clone();
        }
        let parent = self.inherited_element_binder.take();
        let binder = self
            .inherited_proto_view
            .borrow_mut()
            .bind_element(&self.element, &self.element_description);
        binder
            .borrow_mut()
            .set_parent(parent, self.distance_to_inherited_binder);
        self.inherited_element_binder = Some(binder.clone());
        self.distance_to_inherited_binder = 0;
        binder
    }

    /// Attributes of the element as seen by the compile steps. Steps may add
    /// entries that never reach the DOM.
    pub fn attrs(&mut self) -> &mut IndexMap<String, String> {
        let element = &self.element;
        self.attrs.get_or_insert_with(|| element.attributes())
    }

    pub fn refresh_attrs(&mut self) {
        self.attrs = None;
    }

    pub fn class_list(&mut self) -> &[String] {
        let element = &self.element;
        self.class_list.get_or_insert_with(|| element.class_list())
    }
}

/// `<tag id="..." class="..." other="...">`, id and class first.
pub fn get_element_description(element: &Node) -> String {
    let attrs = element.attributes();
    let mut description = format!("<{}", element.tag_name());
    let mut add = |name: &str, value: &str| {
        if value.is_empty() {
            description.push_str(&format!(" {}", name));
        } else {
            description.push_str(&format!(" {}=\"{}\"", name, value));
        }
    };
    for first in ["id", "class"] {
        if let Some(value) = attrs.get(first) {
            add(first, value);
        }
    }
    for (name, value) in &attrs {
        if name != "id" && name != "class" {
            add(name, value);
        }
    }
    description.push('>');
    description
}
