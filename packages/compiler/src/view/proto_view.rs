use std::rc::Rc;

use indexmap::IndexMap;

use super::element_binder::ElementBinder;
use super::property_setter::PropertySetter;
use crate::dom::Node;
use crate::error::Result;

pub const NG_BINDING_CLASS: &str = "ng-binding";

/// Compiled, immutable template. Binder `i` addresses the `i`-th bound
/// element in depth first order.
#[derive(Debug, Clone)]
pub struct ProtoView {
    pub element: Node,
    pub element_binders: Vec<ElementBinder>,
    /// Exported value to local name.
    pub variable_bindings: IndexMap<String, String>,
    pub component_id: Option<String>,
    /// Setters of all bound element and directive properties.
    pub property_setters: Rc<IndexMap<String, PropertySetter>>,
    /// 1 when the root element itself is bound.
    pub root_binding_offset: usize,
    /// Root views are instantiated in place instead of cloned.
    pub is_root_view: bool,
    pub is_template_element: bool,
}

impl ProtoView {
    pub fn new(
        element: Node,
        element_binders: Vec<ElementBinder>,
        variable_bindings: IndexMap<String, String>,
        component_id: Option<String>,
        is_root_view: bool,
    ) -> Self {
        let mut property_setters = IndexMap::new();
        for binder in &element_binders {
            for (name, setter) in &binder.property_setters {
                property_setters.insert(name.clone(), setter.clone());
            }
        }
        let root_binding_offset = usize::from(element.has_class(NG_BINDING_CLASS));
        let is_template_element = element.is_template();
        ProtoView {
            element,
            element_binders,
            variable_bindings,
            component_id,
            property_setters: Rc::new(property_setters),
            root_binding_offset,
            is_root_view,
            is_template_element,
        }
    }

    /// Returns a new proto view where binder `i` hosts
    /// `component_proto_views[i]`. `None` entries and binders past the end of
    /// the list keep their current nested view.
    pub fn merge_child_component_proto_views(
        &self,
        component_proto_views: &[Option<Rc<ProtoView>>],
    ) -> Result<ProtoView> {
        let element_binders = self
            .element_binders
            .iter()
            .enumerate()
            .map(|(index, binder)| match component_proto_views.get(index).cloned().flatten() {
                Some(proto_view) => binder.merge_child_component_proto_view(proto_view),
                None => Ok(binder.clone()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ProtoView {
            element_binders,
            ..self.clone()
        })
    }
}
