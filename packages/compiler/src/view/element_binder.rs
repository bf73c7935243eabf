use std::rc::Rc;

use indexmap::IndexMap;

use super::property_setter::PropertySetter;
use super::proto_view::ProtoView;
use crate::error::{RenderError, Result};
use crate::expression_parser::AstWithSource;

/// Event handler expression. `full_name` is `target:name` for global events
/// such as `window:resize`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub full_name: String,
    pub source: AstWithSource,
}

impl EventBinding {
    pub fn target(&self) -> Option<&str> {
        self.full_name.split_once(':').map(|(target, _)| target)
    }

    pub fn name(&self) -> &str {
        self.full_name
            .split_once(':')
            .map(|(_, name)| name)
            .unwrap_or(&self.full_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveBinder {
    /// Position of the directive in the template's directive list.
    pub directive_index: usize,
    pub property_bindings: IndexMap<String, AstWithSource>,
    pub event_bindings: Vec<EventBinding>,
}

#[derive(Debug, Clone)]
pub struct ElementBinder {
    pub index: usize,
    /// Nearest bound ancestor.
    pub parent_index: Option<usize>,
    pub distance_to_parent: usize,
    pub parent_with_directives_index: Option<usize>,
    pub distance_to_parent_with_directives: usize,
    pub directives: Vec<DirectiveBinder>,
    pub nested_proto_view: Option<Rc<ProtoView>>,
    pub property_bindings: IndexMap<String, AstWithSource>,
    /// Exported value to local name.
    pub variable_bindings: IndexMap<String, String>,
    pub event_bindings: Vec<EventBinding>,
    /// Names of element and directive events listened on the element itself.
    pub local_events: Vec<String>,
    /// `(target, name)` of events listened on global targets.
    pub global_events: Vec<(String, String)>,
    /// `$event` paths read by the event handlers, evaluated on dispatch.
    pub event_locals: Vec<String>,
    pub text_node_indices: Vec<usize>,
    pub text_bindings: Vec<AstWithSource>,
    pub content_tag_selector: Option<String>,
    pub component_id: Option<String>,
    pub property_setters: IndexMap<String, PropertySetter>,
}

impl ElementBinder {
    pub fn has_static_component(&self) -> bool {
        self.component_id.is_some() && self.nested_proto_view.is_some()
    }

    /// Returns a copy of this binder hosting `proto_view` as its component view.
    pub fn merge_child_component_proto_view(
        &self,
        proto_view: Rc<ProtoView>,
    ) -> Result<ElementBinder> {
        if self.component_id.is_none() {
            return Err(RenderError::NotAComponent { index: self.index });
        }
        Ok(ElementBinder {
            nested_proto_view: Some(proto_view),
            ..self.clone()
        })
    }
}
