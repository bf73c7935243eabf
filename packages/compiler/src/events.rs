//! Event plumbing between DOM nodes and views.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::dom::{EventHandler, Node};
use crate::error::{RenderError, Result};

/// Removes the listener it was returned for.
pub type Unsubscribe = Box<dyn FnOnce()>;

pub trait EventManager {
    fn add_event_listener(&self, element: &Node, event_name: &str, handler: EventHandler)
        -> Unsubscribe;

    /// Listens on a global target such as `window` or `document`.
    fn add_global_event_listener(
        &self,
        target: &str,
        event_name: &str,
        handler: EventHandler,
    ) -> Result<Unsubscribe>;
}

/// Receives the events of a view, addressed by element index.
pub trait EventDispatcher {
    /// `locals` holds `$event` and every `$event` path read by the handlers.
    fn dispatch_event(&self, element_index: usize, event_name: &str, locals: &IndexMap<String, Value>);
}

/// Event manager storing listeners on the in-memory DOM. Global targets are
/// plain nodes owned by the manager.
pub struct DomEventManager {
    global_targets: IndexMap<String, Node>,
}

impl DomEventManager {
    pub fn new() -> Self {
        let global_targets = ["window", "document", "body"]
            .into_iter()
            .map(|name| (name.to_string(), Node::element(name)))
            .collect();
        DomEventManager { global_targets }
    }

    pub fn global_target(&self, name: &str) -> Option<&Node> {
        self.global_targets.get(name)
    }
}

impl Default for DomEventManager {
    fn default() -> Self {
        Self::new()
    }
}

fn listen(element: &Node, event_name: &str, handler: EventHandler) -> Unsubscribe {
    let id = element.add_event_listener(event_name, handler);
    let element = element.clone();
    Box::new(move || element.remove_event_listener(id))
}

impl EventManager for DomEventManager {
    fn add_event_listener(
        &self,
        element: &Node,
        event_name: &str,
        handler: EventHandler,
    ) -> Unsubscribe {
        listen(element, event_name, handler)
    }

    fn add_global_event_listener(
        &self,
        target: &str,
        event_name: &str,
        handler: EventHandler,
    ) -> Result<Unsubscribe> {
        let node = self.global_targets.get(target).ok_or_else(|| {
            RenderError::addressing(format!("Unsupported event target {} for event {}", target, event_name))
        })?;
        Ok(listen(node, event_name, handler))
    }
}

/// Reads `path` (`$event.a.b`) from the event payload.
pub fn read_event_path(event: &Value, path: &str) -> Value {
    path.split('.')
        .skip(1)
        .try_fold(event, |value, key| value.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}
