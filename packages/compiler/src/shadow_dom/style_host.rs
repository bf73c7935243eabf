//! Style host bookkeeping shared by the emulated strategies and their
//! compile steps.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::dom::Node;

pub fn content_attribute(id: usize) -> String {
    format!("_ngcontent-{}", id)
}

pub fn host_attribute(id: usize) -> String {
    format!("_nghost-{}", id)
}

/// Element receiving the styles moved out of component templates, with
/// the state needed to keep insertions ordered and shared styles unique.
pub struct StyleHost {
    element: Node,
    component_uids: RefCell<HashMap<String, usize>>,
    next_component_uid: Cell<usize>,
    shared_style_texts: RefCell<HashSet<String>>,
    last_inserted_style: RefCell<Option<Node>>,
}

impl StyleHost {
    pub fn new(element: Node) -> Self {
        StyleHost {
            element,
            component_uids: RefCell::new(HashMap::new()),
            next_component_uid: Cell::new(0),
            shared_style_texts: RefCell::new(HashSet::new()),
            last_inserted_style: RefCell::new(None),
        }
    }

    pub fn element(&self) -> &Node {
        &self.element
    }

    /// Small number standing for `component_id`, stable until [`StyleHost::reset`].
    pub fn component_uid(&self, component_id: &str) -> usize {
        let mut uids = self.component_uids.borrow_mut();
        if let Some(uid) = uids.get(component_id) {
            return *uid;
        }
        let uid = self.next_component_uid.get();
        self.next_component_uid.set(uid + 1);
        uids.insert(component_id.to_string(), uid);
        uid
    }

    /// Inserts `style` unless a style with the same text was inserted before.
    pub fn insert_shared_style_text(&self, css_text: &str, style: &Node) {
        if self.shared_style_texts.borrow_mut().insert(css_text.to_string()) {
            self.insert_style_element(style);
        } else {
            debug!("skipping duplicate shared style");
        }
    }

    /// Styles go before the existing content of the host, in insertion order.
    pub fn insert_style_element(&self, style: &Node) {
        let mut last = self.last_inserted_style.borrow_mut();
        match (last.as_ref(), self.element.first_child()) {
            (Some(previous), _) => previous.insert_after(style),
            (None, Some(first)) => first.insert_before(style),
            (None, None) => self.element.append_child(style),
        }
        debug!(count = self.element.children().len(), "inserted style into the style host");
        *last = Some(style.clone());
    }

    pub fn reset(&self) {
        self.component_uids.borrow_mut().clear();
        self.next_component_uid.set(0);
        self.shared_style_texts.borrow_mut().clear();
        *self.last_inserted_style.borrow_mut() = None;
    }
}
