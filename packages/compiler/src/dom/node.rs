//! In-memory DOM nodes
//!
//! A [`Node`] is a cheap, reference counted handle. Cloning the handle
//! aliases the same node; use [`Node::deep_clone`] to copy a subtree.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde_json::Value;

use super::html_parser;
use crate::error::Result;

pub type EventHandler = Rc<dyn Fn(&Value)>;

#[derive(Clone)]
pub struct Node(Rc<NodeData>);

struct NodeData {
    kind: NodeKind,
    parent: RefCell<Weak<NodeData>>,
    children: RefCell<Vec<Node>>,
}

enum NodeKind {
    Element(ElementData),
    Text(RefCell<String>),
    Comment(RefCell<String>),
    Fragment,
}

struct ElementData {
    tag: String,
    attrs: RefCell<IndexMap<String, String>>,
    properties: RefCell<IndexMap<String, Value>>,
    styles: RefCell<IndexMap<String, String>>,
    /// Content fragment of `<template>` elements.
    content: Option<Node>,
    shadow_root: RefCell<Option<Node>>,
    listeners: RefCell<Vec<Listener>>,
    next_listener_id: Cell<u64>,
}

struct Listener {
    id: u64,
    event_name: String,
    handler: EventHandler,
}

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(NodeData {
            kind,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub fn element(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let content = if tag == "template" {
            Some(Node::fragment())
        } else {
            None
        };
        Node::from_kind(NodeKind::Element(ElementData {
            tag,
            attrs: RefCell::new(IndexMap::new()),
            properties: RefCell::new(IndexMap::new()),
            styles: RefCell::new(IndexMap::new()),
            content,
            shadow_root: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(0),
        }))
    }

    pub fn text(value: &str) -> Self {
        Node::from_kind(NodeKind::Text(RefCell::new(value.to_string())))
    }

    pub fn comment(value: &str) -> Self {
        Node::from_kind(NodeKind::Comment(RefCell::new(value.to_string())))
    }

    pub fn fragment() -> Self {
        Node::from_kind(NodeKind::Fragment)
    }

    /// Creates a `<template>` element whose content is the parsed `html`.
    pub fn create_template(html: &str) -> Result<Self> {
        let template = Node::element("template");
        if let Some(content) = template.content() {
            for child in html_parser::parse_html(html)?.children() {
                content.append_child(&child);
            }
        }
        Ok(template)
    }

    pub fn create_style_element(css: &str) -> Self {
        let style = Node::element("style");
        style.append_child(&Node::text(css));
        style
    }

    pub fn create_script_tag(attr_name: &str, attr_value: &str) -> Self {
        let script = Node::element("script");
        script.set_attribute(attr_name, attr_value);
        script
    }

    fn element_data(&self) -> Option<&ElementData> {
        match &self.0.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, NodeKind::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.0.kind, NodeKind::Comment(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.0.kind, NodeKind::Fragment)
    }

    pub fn is_template(&self) -> bool {
        self.tag_name() == "template"
    }

    /// Lower case tag name, empty for non elements.
    pub fn tag_name(&self) -> &str {
        self.element_data().map(|e| e.tag.as_str()).unwrap_or("")
    }

    pub fn node_name(&self) -> String {
        match &self.0.kind {
            NodeKind::Element(e) => e.tag.to_ascii_uppercase(),
            NodeKind::Text(_) => "#text".to_string(),
            NodeKind::Comment(_) => "#comment".to_string(),
            NodeKind::Fragment => "#document-fragment".to_string(),
        }
    }

    // Attributes

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.element_data()
            .and_then(|e| e.attrs.borrow().get(name).cloned())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.element_data()
            .map(|e| e.attrs.borrow().contains_key(name))
            .unwrap_or(false)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if let Some(e) = self.element_data() {
            e.attrs
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(e) = self.element_data() {
            e.attrs.borrow_mut().shift_remove(name);
        }
    }

    /// Attributes in source order.
    pub fn attributes(&self) -> IndexMap<String, String> {
        self.element_data()
            .map(|e| e.attrs.borrow().clone())
            .unwrap_or_default()
    }

    pub fn class_list(&self) -> Vec<String> {
        self.attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.class_list().iter().any(|c| c == name)
    }

    pub fn add_class(&self, name: &str) {
        let mut classes = self.class_list();
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
            self.set_attribute("class", &classes.join(" "));
        }
    }

    pub fn remove_class(&self, name: &str) {
        let classes: Vec<String> = self.class_list().into_iter().filter(|c| c != name).collect();
        if classes.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", &classes.join(" "));
        }
    }

    // Properties and styles

    pub fn property(&self, name: &str) -> Option<Value> {
        self.element_data()
            .and_then(|e| e.properties.borrow().get(name).cloned())
    }

    pub fn set_property(&self, name: &str, value: Value) {
        if let Some(e) = self.element_data() {
            e.properties.borrow_mut().insert(name.to_string(), value);
        }
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.element_data()
            .and_then(|e| e.styles.borrow().get(name).cloned())
    }

    pub fn set_style(&self, name: &str, value: &str) {
        if let Some(e) = self.element_data() {
            e.styles
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&self, name: &str) {
        if let Some(e) = self.element_data() {
            e.styles.borrow_mut().shift_remove(name);
        }
    }

    // Text

    /// Text content: the data of text / comment nodes, the concatenated
    /// descendant text of elements and fragments.
    pub fn text_content(&self) -> String {
        match &self.0.kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => t.borrow().clone(),
            _ => self
                .children()
                .iter()
                .filter(|c| !c.is_comment())
                .map(Node::text_content)
                .collect(),
        }
    }

    pub fn set_text(&self, value: &str) {
        match &self.0.kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => *t.borrow_mut() = value.to_string(),
            _ => {
                self.clear_nodes();
                if !value.is_empty() {
                    self.append_child(&Node::text(value));
                }
            }
        }
    }

    // Tree

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.children.borrow().first().cloned()
    }

    pub fn last_child(&self) -> Option<Node> {
        self.0.children.borrow().last().cloned()
    }

    fn index_in_parent(&self) -> Option<(Node, usize)> {
        let parent = self.parent()?;
        let index = parent
            .0
            .children
            .borrow()
            .iter()
            .position(|c| c.ptr_eq(self))?;
        Some((parent, index))
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let (parent, index) = self.index_in_parent()?;
        let children = parent.0.children.borrow();
        children.get(index + 1).cloned()
    }

    /// Nodes to insert: the children of a fragment, or the node itself.
    fn insertable(node: &Node) -> Vec<Node> {
        if node.is_fragment() {
            node.children()
        } else {
            vec![node.clone()]
        }
    }

    fn insert_at(&self, index: usize, node: &Node) {
        let mut at = index;
        for n in Node::insertable(node) {
            if let Some((old_parent, old_index)) = n.index_in_parent() {
                old_parent.0.children.borrow_mut().remove(old_index);
                if old_parent.ptr_eq(self) && old_index < at {
                    at -= 1;
                }
            }
            *n.0.parent.borrow_mut() = Rc::downgrade(&self.0);
            self.0.children.borrow_mut().insert(at, n);
            at += 1;
        }
    }

    pub fn append_child(&self, node: &Node) {
        let len = self.0.children.borrow().len();
        self.insert_at(len, node);
    }

    /// Inserts `node` right before `self` in its parent.
    pub fn insert_before(&self, node: &Node) {
        if let Some((parent, index)) = self.index_in_parent() {
            parent.insert_at(index, node);
        }
    }

    /// Inserts `node` right after `self` in its parent.
    pub fn insert_after(&self, node: &Node) {
        if let Some((parent, index)) = self.index_in_parent() {
            parent.insert_at(index + 1, node);
        }
    }

    /// Detaches the node from its parent.
    pub fn remove(&self) {
        if let Some((parent, index)) = self.index_in_parent() {
            parent.0.children.borrow_mut().remove(index);
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    pub fn clear_nodes(&self) {
        for child in self.children() {
            child.remove();
        }
    }

    pub fn content(&self) -> Option<Node> {
        self.element_data().and_then(|e| e.content.clone())
    }

    /// The content fragment of a template, the node itself otherwise.
    pub fn template_aware_root(&self) -> Node {
        self.content().unwrap_or_else(|| self.clone())
    }

    pub fn create_shadow_root(&self) -> Node {
        if let Some(e) = self.element_data() {
            let mut slot = e.shadow_root.borrow_mut();
            slot.get_or_insert_with(Node::fragment).clone()
        } else {
            Node::fragment()
        }
    }

    pub fn shadow_root(&self) -> Option<Node> {
        self.element_data()
            .and_then(|e| e.shadow_root.borrow().clone())
    }

    /// Copies the node, its attributes, properties and descendants.
    /// Listeners and shadow roots are not copied.
    pub fn deep_clone(&self) -> Node {
        let copy = match &self.0.kind {
            NodeKind::Element(e) => {
                let copy = Node::element(&e.tag);
                if let Some(data) = copy.element_data() {
                    *data.attrs.borrow_mut() = e.attrs.borrow().clone();
                    *data.properties.borrow_mut() = e.properties.borrow().clone();
                    *data.styles.borrow_mut() = e.styles.borrow().clone();
                }
                if let (Some(src), Some(dst)) = (&e.content, copy.content()) {
                    for child in src.children() {
                        dst.append_child(&child.deep_clone());
                    }
                }
                copy
            }
            NodeKind::Text(t) => Node::text(&t.borrow()),
            NodeKind::Comment(t) => Node::comment(&t.borrow()),
            NodeKind::Fragment => Node::fragment(),
        };
        for child in self.children() {
            copy.append_child(&child.deep_clone());
        }
        copy
    }

    /// Descendant elements carrying `class_name`, in document order.
    /// Template content is not searched.
    pub fn elements_by_class_name(&self, class_name: &str) -> Vec<Node> {
        let mut result = Vec::new();
        self.collect_by_class(class_name, &mut result);
        result
    }

    fn collect_by_class(&self, class_name: &str, result: &mut Vec<Node>) {
        for child in self.children() {
            if child.is_element() {
                if child.has_class(class_name) {
                    result.push(child.clone());
                }
                child.collect_by_class(class_name, result);
            }
        }
    }

    // Events

    pub fn add_event_listener(&self, event_name: &str, handler: EventHandler) -> u64 {
        match self.element_data() {
            Some(e) => {
                let id = e.next_listener_id.get();
                e.next_listener_id.set(id + 1);
                e.listeners.borrow_mut().push(Listener {
                    id,
                    event_name: event_name.to_string(),
                    handler,
                });
                id
            }
            None => u64::MAX,
        }
    }

    pub fn remove_event_listener(&self, id: u64) {
        if let Some(e) = self.element_data() {
            e.listeners.borrow_mut().retain(|l| l.id != id);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.element_data()
            .map(|e| e.listeners.borrow().len())
            .unwrap_or(0)
    }

    pub fn dispatch_event(&self, event_name: &str, event: &Value) {
        let handlers: Vec<EventHandler> = match self.element_data() {
            Some(e) => e
                .listeners
                .borrow()
                .iter()
                .filter(|l| l.event_name == event_name)
                .map(|l| l.handler.clone())
                .collect(),
            None => return,
        };
        for handler in handlers {
            handler(event);
        }
    }

    // Serialization

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialized children, or template content for `<template>`.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.template_aware_root().children() {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.0.kind {
            NodeKind::Element(e) => {
                out.push('<');
                out.push_str(&e.tag);
                for (name, value) in e.attrs.borrow().iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if html_parser::is_void_element(&e.tag) {
                    return;
                }
                out.push_str(&self.inner_html());
                out.push_str("</");
                out.push_str(&e.tag);
                out.push('>');
            }
            NodeKind::Text(t) => out.push_str(&t.borrow()),
            NodeKind::Comment(t) => {
                out.push_str("<!--");
                out.push_str(&t.borrow());
                out.push_str("-->");
            }
            NodeKind::Fragment => {
                for child in self.children() {
                    child.write_html(out);
                }
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.outer_html())
    }
}
