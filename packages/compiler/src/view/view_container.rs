use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::view::View;
use crate::dom::Node;
use crate::error::{RenderError, Result};

/// Ordered child views placed in the DOM right after an anchor element.
#[derive(Clone)]
pub struct ViewContainer(Rc<ViewContainerInner>);

struct ViewContainerInner {
    anchor: Node,
    views: RefCell<Vec<View>>,
}

#[derive(Clone)]
pub struct WeakViewContainer(Weak<ViewContainerInner>);

impl WeakViewContainer {
    pub fn upgrade(&self) -> Option<ViewContainer> {
        self.0.upgrade().map(ViewContainer)
    }
}

impl ViewContainer {
    pub fn new(anchor: Node) -> Self {
        ViewContainer(Rc::new(ViewContainerInner {
            anchor,
            views: RefCell::new(Vec::new()),
        }))
    }

    pub fn anchor(&self) -> &Node {
        &self.0.anchor
    }

    pub fn len(&self) -> usize {
        self.0.views.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<View> {
        self.0.views.borrow().get(index).cloned()
    }

    pub fn index_of(&self, view: &View) -> Option<usize> {
        self.0.views.borrow().iter().position(|v| v.ptr_eq(view))
    }

    pub fn ptr_eq(&self, other: &ViewContainer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn downgrade(&self) -> WeakViewContainer {
        WeakViewContainer(Rc::downgrade(&self.0))
    }

    /// Inserts `view` at `at_index` (`None` appends). Its root nodes follow
    /// the last root node of the previous view, or the anchor.
    pub fn insert(&self, view: &View, at_index: Option<usize>) -> Result<()> {
        if view.host_container().is_some() {
            return Err(RenderError::addressing(
                "The view is already inserted into a view container",
            ));
        }
        let mut views = self.0.views.borrow_mut();
        let index = at_index.unwrap_or(views.len());
        if index > views.len() {
            return Err(RenderError::addressing(format!(
                "Index {} is out of range, the container has {} views",
                index,
                views.len()
            )));
        }
        let mut sibling = views[..index]
            .iter()
            .rev()
            .find_map(|v| v.root_nodes().last().cloned())
            .unwrap_or_else(|| self.0.anchor.clone());
        for node in view.root_nodes() {
            sibling.insert_after(node);
            sibling = node.clone();
        }
        views.insert(index, view.clone());
        view.set_host_container(Some(self.downgrade()));
        trace!(index, "inserted view into container");
        Ok(())
    }

    /// Removes the view at `at_index` from the container and the DOM without
    /// destroying it.
    pub fn detach(&self, at_index: usize) -> Result<View> {
        let mut views = self.0.views.borrow_mut();
        if at_index >= views.len() {
            return Err(RenderError::addressing(format!(
                "Index {} is out of range, the container has {} views",
                at_index,
                views.len()
            )));
        }
        let view = views.remove(at_index);
        for node in view.root_nodes() {
            node.remove();
        }
        view.set_host_container(None);
        Ok(view)
    }

    pub fn views(&self) -> Vec<View> {
        self.0.views.borrow().clone()
    }
}
