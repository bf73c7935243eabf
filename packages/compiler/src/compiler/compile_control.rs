//! Compile Control
//!
//! Drives the compile steps over one element and lets a step add a new
//! parent, queue an extra child, or drop the current element from the
//! results.

use std::cell::RefCell;
use std::rc::Rc;

use super::compile_element::CompileElement;
use super::compile_step::CompileStep;
use crate::error::Result;

pub type CompileElementRef = Rc<RefCell<CompileElement>>;

pub struct CompileControl<'a> {
    steps: &'a [Box<dyn CompileStep>],
    results: Vec<CompileElementRef>,
    current_step_index: usize,
    parent: Option<CompileElementRef>,
    additional_children: Vec<CompileElementRef>,
    ignore_current_element: bool,
}

impl<'a> CompileControl<'a> {
    pub fn new(steps: &'a [Box<dyn CompileStep>]) -> Self {
        CompileControl {
            steps,
            results: Vec::new(),
            current_step_index: 0,
            parent: None,
            additional_children: Vec::new(),
            ignore_current_element: false,
        }
    }

    /// Runs the steps from `start_step_index` on `current` and returns the
    /// children queued with [`CompileControl::add_child`].
    pub(crate) fn internal_process(
        &mut self,
        start_step_index: usize,
        parent: Option<CompileElementRef>,
        current: CompileElementRef,
    ) -> Result<Vec<CompileElementRef>> {
        let previous_step_index = self.current_step_index;
        let previous_parent = self.parent.take();
        let previous_ignore = std::mem::replace(&mut self.ignore_current_element, false);
        let previous_children = std::mem::take(&mut self.additional_children);

        let steps = self.steps;
        let mut parent = parent;
        let mut outcome = Ok(());
        for (index, step) in steps.iter().enumerate().skip(start_step_index) {
            if self.ignore_current_element {
                break;
            }
            self.parent = parent.clone();
            self.current_step_index = index;
            let parent_guard = parent.as_ref().map(|p| p.borrow());
            let result = step.process(parent_guard.as_deref(), &mut current.borrow_mut(), self);
            drop(parent_guard);
            if let Err(err) = result {
                outcome = Err(err);
                break;
            }
            parent = self.parent.clone();
        }
        if outcome.is_ok() && !self.ignore_current_element {
            self.results.push(current);
        }

        self.current_step_index = previous_step_index;
        self.parent = previous_parent;
        self.ignore_current_element = previous_ignore;
        let children = std::mem::replace(&mut self.additional_children, previous_children);
        outcome.map(|_| children)
    }

    /// Inserts `element` as the new parent of the current element. It runs
    /// through the remaining steps before the current element continues.
    pub fn add_parent(&mut self, element: CompileElement) -> Result<()> {
        let new_parent = Rc::new(RefCell::new(element));
        let parent = self.parent.clone();
        self.internal_process(self.current_step_index + 1, parent, new_parent.clone())?;
        self.parent = Some(new_parent);
        Ok(())
    }

    /// Queues `element` to be compiled after the children of the current one.
    pub fn add_child(&mut self, element: CompileElement) {
        self.additional_children
            .push(Rc::new(RefCell::new(element)));
    }

    pub fn ignore_current_element(&mut self) {
        self.ignore_current_element = true;
    }

    pub(crate) fn into_results(self) -> Vec<CompileElementRef> {
        self.results
    }
}
