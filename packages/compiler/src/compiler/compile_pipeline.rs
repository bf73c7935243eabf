//! Compile Pipeline
//!
//! Walks a template depth first and runs every compile step on each
//! element.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::compile_control::{CompileControl, CompileElementRef};
use super::compile_element::CompileElement;
use super::compile_step::CompileStep;
use crate::dom::Node;
use crate::error::Result;
use crate::view::ProtoViewBuilder;

pub struct CompilePipeline {
    steps: Vec<Box<dyn CompileStep>>,
}

impl CompilePipeline {
    pub fn new(steps: Vec<Box<dyn CompileStep>>) -> Self {
        CompilePipeline { steps }
    }

    /// Compiles `root_element` and returns the compile elements in document
    /// order, parents added by steps before their children. The first result
    /// carries the root proto view builder.
    pub fn process(&self, root_element: &Node, compilation_unit: &str) -> Result<Vec<CompileElementRef>> {
        let mut control = CompileControl::new(&self.steps);
        let mut root = CompileElement::new(
            root_element.clone(),
            compilation_unit,
            ProtoViewBuilder::new_ref(root_element.clone()),
        );
        root.is_view_root = true;
        self.process_element(&mut control, None, Rc::new(RefCell::new(root)), compilation_unit)?;
        let results = control.into_results();
        debug!(compilation_unit, elements = results.len(), "compiled template");
        Ok(results)
    }

    fn process_element(
        &self,
        control: &mut CompileControl<'_>,
        parent: Option<CompileElementRef>,
        current: CompileElementRef,
        compilation_unit: &str,
    ) -> Result<()> {
        let additional_children = control.internal_process(0, parent, current.clone())?;

        let (compile_children, root) = {
            let current = current.borrow();
            (current.compile_children, current.element.template_aware_root())
        };
        if compile_children {
            let mut node = root.first_child();
            while let Some(child) = node {
                // steps can move the child, so the sibling is read first
                node = child.next_sibling();
                if !child.is_element() {
                    continue;
                }
                let child_element = {
                    let current = current.borrow();
                    let mut ce = CompileElement::new(
                        child,
                        compilation_unit,
                        current.inherited_proto_view.clone(),
                    );
                    ce.inherited_element_binder = current.inherited_element_binder.clone();
                    ce.distance_to_inherited_binder = current.distance_to_inherited_binder + 1;
                    ce
                };
                self.process_element(
                    control,
                    Some(current.clone()),
                    Rc::new(RefCell::new(child_element)),
                    compilation_unit,
                )?;
            }
        }

        for child in additional_children {
            self.process_element(control, Some(current.clone()), child, compilation_unit)?;
        }
        Ok(())
    }
}
