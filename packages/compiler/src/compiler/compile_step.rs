use super::compile_control::CompileControl;
use super::compile_element::CompileElement;
use crate::error::Result;

/// One transformation of the compile pipeline. Steps run in order on every
/// element, parents before children.
pub trait CompileStep {
    fn process(
        &self,
        parent: Option<&CompileElement>,
        current: &mut CompileElement,
        control: &mut CompileControl<'_>,
    ) -> Result<()>;
}

/// Step that leaves every element untouched.
pub struct EmptyStep;

impl CompileStep for EmptyStep {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        _current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        Ok(())
    }
}
