use std::rc::Rc;

use super::compile_control::CompileControl;
use super::compile_element::CompileElement;
use super::compile_step::CompileStep;
use crate::error::Result;
use crate::expression_parser::ExpressionParser;

/// Binds the text children of an element that contain `{{ }}` interpolations.
/// The bound text is replaced by a single space until the first update.
pub struct TextInterpolationParser {
    parser: Rc<dyn ExpressionParser>,
}

impl TextInterpolationParser {
    pub fn new(parser: Rc<dyn ExpressionParser>) -> Self {
        TextInterpolationParser { parser }
    }
}

impl CompileStep for TextInterpolationParser {
    fn process(
        &self,
        _parent: Option<&CompileElement>,
        current: &mut CompileElement,
        _control: &mut CompileControl<'_>,
    ) -> Result<()> {
        if !current.compile_children || current.ignore_bindings {
            return Ok(());
        }
        let children = current.element.template_aware_root().children();
        for (index, node) in children.iter().enumerate() {
            if !node.is_text() {
                continue;
            }
            let expression = self
                .parser
                .parse_interpolation(&node.text_content(), &current.element_description)?;
            if let Some(expression) = expression {
                node.set_text(" ");
                current
                    .bind_element()
                    .borrow_mut()
                    .bind_text(index, expression);
            }
        }
        Ok(())
    }
}
