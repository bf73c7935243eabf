//! Binding expression parsing.

mod ast;
mod parser;

pub use ast::{Ast, AstWithSource, TemplateBinding};
pub use parser::{ExpressionParser, SourceExpressionParser};
