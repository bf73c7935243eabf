//! Template compilation: the compile pipeline, its default steps and the
//! compiler driving them.

mod compile_control;
mod compile_element;
mod compile_pipeline;
mod compile_step;
mod directive_parser;
mod property_binding_parser;
mod template_compiler;
mod template_loader;
mod text_interpolation_parser;
mod view_splitter;

pub use compile_control::{CompileControl, CompileElementRef};
pub use compile_element::{get_element_description, CompileElement};
pub use compile_pipeline::CompilePipeline;
pub use compile_step::{CompileStep, EmptyStep};
pub use directive_parser::DirectiveParser;
pub use property_binding_parser::PropertyBindingParser;
pub use template_compiler::{CompileStepFactory, Compiler, DefaultStepFactory};
pub use template_loader::{DefaultTemplateLoader, TemplateLoader};
pub use text_interpolation_parser::TextInterpolationParser;
pub use view_splitter::ViewSplitter;
