//! Minimal DOM used as the rendering target of compiled templates.

mod html_parser;
mod node;

pub use html_parser::{is_void_element, parse_html};
pub use node::{EventHandler, Node};
