#![deny(clippy::all)]

/**
 * Angular Render - template compiler and view engine
 *
 * Compiles HTML templates and directive metadata into immutable proto views
 * and stamps out pooled, index addressed views from them.
 */

// Core modules
pub mod api;
pub mod config;
pub mod directive_matching;
pub mod dom;
mod error;
pub mod events;
pub mod pending;
pub mod util;

// Parsing and compilation
pub mod compiler;
pub mod expression_parser;

// Styles and shadow DOM emulation
pub mod shadow_css;
pub mod shadow_dom;
pub mod style_inliner;
pub mod style_url_resolver;

// Views and rendering
pub mod renderer;
pub mod view;
pub mod xhr;

// Re-exports
pub use api::{DirectiveMetadata, DirectiveType, Template};
pub use compiler::Compiler;
pub use config::{RenderConfig, ShadowDomMode};
pub use dom::Node;
pub use error::{RenderError, Result};
pub use pending::SyncOrPending;
pub use renderer::{DirectRenderer, ProtoViewRef, ViewContainerRef, ViewRef};
pub use shadow_dom::ShadowDomStrategy;
pub use view::{ProtoView, View, ViewFactory};
