//! Render Errors
//!
//! Every fallible operation of the compiler and the view engine returns
//! [`Result`]. Errors are `Clone` so that one rejected sub-task can be
//! reported through an aggregate join.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Template content could not be obtained.
    #[error("Failed to load the template \"{template_id}\": {reason}")]
    TemplateLoad { template_id: String, reason: String },

    /// A stylesheet could not be fetched.
    #[error("Failed to fetch {url}: {reason}")]
    StyleLoad { url: String, reason: String },

    /// Structural problem found while compiling a template.
    #[error("{message} in {location}")]
    Compile { message: String, location: String },

    #[error("{0}")]
    SelectorParse(String),

    #[error("Parse error in [{source_text}] in {location}: {message}")]
    ExpressionParse {
        message: String,
        source_text: String,
        location: String,
    },

    /// Index or property that does not exist in the addressed view.
    #[error("{0}")]
    Addressing(String),

    #[error("Element binder {index} has no component to merge a proto view into")]
    NotAComponent { index: usize },

    #[error("The proto view builder has already been built")]
    AlreadyBuilt,

    #[error("Invalid render configuration: {0}")]
    Config(String),
}

impl RenderError {
    pub fn compile(message: impl Into<String>, location: impl Into<String>) -> Self {
        RenderError::Compile {
            message: message.into(),
            location: location.into(),
        }
    }

    pub fn addressing(message: impl Into<String>) -> Self {
        RenderError::Addressing(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
