//! Records exchanged with the renderer: the template to compile and the
//! directives it may use.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveType {
    #[default]
    Directive,
    Component,
    DynamicComponent,
    Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveMetadata {
    pub id: String,
    pub selector: String,
    /// When false, the children of matching elements are not compiled.
    pub compile_children: bool,
    /// Event name (optionally `target:name`) to action source.
    pub events: IndexMap<String, String>,
    /// Directive property to `elementProperty | pipe1 | pipe2`.
    pub bind: IndexMap<String, String>,
    /// Element properties the directive writes through setters.
    pub setters: Vec<String>,
    #[serde(rename = "type")]
    pub directive_type: DirectiveType,
}

impl Default for DirectiveMetadata {
    fn default() -> Self {
        DirectiveMetadata {
            id: String::new(),
            selector: String::new(),
            compile_children: true,
            events: IndexMap::new(),
            bind: IndexMap::new(),
            setters: Vec::new(),
            directive_type: DirectiveType::Directive,
        }
    }
}

impl DirectiveMetadata {
    pub fn new(id: &str, selector: &str) -> Self {
        DirectiveMetadata {
            id: id.to_string(),
            selector: selector.to_string(),
            ..Default::default()
        }
    }

    pub fn component(id: &str, selector: &str) -> Self {
        DirectiveMetadata {
            directive_type: DirectiveType::Component,
            ..Self::new(id, selector)
        }
    }
}

/// A component template. `inline` wins over `abs_url` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub id: String,
    pub abs_url: Option<String>,
    pub inline: Option<String>,
    pub directives: Vec<DirectiveMetadata>,
}

impl Template {
    pub fn inline(id: &str, html: &str) -> Self {
        Template {
            id: id.to_string(),
            inline: Some(html.to_string()),
            ..Default::default()
        }
    }

    pub fn from_url(id: &str, abs_url: &str) -> Self {
        Template {
            id: id.to_string(),
            abs_url: Some(abs_url.to_string()),
            ..Default::default()
        }
    }

    pub fn with_directives(mut self, directives: Vec<DirectiveMetadata>) -> Self {
        self.directives = directives;
        self
    }
}
