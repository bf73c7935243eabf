//! Render Configuration

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Which shadow DOM strategy the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowDomMode {
    Native,
    #[default]
    EmulatedUnscoped,
    EmulatedScoped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of returned views kept per proto view.
    pub view_pool_capacity: usize,
    pub shadow_dom: ShadowDomMode,
    /// Base used to resolve relative template and stylesheet urls.
    pub base_url: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            view_pool_capacity: 10,
            shadow_dom: ShadowDomMode::default(),
            base_url: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::Config(e.to_string()))
    }
}
