//! Resolver Configuration
//!
//! Controls how array elements are unwrapped into containers and how
//! element errors are rendered.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ResolverError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Field read from each element as its discriminator.
    #[serde(default = "default_element_discriminator")]
    pub element_discriminator: String,
    /// Field holding each element's payload. `None` uses the whole element.
    #[serde(default = "default_element_payload")]
    pub element_payload: Option<String>,
    /// Prefix rendered element errors with `template[i]: `.
    #[serde(default)]
    pub tag_element_index: bool,
}

fn default_element_discriminator() -> String { "templateType".to_string() }
fn default_element_payload() -> Option<String> { Some("template".to_string()) }

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            element_discriminator: default_element_discriminator(),
            element_payload: default_element_payload(),
            tag_element_index: false,
        }
    }
}

impl ResolverConfig {
    /// Elements carry their discriminator inline, e.g. `{"type": "A", ...}`.
    pub fn inline(discriminator: impl Into<String>) -> Self {
        Self {
            element_discriminator: discriminator.into(),
            element_payload: None,
            tag_element_index: false,
        }
    }

    pub fn with_index_tags(mut self) -> Self {
        self.tag_element_index = true;
        self
    }

    pub fn from_json(content: &str) -> Result<Self, ResolverError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ResolverError> {
        let content = fs::read_to_string(path).map_err(|source| ResolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}
