//! Error Taxonomy
//!
//! Fatal errors abort a `create` call. Element errors are data and only
//! escalate at the strict boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Resolution chain requires at least one candidate")]
    EmptyChain,

    #[error("Malformed template input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("{0}")]
    StructuralMismatch(String),

    #[error("There were errors found for template type {template_type}: \n{}", .errors.join("\n"))]
    InvalidTemplate {
        template_type: String,
        errors: Vec<String>,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ResolverError {
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralMismatch(_))
    }
}

/// Why a single array element failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementErrorKind {
    /// No candidate accepted the discriminator.
    Unmatched,
    /// A candidate accepted the discriminator but rejected the content.
    Validation,
}

/// One error string recorded against one array element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementError {
    pub index: usize,
    pub kind: ElementErrorKind,
    pub message: String,
}

impl ElementError {
    /// Render with a `template[i]: ` prefix.
    pub fn tagged(&self) -> String {
        format!("template[{}]: {}", self.index, self.message)
    }
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
