//! Resolution Chain - ordered candidate dispatch
//!
//! Candidates are tried in registration order. The first one that claims
//! the discriminator decides the element's outcome; later candidates are
//! never consulted. When every candidate declines, the terminal handler
//! reports the unmatched discriminator.

use serde_json::Value;
use tracing::{debug, trace};

use crate::container::TemplateContainer;
use crate::error::{ElementErrorKind, ResolverError};

/// Outcome of offering a container to one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Not this candidate's discriminator; try the next one.
    NoMatch,
    Matched(T),
    /// This candidate's discriminator, but the content is invalid.
    Invalid(Vec<String>),
}

/// Builds one kind of typed template from a discriminated document.
pub trait TemplateCandidate<T>: Send + Sync {
    fn kind(&self) -> &str;
    fn try_resolve(&self, container: &TemplateContainer) -> Resolution<T>;
}

/// Candidate that claims a single discriminator value and hands the
/// payload to a builder function.
pub struct KindCandidate<F> {
    kind: String,
    build: F,
}

impl<F> KindCandidate<F> {
    pub fn new(kind: impl Into<String>, build: F) -> Self {
        Self { kind: kind.into(), build }
    }
}

impl<T, F> TemplateCandidate<T> for KindCandidate<F>
where
    F: Fn(&Value) -> Result<T, Vec<String>> + Send + Sync,
{
    fn kind(&self) -> &str {
        &self.kind
    }

    fn try_resolve(&self, container: &TemplateContainer) -> Resolution<T> {
        if !container.matches_template_name(&self.kind) {
            return Resolution::NoMatch;
        }
        match (self.build)(&container.template) {
            Ok(template) => Resolution::Matched(template),
            Err(errors) => Resolution::Invalid(errors),
        }
    }
}

/// Failure of a single element: which kind, and every message for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFailure {
    pub kind: ElementErrorKind,
    pub errors: Vec<String>,
}

/// Terminal link. Never declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundHandler;

impl NotFoundHandler {
    pub fn handle<T>(&self, container: &TemplateContainer) -> Result<T, ElementFailure> {
        Err(ElementFailure {
            kind: ElementErrorKind::Unmatched,
            errors: vec![format!(
                "no matching template found for discriminator {}",
                container.template_type
            )],
        })
    }
}

pub struct ResolutionChain<T> {
    candidates: Vec<Box<dyn TemplateCandidate<T>>>,
    terminal: NotFoundHandler,
}

impl<T> ResolutionChain<T> {
    pub fn new(candidates: Vec<Box<dyn TemplateCandidate<T>>>) -> Result<Self, ResolverError> {
        if candidates.is_empty() {
            return Err(ResolverError::EmptyChain);
        }
        Ok(Self {
            candidates,
            terminal: NotFoundHandler,
        })
    }

    /// Non-empty by construction.
    pub fn with_first(
        first: Box<dyn TemplateCandidate<T>>,
        rest: impl IntoIterator<Item = Box<dyn TemplateCandidate<T>>>,
    ) -> Self {
        let mut candidates = vec![first];
        candidates.extend(rest);
        Self {
            candidates,
            terminal: NotFoundHandler,
        }
    }

    /// Registered candidate kinds, in dispatch order.
    pub fn kinds(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.kind()).collect()
    }

    pub fn resolve(&self, container: &TemplateContainer) -> Result<T, ElementFailure> {
        self.candidates
            .iter()
            .find_map(|candidate| match candidate.try_resolve(container) {
                Resolution::NoMatch => {
                    trace!(candidate = candidate.kind(), discriminator = %container.template_type, "candidate declined");
                    None
                }
                Resolution::Matched(template) => {
                    debug!(candidate = candidate.kind(), "candidate resolved template");
                    Some(Ok(template))
                }
                Resolution::Invalid(errors) => {
                    debug!(candidate = candidate.kind(), errors = errors.len(), "candidate rejected template content");
                    Some(Err(validation_failure(candidate.kind(), errors)))
                }
            })
            .unwrap_or_else(|| self.terminal.handle(container))
    }
}

fn validation_failure(kind: &str, mut errors: Vec<String>) -> ElementFailure {
    if errors.is_empty() {
        errors.push(format!("template of kind {} is invalid", kind));
    }
    ElementFailure {
        kind: ElementErrorKind::Validation,
        errors,
    }
}
