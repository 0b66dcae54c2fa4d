//! Collection Factory - single entry point for collection templates
//!
//! The root document is gated structurally before any element is touched.
//! Element failures are collected, never short-circuited; only the strict
//! entry point turns them into an error.

use serde_json::Value;
use tracing::{debug, debug_span, warn};

use crate::chain::{ElementFailure, ResolutionChain};
use crate::config::ResolverConfig;
use crate::container::TemplateContainer;
use crate::error::{ElementError, ElementErrorKind, ResolverError};

/// Result of a lenient `create`: the assembled collection plus every
/// element error, in input order.
#[derive(Debug, Clone)]
pub struct CollectionOutcome<O> {
    pub template: O,
    pub errors: Vec<ElementError>,
    tag_index: bool,
}

impl<O> CollectionOutcome<O> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error strings as reported to callers.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| if self.tag_index { e.tagged() } else { e.message.clone() })
            .collect()
    }
}

/// A factory for one collection kind. Implementors supply the candidate
/// chain and the final assembly; parsing, gating and the element loop
/// are provided.
pub trait CollectionTemplateFactory {
    type Element;
    type Output;

    /// Discriminator value the root document must carry.
    fn target_template_type(&self) -> &str;

    fn chain(&self) -> &ResolutionChain<Self::Element>;

    fn config(&self) -> &ResolverConfig;

    /// Assemble resolved elements, in input order, into the output.
    fn build_collection(&self, templates: Vec<Self::Element>) -> Self::Output;

    /// Resolve every element, returning errors as data.
    fn create_lenient(&self, input: &str) -> Result<CollectionOutcome<Self::Output>, ResolverError> {
        let document: Value = serde_json::from_str(input)?;
        let root = TemplateContainer::from_root(&document);
        let elements = validate_root(&root, self.target_template_type())?;

        let config = self.config();
        let mut templates = Vec::with_capacity(elements.len());
        let mut errors = vec![];

        for (index, element) in elements.iter().enumerate() {
            let _element = debug_span!("template_element", index).entered();
            let resolved = TemplateContainer::from_element(element, config)
                .map_err(|message| ElementFailure {
                    kind: ElementErrorKind::Unmatched,
                    errors: vec![message],
                })
                .and_then(|container| self.chain().resolve(&container));

            match resolved {
                Ok(template) => templates.push(template),
                Err(failure) => {
                    warn!(index, kind = ?failure.kind, errors = failure.errors.len(), "template element failed to resolve");
                    errors.extend(failure.errors.into_iter().map(|message| ElementError {
                        index,
                        kind: failure.kind,
                        message,
                    }));
                }
            }
        }

        debug!(
            template_type = self.target_template_type(),
            resolved = templates.len(),
            failed = errors.len(),
            "collection template resolved"
        );

        Ok(CollectionOutcome {
            template: self.build_collection(templates),
            errors,
            tag_index: config.tag_element_index,
        })
    }

    /// All-or-nothing: any element error fails the whole call.
    fn create(&self, input: &str) -> Result<Self::Output, ResolverError> {
        let outcome = self.create_lenient(input)?;
        if !outcome.is_valid() {
            return Err(ResolverError::InvalidTemplate {
                template_type: self.target_template_type().to_string(),
                errors: outcome.messages(),
            });
        }
        Ok(outcome.template)
    }
}

/// Root discriminator must equal `target` and the payload must be an array.
pub fn validate_root<'a>(root: &'a TemplateContainer, target: &str) -> Result<&'a [Value], ResolverError> {
    if !root.matches_template_name(target) {
        return Err(ResolverError::StructuralMismatch(format!(
            "Expected templateType value {}, actual {}.",
            target, root.template_type
        )));
    }

    root.template.as_array().map(Vec::as_slice).ok_or_else(|| {
        ResolverError::StructuralMismatch(format!(
            "Expected an array for the template property value for template type {}.",
            target
        ))
    })
}
