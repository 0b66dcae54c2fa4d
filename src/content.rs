//! CollectionContent - the device content collection factory

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::chain::{KindCandidate, ResolutionChain, TemplateCandidate};
use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::factory::CollectionTemplateFactory;
use crate::templates::{
    ContentDefinition, ContentTemplate, IotJsonPathContentTemplate, JsonPathContentTemplate,
    IOT_JSON_PATH_CONTENT, JSON_PATH_CONTENT,
};
use crate::validation::ContentValidator;

pub const COLLECTION_CONTENT: &str = "CollectionContent";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionContentTemplate {
    pub templates: Vec<ContentTemplate>,
}

impl CollectionContentTemplate {
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Deserialize a payload and run every content rule over it.
fn build_content<T>(kind: &str, payload: &Value, validator: &ContentValidator) -> Result<T, Vec<String>>
where
    T: DeserializeOwned + ContentDefinition,
{
    if payload.is_null() {
        return Err(vec![format!("Template payload for {} is missing.", kind)]);
    }

    let template: T = serde_json::from_value(payload.clone())
        .map_err(|e| vec![format!("Failed to deserialize {} template: {}", kind, e)])?;

    let errors = validator.validate(&template);
    if errors.is_empty() {
        Ok(template)
    } else {
        Err(errors)
    }
}

pub fn json_path_candidate() -> Box<dyn TemplateCandidate<ContentTemplate>> {
    let validator = ContentValidator::new();
    Box::new(KindCandidate::new(JSON_PATH_CONTENT, move |payload: &Value| {
        build_content::<JsonPathContentTemplate>(JSON_PATH_CONTENT, payload, &validator)
            .map(ContentTemplate::JsonPath)
    }))
}

pub fn iot_json_path_candidate() -> Box<dyn TemplateCandidate<ContentTemplate>> {
    let validator = ContentValidator::new();
    Box::new(KindCandidate::new(IOT_JSON_PATH_CONTENT, move |payload: &Value| {
        build_content::<IotJsonPathContentTemplate>(IOT_JSON_PATH_CONTENT, payload, &validator)
            .map(ContentTemplate::IotJsonPath)
    }))
}

/// Resolves `CollectionContent` documents into their content templates.
pub struct CollectionContentTemplateFactory {
    chain: ResolutionChain<ContentTemplate>,
    config: ResolverConfig,
}

impl CollectionContentTemplateFactory {
    /// Built-in candidates: `JsonPathContent`, then `IotJsonPathContent`.
    pub fn new() -> Self {
        Self {
            chain: ResolutionChain::with_first(json_path_candidate(), [iot_json_path_candidate()]),
            config: ResolverConfig::default(),
        }
    }

    /// Replace the candidate set. Order is dispatch order.
    pub fn with_candidates(candidates: Vec<Box<dyn TemplateCandidate<ContentTemplate>>>) -> Result<Self, ResolverError> {
        Ok(Self {
            chain: ResolutionChain::new(candidates)?,
            config: ResolverConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.chain.kinds()
    }
}

impl Default for CollectionContentTemplateFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionTemplateFactory for CollectionContentTemplateFactory {
    type Element = ContentTemplate;
    type Output = CollectionContentTemplate;

    fn target_template_type(&self) -> &str {
        COLLECTION_CONTENT
    }

    fn chain(&self) -> &ResolutionChain<ContentTemplate> {
        &self.chain
    }

    fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn build_collection(&self, templates: Vec<ContentTemplate>) -> CollectionContentTemplate {
        CollectionContentTemplate { templates }
    }
}
