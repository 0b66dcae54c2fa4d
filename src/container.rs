//! Template Container - discriminated JSON documents

use serde_json::Value;

use crate::config::ResolverConfig;

/// A discriminator plus a payload that has not been typed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateContainer {
    pub template_type: String,
    pub template: Value,
}

impl TemplateContainer {
    pub fn new(template_type: impl Into<String>, template: Value) -> Self {
        Self {
            template_type: template_type.into(),
            template,
        }
    }

    /// Read the root `templateType`/`template` pair from any JSON value.
    /// An absent or null discriminator reads as `""`; any other non-string
    /// discriminator reads as its JSON rendering. Neither ever matches a
    /// target kind, so the gate reports them as structural mismatches.
    pub fn from_root(root: &Value) -> Self {
        let template_type = match root.get("templateType") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
        };
        let template = root.get("template").cloned().unwrap_or(Value::Null);
        Self::new(template_type, template)
    }

    pub fn matches_template_name(&self, name: &str) -> bool {
        self.template_type == name
    }

    /// Wrap one collection element, reading the discriminator and payload
    /// fields named by `config`.
    pub fn from_element(element: &Value, config: &ResolverConfig) -> Result<Self, String> {
        let field = &config.element_discriminator;
        let template_type = element
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("template element is missing the '{}' discriminator", field))?;

        let template = match &config.element_payload {
            Some(payload) => element.get(payload).cloned().unwrap_or(Value::Null),
            None => element.clone(),
        };

        Ok(Self::new(template_type, template))
    }
}
