//! Validation System - content template rules
//!
//! Rules produce error strings; they never abort. A candidate collects the
//! output of every rule so one element reports all of its problems at once.

use std::collections::HashSet;

use crate::templates::ContentDefinition;

/// Validation rule trait - produces error messages
pub trait ContentRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, template: &dyn ContentDefinition) -> Vec<String>;
}

fn missing(property: &str) -> String {
    format!("Required property '{}' not found in JSON.", property)
}

// --- Concrete Rules ---

pub struct RequiredPropertiesRule;

impl ContentRule for RequiredPropertiesRule {
    fn name(&self) -> &'static str { "required_properties" }

    fn check(&self, template: &dyn ContentDefinition) -> Vec<String> {
        let mut errors: Vec<String> = template
            .required_properties()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| missing(name))
            .collect();

        for (i, value) in template.values().iter().enumerate() {
            if value.value_name.trim().is_empty() {
                errors.push(format!("{} (values[{}])", missing("valueName"), i));
            }
            if value.value_expression.trim().is_empty() {
                errors.push(format!("{} (values[{}])", missing("valueExpression"), i));
            }
        }

        errors
    }
}

/// Every non-empty expression must be a `$`-rooted JSONPath.
pub struct JsonPathSyntaxRule;

impl ContentRule for JsonPathSyntaxRule {
    fn name(&self) -> &'static str { "json_path_syntax" }

    fn check(&self, template: &dyn ContentDefinition) -> Vec<String> {
        let values = template
            .values()
            .iter()
            .map(|v| ("valueExpression", v.value_expression.as_str()));

        template
            .expressions()
            .into_iter()
            .chain(values)
            .filter(|(_, expr)| !expr.trim().is_empty() && !expr.trim_start().starts_with('$'))
            .map(|(name, expr)| format!("Expression '{}' for {} must be a JSONPath starting with '$'.", expr, name))
            .collect()
    }
}

pub struct UniqueValueNamesRule;

impl ContentRule for UniqueValueNamesRule {
    fn name(&self) -> &'static str { "unique_value_names" }

    fn check(&self, template: &dyn ContentDefinition) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut errors = vec![];

        for value in template.values() {
            let name = value.value_name.as_str();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name) && reported.insert(name) {
                errors.push(format!(
                    "Duplicate value name '{}' in template '{}'.",
                    name,
                    template.type_name()
                ));
            }
        }

        errors
    }
}

/// Runs every rule and concatenates their messages in rule order.
pub struct ContentValidator {
    rules: Vec<Box<dyn ContentRule>>,
}

impl ContentValidator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredPropertiesRule),
                Box::new(JsonPathSyntaxRule),
                Box::new(UniqueValueNamesRule),
            ],
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn ContentRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn validate(&self, template: &dyn ContentDefinition) -> Vec<String> {
        self.rules.iter().flat_map(|rule| rule.check(template)).collect()
    }
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new()
    }
}
