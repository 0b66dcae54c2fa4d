//! Content Templates - typed device content mappings
//!
//! String fields default to empty so that every missing property is
//! reported by validation rather than only the first one serde sees.

use serde::{Deserialize, Serialize};

pub const JSON_PATH_CONTENT: &str = "JsonPathContent";
pub const IOT_JSON_PATH_CONTENT: &str = "IotJsonPathContent";

pub const IOT_DEVICE_ID_EXPRESSION: &str = "$.SystemProperties.iothub-connection-device-id";
pub const IOT_TIMESTAMP_EXPRESSION: &str = "$.SystemProperties.iothub-enqueuedtime";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPathValueExpression {
    #[serde(default)]
    pub value_name: String,
    #[serde(default)]
    pub value_expression: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPathContentTemplate {
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub type_match_expression: String,
    #[serde(default)]
    pub device_id_expression: String,
    #[serde(default)]
    pub timestamp_expression: String,
    #[serde(default)]
    pub patient_id_expression: Option<String>,
    #[serde(default)]
    pub encounter_id_expression: Option<String>,
    #[serde(default)]
    pub correlation_id_expression: Option<String>,
    #[serde(default)]
    pub values: Vec<JsonPathValueExpression>,
}

/// Content routed through IoT Hub. Device id and timestamp come from the
/// hub's system properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IotJsonPathContentTemplate {
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub type_match_expression: String,
    #[serde(default)]
    pub patient_id_expression: Option<String>,
    #[serde(default)]
    pub encounter_id_expression: Option<String>,
    #[serde(default)]
    pub correlation_id_expression: Option<String>,
    #[serde(default)]
    pub values: Vec<JsonPathValueExpression>,
}

impl IotJsonPathContentTemplate {
    pub fn device_id_expression(&self) -> &'static str {
        IOT_DEVICE_ID_EXPRESSION
    }

    pub fn timestamp_expression(&self) -> &'static str {
        IOT_TIMESTAMP_EXPRESSION
    }
}

/// Field view shared by every content template kind, consumed by the
/// validation rules.
pub trait ContentDefinition {
    fn type_name(&self) -> &str;

    /// Properties that must be present and non-empty.
    fn required_properties(&self) -> Vec<(&'static str, &str)>;

    /// Every expression set on the template, keyed by property name.
    fn expressions(&self) -> Vec<(&'static str, &str)>;

    fn values(&self) -> &[JsonPathValueExpression];
}

fn optional_expressions<'a>(
    patient: &'a Option<String>,
    encounter: &'a Option<String>,
    correlation: &'a Option<String>,
) -> impl Iterator<Item = (&'static str, &'a str)> {
    [
        ("patientIdExpression", patient),
        ("encounterIdExpression", encounter),
        ("correlationIdExpression", correlation),
    ]
    .into_iter()
    .filter_map(|(name, expr)| expr.as_deref().map(|e| (name, e)))
}

impl ContentDefinition for JsonPathContentTemplate {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn required_properties(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("typeName", self.type_name.as_str()),
            ("typeMatchExpression", self.type_match_expression.as_str()),
            ("deviceIdExpression", self.device_id_expression.as_str()),
            ("timestampExpression", self.timestamp_expression.as_str()),
        ]
    }

    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut exprs = vec![
            ("typeMatchExpression", self.type_match_expression.as_str()),
            ("deviceIdExpression", self.device_id_expression.as_str()),
            ("timestampExpression", self.timestamp_expression.as_str()),
        ];
        exprs.extend(optional_expressions(
            &self.patient_id_expression,
            &self.encounter_id_expression,
            &self.correlation_id_expression,
        ));
        exprs
    }

    fn values(&self) -> &[JsonPathValueExpression] {
        &self.values
    }
}

impl ContentDefinition for IotJsonPathContentTemplate {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn required_properties(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("typeName", self.type_name.as_str()),
            ("typeMatchExpression", self.type_match_expression.as_str()),
        ]
    }

    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut exprs = vec![("typeMatchExpression", self.type_match_expression.as_str())];
        exprs.extend(optional_expressions(
            &self.patient_id_expression,
            &self.encounter_id_expression,
            &self.correlation_id_expression,
        ));
        exprs
    }

    fn values(&self) -> &[JsonPathValueExpression] {
        &self.values
    }
}

/// Any content template a `CollectionContent` collection may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "templateType", content = "template")]
pub enum ContentTemplate {
    #[serde(rename = "JsonPathContent")]
    JsonPath(JsonPathContentTemplate),
    #[serde(rename = "IotJsonPathContent")]
    IotJsonPath(IotJsonPathContentTemplate),
}

impl ContentTemplate {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JsonPath(_) => JSON_PATH_CONTENT,
            Self::IotJsonPath(_) => IOT_JSON_PATH_CONTENT,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::JsonPath(t) => &t.type_name,
            Self::IotJsonPath(t) => &t.type_name,
        }
    }
}
