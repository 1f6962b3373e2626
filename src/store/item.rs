use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;

use crate::error::ApiError;

/// A single table item: an attribute map with typed accessors.
///
/// Items are schemaless beyond the `pk`/`sk` key pair. `description` and the
/// `translations` map are the only attributes the handlers interpret; every
/// other attribute passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct Item {
    pub(crate) attributes: HashMap<String, AttributeValue>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: HashMap<String, AttributeValue>) -> Self {
        Self { attributes }
    }

    /// Builds an item from a JSON object, mapping each field to its DynamoDB
    /// attribute type. Rejects non-object values.
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        let attributes = serde_dynamo::aws_sdk_dynamodb_1::to_item(value)
            .map_err(|e| ApiError::Validation(format!("Unsupported item body: {e}")))?;
        Ok(Self { attributes })
    }

    /// Sets a string attribute, replacing any previous value.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::S(value.into()));
        self
    }

    /// The value of an attribute, when it exists and is a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_s().ok())
            .map(String::as_str)
    }

    /// The source text for translation, when present and a string.
    pub fn description(&self) -> Option<&str> {
        self.get_string("description")
    }

    /// The cached translation for `language`, when present and non-empty.
    ///
    /// The `translations` map is sparse: a missing key means "not yet
    /// translated", never "translation is empty".
    pub fn translation(&self, language: &str) -> Option<&str> {
        self.attributes
            .get("translations")
            .and_then(|av| av.as_m().ok())
            .and_then(|map| map.get(language))
            .and_then(|av| av.as_s().ok())
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    /// Converts the attribute map into a JSON object for response bodies.
    pub fn to_json(&self) -> Result<Value, ApiError> {
        serde_dynamo::aws_sdk_dynamodb_1::from_item(self.attributes.clone())
            .map_err(|e| ApiError::upstream("Item conversion failed", e))
    }
}
