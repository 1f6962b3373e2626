use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
    ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::error::ApiError;
use crate::store::{Item, ItemKey, PARTITION_KEY, SORT_KEY};

/// Store operations the handlers depend on.
///
/// The production implementation talks to DynamoDB; tests substitute
/// recording doubles.
#[async_trait]
pub trait ItemStore {
    /// Every item in the table, optionally narrowed to those whose `name`
    /// attribute contains `name_filter` as a substring (case-sensitive).
    async fn scan_items(&self, name_filter: Option<&str>) -> Result<Vec<Item>, ApiError>;

    /// The item under `key`, or `None`.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, ApiError>;

    /// Creates or replaces a whole item.
    async fn put_item(&self, item: Item) -> Result<(), ApiError>;

    /// Sets `fields` verbatim on the item under `key` (last-write-wins, no
    /// merge for nested values) and returns the post-update item.
    async fn update_fields(
        &self,
        key: &ItemKey,
        fields: &Map<String, Value>,
    ) -> Result<Item, ApiError>;

    /// Caches one translation under `translations.<language>`, initializing
    /// the map when absent and never touching sibling entries.
    async fn cache_translation(
        &self,
        key: &ItemKey,
        language: &str,
        text: &str,
    ) -> Result<(), ApiError>;
}

/// DynamoDB-backed [`ItemStore`].
///
/// The wrapped client is a stateless connection pool; binaries create one
/// store per process and share it across invocations.
#[derive(Debug, Clone)]
pub struct DynamoItemStore {
    client: Client,
    table_name: String,
}

impl DynamoItemStore {
    pub fn new(sdk_config: &aws_config::SdkConfig, table_name: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    // --- Provisioning ---

    /// Verifies credentials by listing tables.
    pub async fn check_auth(&self) -> anyhow::Result<()> {
        self.client.list_tables().send().await.map_err(|e| {
            error!("Authentication failed: {}", DisplayErrorContext(&e));
            anyhow!("Authentication failed")
        })?;
        info!("Authentication successful");
        Ok(())
    }

    /// Creates the items table with its composite string key when missing.
    ///
    /// Returns `true` when a table was created and is still materializing.
    pub async fn create_table_if_not_exists(&self) -> anyhow::Result<bool> {
        if self.table_exists().await? {
            info!("Table '{}' exists", self.table_name);
            return Ok(false);
        }

        let attribute_definitions = vec![
            AttributeDefinition::builder()
                .attribute_name(PARTITION_KEY)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
            AttributeDefinition::builder()
                .attribute_name(SORT_KEY)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        ];

        let key_schema = vec![
            KeySchemaElement::builder()
                .attribute_name(PARTITION_KEY)
                .key_type(KeyType::Hash)
                .build()?,
            KeySchemaElement::builder()
                .attribute_name(SORT_KEY)
                .key_type(KeyType::Range)
                .build()?,
        ];

        self.client
            .create_table()
            .table_name(&self.table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .send()
            .await?;

        info!("Created table '{}'", self.table_name);
        Ok(true)
    }

    /// Errors until the table reports ACTIVE.
    pub async fn ensure_table_active(&self) -> anyhow::Result<()> {
        let response = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await?;

        match response.table().and_then(|t| t.table_status()) {
            Some(TableStatus::Active) => Ok(()),
            status => Err(anyhow!(
                "table '{}' not active yet (status {status:?})",
                self.table_name
            )),
        }
    }

    async fn table_exists(&self) -> anyhow::Result<bool> {
        let tables = self.client.list_tables().send().await?;
        Ok(tables.table_names().contains(&self.table_name))
    }
}

#[async_trait]
impl ItemStore for DynamoItemStore {
    async fn scan_items(&self, name_filter: Option<&str>) -> Result<Vec<Item>, ApiError> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut scan = self.client.scan().table_name(&self.table_name);

            // The filter runs server-side after the read; it narrows the
            // response, not the read cost.
            if let Some(filter) = name_filter {
                scan = scan
                    .filter_expression("contains(#name, :filterVal)")
                    .expression_attribute_names("#name", "name")
                    .expression_attribute_values(
                        ":filterVal",
                        AttributeValue::S(filter.to_string()),
                    );
            }

            if let Some(key) = last_evaluated_key {
                scan = scan.set_exclusive_start_key(Some(key));
            }

            let response = scan
                .send()
                .await
                .map_err(|e| ApiError::upstream("Scan failed", DisplayErrorContext(e)))?;

            if let Some(new_items) = response.items {
                items.extend(new_items.into_iter().map(Item::from_attributes));
            }

            last_evaluated_key = response.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, ApiError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key.to_attributes()))
            .send()
            .await
            .map_err(|e| ApiError::upstream("GetItem failed", DisplayErrorContext(e)))?;

        Ok(response.item.map(Item::from_attributes))
    }

    async fn put_item(&self, item: Item) -> Result<(), ApiError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item.attributes))
            .send()
            .await
            .map_err(|e| ApiError::upstream("PutItem failed", DisplayErrorContext(e)))?;

        info!("Item added to '{}'", self.table_name);
        Ok(())
    }

    async fn update_fields(
        &self,
        key: &ItemKey,
        fields: &Map<String, Value>,
    ) -> Result<Item, ApiError> {
        let (update_expression, names, values) = build_update_expression(fields)?;

        let response = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key.to_attributes()))
            .update_expression(update_expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| ApiError::upstream("UpdateItem failed", DisplayErrorContext(e)))?;

        info!("Item updated in '{}'", self.table_name);
        Ok(Item::from_attributes(response.attributes.unwrap_or_default()))
    }

    async fn cache_translation(
        &self,
        key: &ItemKey,
        language: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key.to_attributes()))
            .update_expression(
                "SET translations = if_not_exists(translations, :emptyMap), \
                 translations.#lang = :translatedText",
            )
            .expression_attribute_names("#lang", language)
            .expression_attribute_values(
                ":translatedText",
                AttributeValue::S(text.to_string()),
            )
            .expression_attribute_values(":emptyMap", AttributeValue::M(HashMap::new()))
            .send()
            .await
            .map_err(|e| {
                ApiError::upstream("Translation cache update failed", DisplayErrorContext(e))
            })?;

        info!("Cached '{language}' translation in '{}'", self.table_name);
        Ok(())
    }
}

/// Builds a parameterized `SET` expression assigning every field verbatim.
///
/// Rejects an empty field set up front: a bare `SET` is malformed and must
/// never reach the store.
pub(crate) fn build_update_expression(
    fields: &Map<String, Value>,
) -> Result<
    (
        String,
        HashMap<String, String>,
        HashMap<String, AttributeValue>,
    ),
    ApiError,
> {
    if fields.is_empty() {
        return Err(ApiError::Validation(
            "No attributes to update besides the primary key".to_string(),
        ));
    }

    let mut update_expression = String::from("SET ");
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    for (i, (attr_name, attr_value)) in fields.iter().enumerate() {
        let name_placeholder = format!("#attr{i}");
        let value_placeholder = format!(":val{i}");

        if i > 0 {
            update_expression.push_str(", ");
        }
        update_expression.push_str(&format!("{name_placeholder} = {value_placeholder}"));

        let value = serde_dynamo::aws_sdk_dynamodb_1::to_attribute_value(attr_value.clone())
            .map_err(|e| {
                ApiError::Validation(format!("Unsupported value for '{attr_name}': {e}"))
            })?;
        names.insert(name_placeholder, attr_name.clone());
        values.insert(value_placeholder, value);
    }

    Ok((update_expression, names, values))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn update_expression_assigns_each_field_once() {
        // serde_json maps iterate in key order, so placeholders are stable.
        let fields = fields(json!({ "name": "Tower", "visits": 7 }));

        let (expression, names, values) = build_update_expression(&fields).unwrap();

        assert_eq!(expression, "SET #attr0 = :val0, #attr1 = :val1");
        assert_eq!(names.get("#attr0"), Some(&"name".to_string()));
        assert_eq!(names.get("#attr1"), Some(&"visits".to_string()));
        assert_eq!(
            values.get(":val0"),
            Some(&AttributeValue::S("Tower".to_string()))
        );
        assert_eq!(
            values.get(":val1"),
            Some(&AttributeValue::N("7".to_string()))
        );
    }

    #[test]
    fn update_expression_rejects_the_empty_set() {
        let err = build_update_expression(&Map::new()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn update_expression_handles_nested_values() {
        let fields = fields(json!({ "tags": ["tall", "iron"] }));

        let (expression, _, values) = build_update_expression(&fields).unwrap();

        assert_eq!(expression, "SET #attr0 = :val0");
        assert!(matches!(values.get(":val0"), Some(AttributeValue::L(_))));
    }
}
