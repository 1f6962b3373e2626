//! Recording doubles shared by the handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use lambda_http::{Body, Response};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::store::{Item, ItemKey, ItemStore};
use crate::translate::Translator;

/// In-memory [`ItemStore`] that counts reads and writes for call-count
/// assertions.
pub(crate) struct RecordingStore {
    items: Mutex<HashMap<(String, String), Item>>,
    scans: AtomicUsize,
    gets: AtomicUsize,
    writes: AtomicUsize,
    fail: bool,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            scans: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// A store whose every operation fails like an unreachable backend.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub(crate) fn seed(&self, item: Item) {
        let key = (
            item.get_string("pk").unwrap_or_default().to_string(),
            item.get_string("sk").unwrap_or_default().to_string(),
        );
        self.items.lock().expect("poisoned mutex").insert(key, item);
    }

    pub(crate) fn stored(&self, key: &ItemKey) -> Option<Item> {
        self.items
            .lock()
            .expect("poisoned mutex")
            .get(&(key.pk.clone(), key.sk.clone()))
            .cloned()
    }

    pub(crate) fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn unavailable() -> ApiError {
        ApiError::upstream("store unavailable", "connection refused")
    }
}

#[async_trait]
impl ItemStore for RecordingStore {
    async fn scan_items(&self, name_filter: Option<&str>) -> Result<Vec<Item>, ApiError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }

        let items = self.items.lock().expect("poisoned mutex");
        Ok(items
            .values()
            .filter(|item| match name_filter {
                Some(filter) => item
                    .get_string("name")
                    .is_some_and(|name| name.contains(filter)),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, ApiError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }
        Ok(self.stored(key))
    }

    async fn put_item(&self, item: Item) -> Result<(), ApiError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }
        self.seed(item);
        Ok(())
    }

    async fn update_fields(
        &self,
        key: &ItemKey,
        fields: &Map<String, Value>,
    ) -> Result<Item, ApiError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }
        assert!(!fields.is_empty(), "empty update set reached the store");

        // UpdateItem is an upsert, like the real store.
        let mut items = self.items.lock().expect("poisoned mutex");
        let entry = items
            .entry((key.pk.clone(), key.sk.clone()))
            .or_insert_with(|| {
                Item::new()
                    .set_string("pk", key.pk.as_str())
                    .set_string("sk", key.sk.as_str())
            });
        for (name, value) in fields {
            let attribute = serde_dynamo::aws_sdk_dynamodb_1::to_attribute_value(value.clone())
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            entry.attributes.insert(name.clone(), attribute);
        }
        Ok(entry.clone())
    }

    async fn cache_translation(
        &self,
        key: &ItemKey,
        language: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }

        let mut items = self.items.lock().expect("poisoned mutex");
        let entry = items
            .get_mut(&(key.pk.clone(), key.sk.clone()))
            .ok_or(ApiError::NotFound)?;
        let mut translations = entry
            .attributes
            .get("translations")
            .and_then(|av| av.as_m().ok())
            .cloned()
            .unwrap_or_default();
        translations.insert(language.to_string(), AttributeValue::S(text.to_string()));
        entry
            .attributes
            .insert("translations".to_string(), AttributeValue::M(translations));
        Ok(())
    }
}

/// [`Translator`] double producing `"<text> [<language>]"` and counting calls.
pub(crate) struct RecordingTranslator {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingTranslator {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApiError::upstream("translate unavailable", "service error"));
        }
        Ok(format!("{text} [{target_language}]"))
    }
}

/// Parses a handler response body as JSON.
pub(crate) fn body_json(response: &Response<Body>) -> Value {
    match response.body() {
        Body::Text(text) => serde_json::from_str(text).expect("response body is JSON"),
        other => panic!("unexpected body: {other:?}"),
    }
}
