use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, Response};
use serde_json::{json, Value};
use tracing::error;

use crate::error::ApiError;
use crate::response;
use crate::store::{Item, ItemStore};

/// `POST /items` — create (or replace) a complete item from the JSON body.
pub async fn handle(
    store: &impl ItemStore,
    event: Request,
) -> Result<Response<Body>, lambda_http::Error> {
    match create_item(store, &event).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!("Create request failed: {err}");
            Ok(err.to_response())
        }
    }
}

async fn create_item(store: &impl ItemStore, event: &Request) -> Result<Response<Body>, ApiError> {
    let item = parse_body(event.body())?;

    store.put_item(item).await?;

    Ok(response::json(
        StatusCode::CREATED,
        &json!({ "message": "Item created" }),
    ))
}

fn parse_body(body: &Body) -> Result<Item, ApiError> {
    let raw = match body {
        Body::Empty => return Err(ApiError::Validation("Missing request body".to_string())),
        Body::Text(text) => text.as_str(),
        Body::Binary(_) => {
            return Err(ApiError::Validation(
                "Request body must be JSON text".to_string(),
            ))
        }
    };

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::Validation(format!("Malformed JSON body: {e}")))?;
    let Value::Object(fields) = parsed else {
        return Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    };

    for name in ["pk", "sk"] {
        match fields.get(name) {
            Some(Value::String(value)) if !value.is_empty() => {}
            _ => {
                return Err(ApiError::Validation(format!(
                    "Missing primary key attribute '{name}'"
                )))
            }
        }
    }

    Item::from_json(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handlers::testing::{body_json, RecordingStore};
    use crate::store::ItemKey;

    fn json_request(value: Value) -> Request {
        Request::new(Body::from(value.to_string()))
    }

    #[tokio::test]
    async fn creates_the_item_with_all_fields() {
        let store = RecordingStore::new();

        let response = handle(
            &store,
            json_request(json!({
                "pk": "landmark",
                "sk": "eiffel-tower",
                "name": "Eiffel Tower",
                "description": "Iron lattice tower in Paris",
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(&response);
        assert_eq!(body["message"], "Item created");

        let stored = store
            .stored(&ItemKey::new("landmark", "eiffel-tower"))
            .unwrap();
        assert_eq!(stored.get_string("name"), Some("Eiffel Tower"));
        assert_eq!(
            stored.description(),
            Some("Iron lattice tower in Paris")
        );
    }

    #[tokio::test]
    async fn missing_body_or_keys_is_rejected() {
        let store = RecordingStore::new();

        let response = handle(&store, Request::new(Body::Empty)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = handle(&store, json_request(json!({ "sk": "eiffel-tower" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(&response);
        assert_eq!(body["message"], "Missing primary key attribute 'pk'");

        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_becomes_a_500() {
        let store = RecordingStore::failing();

        let response = handle(
            &store,
            json_request(json!({ "pk": "landmark", "sk": "eiffel-tower" })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
