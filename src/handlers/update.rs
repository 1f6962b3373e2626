use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, Response};
use serde_json::{json, Map, Value};
use tracing::error;

use crate::error::ApiError;
use crate::response;
use crate::store::{ItemKey, ItemStore};

/// `PUT /items` — partial update of one item, keyed by `pk`/`sk` from the
/// body. Every remaining body field is set verbatim; there is no allow-list,
/// so any API-key holder can set arbitrary attributes.
pub async fn handle(
    store: &impl ItemStore,
    event: Request,
) -> Result<Response<Body>, lambda_http::Error> {
    match update_item(store, &event).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!("Update request failed: {err}");
            Ok(err.to_response())
        }
    }
}

async fn update_item(store: &impl ItemStore, event: &Request) -> Result<Response<Body>, ApiError> {
    let (key, fields) = parse_body(event.body())?;

    let updated = store.update_fields(&key, &fields).await?;

    Ok(response::json(
        StatusCode::OK,
        &json!({
            "message": "Item updated successfully",
            "attributes": updated.to_json()?,
        }),
    ))
}

/// Splits the body into the composite key and the remaining update fields.
fn parse_body(body: &Body) -> Result<(ItemKey, Map<String, Value>), ApiError> {
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
    let Value::Object(mut fields) = parsed else {
        return Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let pk = take_key_attribute(&mut fields, "pk")?;
    let sk = take_key_attribute(&mut fields, "sk")?;

    if fields.is_empty() {
        return Err(ApiError::Validation(
            "No attributes to update besides pk and sk".to_string(),
        ));
    }

    Ok((ItemKey::new(pk, sk), fields))
}

fn take_key_attribute(fields: &mut Map<String, Value>, name: &str) -> Result<String, ApiError> {
    match fields.remove(name) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::Validation(format!(
            "Missing primary key attribute '{name}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handlers::testing::{body_json, RecordingStore};
    use crate::store::Item;

    fn request(body: Body) -> Request {
        Request::new(body)
    }

    fn json_request(value: Value) -> Request {
        request(Body::from(value.to_string()))
    }

    #[tokio::test]
    async fn missing_body_is_rejected_before_the_store() {
        let store = RecordingStore::new();

        let response = handle(&store, request(Body::Empty)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.write_count(), 0);
        let body = body_json(&response);
        assert_eq!(body["message"], "Missing request body");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let store = RecordingStore::new();

        let response = handle(&store, request(Body::from("{not json"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn missing_key_component_is_rejected() {
        let store = RecordingStore::new();

        let response = handle(
            &store,
            json_request(json!({ "pk": "landmark", "name": "Tower" })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(&response);
        assert_eq!(body["message"], "Missing primary key attribute 'sk'");
    }

    #[tokio::test]
    async fn empty_update_set_never_reaches_the_store() {
        let store = RecordingStore::new();

        let response = handle(
            &store,
            json_request(json!({ "pk": "landmark", "sk": "eiffel-tower" })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn updated_fields_are_set_and_others_left_alone() {
        let store = RecordingStore::new();
        store.seed(
            Item::new()
                .set_string("pk", "landmark")
                .set_string("sk", "eiffel-tower")
                .set_string("name", "Eiffel Tower")
                .set_string("city", "Paris"),
        );

        let response = handle(
            &store,
            json_request(json!({
                "pk": "landmark",
                "sk": "eiffel-tower",
                "name": "Tour Eiffel",
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["message"], "Item updated successfully");
        assert_eq!(body["attributes"]["name"], "Tour Eiffel");
        assert_eq!(body["attributes"]["city"], "Paris");

        let stored = store
            .stored(&ItemKey::new("landmark", "eiffel-tower"))
            .unwrap();
        assert_eq!(stored.get_string("name"), Some("Tour Eiffel"));
        assert_eq!(stored.get_string("city"), Some("Paris"));
    }

    #[tokio::test]
    async fn store_failure_surfaces_the_diagnostic() {
        let store = RecordingStore::failing();

        let response = handle(
            &store,
            json_request(json!({
                "pk": "landmark",
                "sk": "eiffel-tower",
                "name": "Tower",
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }
}
