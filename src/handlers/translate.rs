use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::json;
use tracing::{error, info};

use crate::error::ApiError;
use crate::response;
use crate::store::{Item, ItemKey, ItemStore};
use crate::translate::{validate_language_code, Translator};

/// `GET /things/{pk}/{sk}/translation?language=` — cache-aside translation
/// of the item's `description`.
///
/// The read-check-write sequence is not atomic: two concurrent misses for
/// the same language may both translate and both write. Both writes carry
/// the same value, so last-writer-wins is acceptable.
pub async fn handle(
    store: &impl ItemStore,
    translator: &impl Translator,
    event: Request,
) -> Result<Response<Body>, lambda_http::Error> {
    match translate_item(store, translator, &event).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!("Translation request failed: {err}");
            Ok(err.to_response_with_cors())
        }
    }
}

async fn translate_item(
    store: &impl ItemStore,
    translator: &impl Translator,
    event: &Request,
) -> Result<Response<Body>, ApiError> {
    let (key, language) = parse_request(event)?;

    let item = store.get_item(&key).await?.ok_or(ApiError::NotFound)?;
    let description = usable_description(&item)?;

    // Cache hit: no translation call, no write.
    if let Some(cached) = item.translation(&language) {
        return Ok(response::json_with_cors(
            StatusCode::OK,
            &json!({ "translatedText": cached }),
        ));
    }

    let translated = translator.translate(description, &language).await?;
    store.cache_translation(&key, &language, &translated).await?;
    info!("Translated '{}/{}' into '{language}'", key.pk, key.sk);

    Ok(response::json_with_cors(
        StatusCode::OK,
        &json!({
            "message": "Translation updated successfully",
            "translatedText": translated,
        }),
    ))
}

/// Validates parameters in order: presence first, then the language code.
fn parse_request(event: &Request) -> Result<(ItemKey, String), ApiError> {
    let path = event.path_parameters();
    let query = event.query_string_parameters();

    let (Some(pk), Some(sk), Some(language)) = (
        path.first("pk"),
        path.first("sk"),
        query.first("language"),
    ) else {
        return Err(ApiError::Validation(
            "Missing required parameters (pk, sk, language)".to_string(),
        ));
    };

    let language = validate_language_code(language)?;
    Ok((ItemKey::new(pk, sk), language))
}

fn usable_description(item: &Item) -> Result<&str, ApiError> {
    match item.description() {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::Validation(
            "description is not a valid string".to_string(),
        )),
    }
}
