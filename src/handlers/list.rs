use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::json;
use tracing::error;

use crate::error::ApiError;
use crate::response;
use crate::store::ItemStore;

/// `GET /items` — every item, optionally narrowed by a `name` substring
/// filter from the query string. The scan is unbounded; there is no
/// response pagination.
pub async fn handle(
    store: &impl ItemStore,
    event: Request,
) -> Result<Response<Body>, lambda_http::Error> {
    match list_items(store, &event).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!("List request failed: {err}");
            Ok(err.to_response())
        }
    }
}

async fn list_items(store: &impl ItemStore, event: &Request) -> Result<Response<Body>, ApiError> {
    let params = event.query_string_parameters();
    let filter = params.first("filter");

    let items = store.scan_items(filter).await?;
    let items = items
        .iter()
        .map(|item| item.to_json())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(response::json(StatusCode::OK, &json!({ "items": items })))
}
