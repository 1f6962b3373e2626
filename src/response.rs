use lambda_http::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Response};
use serde_json::Value;

use crate::error::ApiError;

/// Builds a JSON response with `content-type: application/json`.
pub fn json(status: StatusCode, body: &Value) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Like [`json`], additionally allowing any origin. The translation route is
/// called directly from browsers.
pub fn json_with_cors(status: StatusCode, body: &Value) -> Response<Body> {
    let mut response = json(status, body);
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

impl ApiError {
    /// Renders the error as its HTTP response.
    pub fn to_response(&self) -> Response<Body> {
        json(self.status(), &self.body())
    }

    /// Error response for the CORS-enabled translation route.
    pub fn to_response_with_cors(&self) -> Response<Body> {
        json_with_cors(self.status(), &self.body())
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body_text(response: &Response<Body>) -> &str {
        match response.body() {
            Body::Text(text) => text,
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn json_sets_status_and_content_type() {
        let response = json(StatusCode::OK, &json!({ "items": [] }));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_text(&response), r#"{"items":[]}"#);
    }

    #[test]
    fn cors_variant_allows_any_origin() {
        let response = json_with_cors(StatusCode::OK, &json!({ "translatedText": "hola" }));

        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[test]
    fn errors_render_their_taxonomy_status() {
        let response = ApiError::NotFound.to_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(&response), r#"{"message":"Item not found"}"#);
    }
}
