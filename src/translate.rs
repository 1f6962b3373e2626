use async_trait::async_trait;
use aws_sdk_translate::error::DisplayErrorContext;
use aws_sdk_translate::Client;

use crate::error::ApiError;

/// Translation service seam; production uses Amazon Translate.
#[async_trait]
pub trait Translator {
    /// Translates `text` into `target_language`, auto-detecting the source
    /// language. Deterministic for identical inputs, which is what makes
    /// redundant concurrent cache misses harmless.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError>;
}

/// Amazon Translate client wrapper.
#[derive(Debug, Clone)]
pub struct AwsTranslator {
    client: Client,
}

impl AwsTranslator {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Translator for AwsTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .translate_text()
            .text(text)
            .source_language_code("auto")
            .target_language_code(target_language)
            .send()
            .await
            .map_err(|e| ApiError::upstream("Translation failed", DisplayErrorContext(e)))?;

        Ok(response.translated_text().to_string())
    }
}

/// Normalizes and validates a target language code.
///
/// Input is lower-cased, then must be a two-letter code optionally followed
/// by a hyphen and a two-letter region (`es`, `pt-br`).
pub fn validate_language_code(raw: &str) -> Result<String, ApiError> {
    let code = raw.to_lowercase();
    let bytes = code.as_bytes();

    let valid = match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_lowercase),
        5 => {
            bytes[2] == b'-'
                && bytes[..2].iter().all(u8::is_ascii_lowercase)
                && bytes[3..].iter().all(u8::is_ascii_lowercase)
        }
        _ => false,
    };

    if valid {
        Ok(code)
    } else {
        Err(ApiError::Validation(format!(
            "Invalid language code '{raw}'"
        )))
    }
}
