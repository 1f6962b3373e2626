//! Serverless items API: DynamoDB-backed CRUD handlers plus a translation
//! handler that caches Amazon Translate results per item and language.
//!
//! Each binary under `src/bin/` wires one handler to the Lambda HTTP runtime;
//! the handlers themselves are plain async functions over the [`store`] and
//! [`translate`] seams so they can be exercised without AWS.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod response;
pub mod store;
pub mod translate;
pub mod utils;
