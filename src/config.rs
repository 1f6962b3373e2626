use std::env;

use crate::error::ApiError;

/// Runtime configuration shared by every handler binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the items table.
    pub table_name: String,
    /// AWS region the SDK clients are pointed at.
    pub region: String,
}

impl AppConfig {
    /// Reads configuration from the environment.
    ///
    /// Fails at startup on a missing variable instead of letting the first
    /// SDK call fail at request time.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            table_name: require("TABLE_NAME")?,
            region: require("REGION")?,
        })
    }
}

fn require(key: &'static str) -> Result<String, ApiError> {
    env::var(key).map_err(|_| ApiError::Config(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_returns_present_variable() {
        env::set_var("ITEMS_API_CONFIG_TEST_PRESENT", "items");
        assert_eq!(
            require("ITEMS_API_CONFIG_TEST_PRESENT").unwrap(),
            "items".to_string()
        );
    }

    #[test]
    fn require_fails_on_missing_variable() {
        let err = require("ITEMS_API_CONFIG_TEST_MISSING").unwrap_err();
        assert!(matches!(err, ApiError::Config("ITEMS_API_CONFIG_TEST_MISSING")));
    }
}
