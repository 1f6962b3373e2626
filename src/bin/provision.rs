//! One-shot provisioning: verifies credentials, creates the items table when
//! missing, and waits for it to become ACTIVE.
//!
//! Routing, API keys, and throttling are declared in `template.yaml`.

use anyhow::Result;
use tokio::time::Duration;
use tracing::info;

use items_translation_api::config::AppConfig;
use items_translation_api::logging;
use items_translation_api::store::DynamoItemStore;
use items_translation_api::utils::retry_with_backoff;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region))
        .load()
        .await;
    let store = DynamoItemStore::new(&sdk_config, config.table_name);

    store.check_auth().await?;

    if store.create_table_if_not_exists().await? {
        retry_with_backoff(|| store.ensure_table_active(), Duration::from_secs(3), 5).await?;
    }

    info!("Table '{}' is ready", store.table_name());
    Ok(())
}
