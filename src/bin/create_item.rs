//! Lambda entrypoint for `POST /items`.

use lambda_http::{run, service_fn, Error};

use items_translation_api::config::AppConfig;
use items_translation_api::handlers::create;
use items_translation_api::logging;
use items_translation_api::store::DynamoItemStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init_logging()?;
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region))
        .load()
        .await;
    let store = DynamoItemStore::new(&sdk_config, config.table_name);

    run(service_fn(|event| create::handle(&store, event))).await
}
