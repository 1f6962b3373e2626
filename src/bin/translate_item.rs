//! Lambda entrypoint for `GET /things/{pk}/{sk}/translation`.

use lambda_http::{run, service_fn, Error};

use items_translation_api::config::AppConfig;
use items_translation_api::handlers::translate;
use items_translation_api::logging;
use items_translation_api::store::DynamoItemStore;
use items_translation_api::translate::AwsTranslator;

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init_logging()?;
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region))
        .load()
        .await;
    // One client set per process, reused across invocations.
    let store = DynamoItemStore::new(&sdk_config, config.table_name);
    let translator = AwsTranslator::new(&sdk_config);

    run(service_fn(|event| {
        translate::handle(&store, &translator, event)
    }))
    .await
}
