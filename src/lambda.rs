use chrono::Utc;
use jluszcz_rust_utils::lambda;
use lambda_runtime::{LambdaEvent, service_fn};
use log::{debug, info};
use nbalerts::config::Config;
use nbalerts::publish::SnsPublisher;
use nbalerts::sportsdata::SportsApi;
use nbalerts::store::{DynamoStore, GameStore};
use nbalerts::{APP_NAME, handler, install_crypto_provider};
use serde_json::Value;

struct Services {
    api: SportsApi,
    publisher: SnsPublisher,
    store: Option<DynamoStore>,
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    install_crypto_provider();
    lambda::init(APP_NAME, module_path!(), false).await?;

    let config = Config::from_env()?;
    debug!("{config:?}");

    let sdk_config = config.aws_config().await;
    let services = Services {
        api: SportsApi::new(&config.api)?,
        publisher: SnsPublisher::new(&sdk_config, &config.topic_arn),
        store: config
            .table_name
            .as_ref()
            .map(|table| DynamoStore::new(&sdk_config, table)),
    };
    if services.store.is_none() {
        info!("No game table configured, games will not be stored");
    }

    let services = &services;
    let func = service_fn(move |event| async move { function(services, event).await });
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn function(
    services: &Services,
    _event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    let response = handler::run(
        &services.api,
        &services.publisher,
        services.store.as_ref().map(|s| s as &dyn GameStore),
        Utc::now().date_naive(),
    )
    .await;

    Ok(serde_json::to_value(response)?)
}
