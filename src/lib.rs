//! Wiring shared by the order Lambda functions: AWS clients, the order table
//! and the message transports, all configured from the environment.

use aws_config::{BehaviorVersion, SdkConfig};
use model::SystemClock;
use notify_aws::{SesEmailSender, SnsSmsSender};
use orders::{ConfigError, ExpiryNotifier, OrderApi, OrdersConfig};
use std::sync::Arc;
use store_dynamodb::DynamoDbOrderStore;

pub async fn load_aws_config() -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}

fn order_store(sdk_config: &SdkConfig, config: &OrdersConfig) -> DynamoDbOrderStore {
    DynamoDbOrderStore::new(
        aws_sdk_dynamodb::Client::new(sdk_config),
        config.table_name.as_str(),
    )
}

/// The HTTP order operations backed by the order table.
pub async fn order_api(config: &OrdersConfig) -> OrderApi {
    let sdk_config: SdkConfig = load_aws_config().await;

    // Point reads see renewals immediately
    let store: DynamoDbOrderStore = order_store(&sdk_config, config).with_consistent_read(true);

    OrderApi::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config.index_name.as_str(),
    )
}

/// The expiry notifier, sending email through SES and SMS through SNS.
pub async fn expiry_notifier(config: &OrdersConfig) -> Result<ExpiryNotifier, ConfigError> {
    let base_url: &str = config.require_renewal_base_url()?;
    let sdk_config: SdkConfig = load_aws_config().await;

    let email: SesEmailSender = SesEmailSender::new(
        aws_sdk_sesv2::Client::new(&sdk_config),
        config.email_sender.as_str(),
    );
    let sms: SnsSmsSender = SnsSmsSender::new(aws_sdk_sns::Client::new(&sdk_config));

    Ok(ExpiryNotifier::new(
        Arc::new(order_store(&sdk_config, config)),
        Arc::new(email),
        Arc::new(sms),
        Arc::new(SystemClock),
        base_url,
    )
    .with_concurrency(config.notify_concurrency))
}
