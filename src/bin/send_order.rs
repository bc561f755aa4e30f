//! Sends renewal offers for orders removed from the table by TTL.
//!
//! Subscribed to the order table's stream with `ReportBatchItemFailures`.

use aws_lambda_events::dynamodb::Event;
use lambda_runtime::{service_fn, tracing, LambdaEvent};
use model::Error;
use orders::{handle_stream_batch, ExpiryNotifier, OrdersConfig};
use orders_warranty_renewal::expiry_notifier;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config: OrdersConfig = OrdersConfig::from_env()?;
    let notifier: ExpiryNotifier = expiry_notifier(&config).await?;

    lambda_runtime::run(service_fn(|event: LambdaEvent<Event>| {
        handle_stream_batch(&notifier, event)
    }))
    .await
}
