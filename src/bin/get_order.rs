//! `GET /order/{orderId}`

use lambda_runtime::{service_fn, tracing};
use model::Error;
use orders::{handle_get_order, HttpEvent, OrderApi, OrdersConfig};
use orders_warranty_renewal::order_api;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config: OrdersConfig = OrdersConfig::from_env()?;
    let api: OrderApi = order_api(&config).await;

    lambda_runtime::run(service_fn(|event: HttpEvent| handle_get_order(&api, event))).await
}
