//! Order intake, lookup and renewal over HTTP, plus the expiry notifier fed
//! by the order table's stream.
//!
//! Every handler here is designed for `lambda_runtime::run()`:
//!
//! ```ignore
//! use lambda_runtime::service_fn;
//! use orders::{handle_get_order, OrderApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let api: OrderApi = OrderApi::new(store, Arc::new(SystemClock), "index1");
//!
//!     lambda_runtime::run(service_fn(|event| handle_get_order(&api, event))).await
//! }
//! ```

mod api;
mod batch_handler;
pub mod config;
mod http;
pub mod intake;
mod lookup;
pub mod notifier;
mod renewal;
pub mod response;

pub use api::{OrderApi, ValidationError};
pub use batch_handler::{handle_stream_batch, REMOVE};
pub use config::{ConfigError, OrdersConfig};
pub use http::{
    handle_create_order, handle_get_order, handle_get_orders, handle_renew_order, HttpEvent,
};
pub use notifier::{BatchReport, ExpiredRecord, ExpiryNotifier, NotificationFailure};
pub use response::{format_json_response, ApiResponse};
