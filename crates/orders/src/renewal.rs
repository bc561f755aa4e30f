use crate::api::{present, OrderApi};
use crate::response::{message, ok, ApiResponse};
use lambda_runtime::tracing;
use model::{Expiry, ExpiryPatch};
use serde_json::json;

impl OrderApi {
    /// Extend the warranty on `order_id` by two years from now and clear its
    /// expired flag.
    ///
    /// Any record holding the id is renewed, whether it is an active order or
    /// a renewal offer. An id whose record has already expired out of the
    /// table is written back with the new expiry.
    pub async fn renew_order(&self, order_id: Option<&str>) -> ApiResponse {
        let Some(order_id) = present(order_id) else {
            return message(400, "Missing orderId query parameter in url");
        };

        let expiry: Expiry = Expiry::warranty_from(self.clock.now());
        let patch: ExpiryPatch = ExpiryPatch::renewal(&expiry);

        tracing::info!(order_id, "Renewing order");

        match self.store.update(order_id, patch).await {
            Ok(_) => ok(json!({
                "orderId": order_id,
                "message": format!(
                    "Your order is renewed. The warranty will expire on {}",
                    expiry.date_string()
                ),
            })),
            Err(err) => {
                tracing::error!("Failed to renew order: {err}");
                message(502, err)
            }
        }
    }
}
