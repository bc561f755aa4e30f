use crate::api::{present, OrderApi};
use crate::response::{message, ok, ApiResponse};
use lambda_runtime::tracing;
use serde_json::json;
use store::IndexQuery;

impl OrderApi {
    /// Fetch a single order. A missing order is an empty payload, not an error.
    pub async fn get_order(&self, order_id: Option<&str>) -> ApiResponse {
        let Some(order_id) = present(order_id) else {
            return message(400, "Missing orderId in path of URL");
        };

        match self.store.get(order_id).await {
            Ok(Some(order)) => ok(json!(order)),
            Ok(None) => {
                tracing::info!(order_id, "No order found");
                ok(json!({}))
            }
            Err(err) => {
                tracing::error!("Failed to get order: {err}");
                message(500, err)
            }
        }
    }

    /// Every order and offer in the user's partition, ordered by expiry.
    pub async fn get_orders(&self, user_id: Option<&str>) -> ApiResponse {
        let Some(user_id) = present(user_id) else {
            return message(400, "Missing userId in path of URL");
        };

        let query: IndexQuery = IndexQuery::new(self.index_name.as_str(), user_id);

        match self.store.query(query).await {
            Ok(orders) => {
                tracing::info!("Found {} orders for user", orders.len());
                ok(json!(orders))
            }
            Err(err) => {
                tracing::error!("Failed to query orders: {err}");
                message(500, err)
            }
        }
    }
}
