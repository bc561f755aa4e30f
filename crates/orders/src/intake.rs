use crate::api::{present, OrderApi, ValidationError};
use crate::response::{message, ok, ApiResponse};
use lambda_runtime::tracing;
use model::{new_order_id, Expiry, Order};
use serde::Deserialize;
use serde_json::json;

/// Body of a create order request. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub company_name: Option<String>,
    pub car_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// A request which passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    pub company_name: String,
    pub car_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl OrderRequest {
    /// An absent body parses as an empty request.
    pub fn parse(body: Option<&str>) -> Result<Self, ValidationError> {
        match body.map(str::trim).filter(|body| !body.is_empty()) {
            None => Ok(OrderRequest::default()),
            Some(body) => serde_json::from_str(body)
                .map_err(|err| ValidationError::new(format!("Malformed request body: {err}"))),
        }
    }

    /// Check required fields: a contact first, then companyName, then carName.
    pub fn validate(self) -> Result<ValidOrder, ValidationError> {
        let email: Option<String> = self.email.filter(|email| !email.is_empty());
        let phone_number: Option<String> = self.phone_number.filter(|phone| !phone.is_empty());

        if email.is_none() && phone_number.is_none() {
            return Err(ValidationError::new(
                "email or phoneNumber is required to make the order",
            ));
        }

        let company_name: &str = present(self.company_name.as_deref())
            .ok_or_else(|| ValidationError::new("companyName is missing to make the order"))?;
        let car_name: &str = present(self.car_name.as_deref())
            .ok_or_else(|| ValidationError::new("carName is missing to make the order"))?;

        Ok(ValidOrder {
            company_name: company_name.to_string(),
            car_name: car_name.to_string(),
            email,
            phone_number,
        })
    }
}

impl ValidOrder {
    /// The contact used as the partition key, preferring email.
    pub fn user_id(&self) -> &str {
        self.email
            .as_deref()
            .or(self.phone_number.as_deref())
            .unwrap_or_default()
    }
}

impl OrderApi {
    /// Validate and store a new order with a two year warranty.
    pub async fn create_order(&self, body: Option<&str>) -> ApiResponse {
        let request: ValidOrder = match OrderRequest::parse(body).and_then(OrderRequest::validate) {
            Ok(request) => request,
            Err(err) => {
                tracing::info!("Rejected order: {err}");
                return message(400, err);
            }
        };

        let expiry: Expiry = Expiry::warranty_from(self.clock.now());
        let order: Order = Order {
            order_id: new_order_id(),
            pk: request.user_id().to_string(),
            company_name: request.company_name,
            car_name: request.car_name,
            email: request.email,
            phone_number: request.phone_number,
            sk: expiry.sort_key(),
            ttl: expiry.ttl(),
            warranty_expiry: expiry.warranty_expiry(),
            expired: None,
        };

        tracing::info!(order_id = %order.order_id, "Creating order");

        match self.store.write(order).await {
            Ok(order) => ok(json!({
                "orderId": order.order_id,
                "message": format!(
                    "The order is being made and the warranty will expire on {}",
                    expiry.date_string()
                ),
            })),
            Err(err) => {
                tracing::error!("Failed to create order: {err}");
                message(502, err)
            }
        }
    }
}
