//! Lambda handlers for the API Gateway HTTP routes.
//!
//! Each handler only pulls its parameter out of the request; the rest is
//! left to [`OrderApi`].

use crate::api::OrderApi;
use crate::response::{message, ApiResponse};
use aws_lambda_events::apigw::ApiGatewayV2httpRequest;
use base64::Engine;
use lambda_runtime::{tracing, Error, LambdaEvent};

pub type HttpEvent = LambdaEvent<ApiGatewayV2httpRequest>;

/// `POST /`
pub async fn handle_create_order(api: &OrderApi, event: HttpEvent) -> Result<ApiResponse, Error> {
    tracing::info!("Handling create order request");

    let body: Option<String> = match request_body(event.payload) {
        Ok(body) => body,
        Err(err) => return Ok(message(400, format!("Malformed request body: {err}"))),
    };

    Ok(api.create_order(body.as_deref()).await)
}

/// API Gateway base64-encodes bodies it does not treat as text.
fn request_body(request: ApiGatewayV2httpRequest) -> Result<Option<String>, Error> {
    match request.body {
        Some(body) if request.is_base64_encoded => {
            let bytes: Vec<u8> = base64::engine::general_purpose::STANDARD.decode(body.trim())?;
            Ok(Some(String::from_utf8(bytes)?))
        }
        body => Ok(body),
    }
}

/// `GET /order/{orderId}`
pub async fn handle_get_order(api: &OrderApi, event: HttpEvent) -> Result<ApiResponse, Error> {
    let request: ApiGatewayV2httpRequest = event.payload;

    Ok(api
        .get_order(request.path_parameters.get("orderId").map(String::as_str))
        .await)
}

/// `GET /orders/{userId}`
pub async fn handle_get_orders(api: &OrderApi, event: HttpEvent) -> Result<ApiResponse, Error> {
    let request: ApiGatewayV2httpRequest = event.payload;

    Ok(api
        .get_orders(request.path_parameters.get("userId").map(String::as_str))
        .await)
}

/// `POST /renew?orderId=...`, the link sent with each renewal offer.
pub async fn handle_renew_order(api: &OrderApi, event: HttpEvent) -> Result<ApiResponse, Error> {
    let request: ApiGatewayV2httpRequest = event.payload;

    Ok(api
        .renew_order(request.query_string_parameters.first("orderId"))
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use std::collections::HashMap;
    use std::sync::Arc;
    use store::OrderStore;
    use store_in_memory::InMemoryOrderStore;
    use test_utils::{order_with_contacts, FixedClock, TEST_INDEX};

    fn event(request: ApiGatewayV2httpRequest) -> HttpEvent {
        LambdaEvent::new(request, Context::default())
    }

    fn with_path(name: &str, value: &str) -> ApiGatewayV2httpRequest {
        ApiGatewayV2httpRequest {
            path_parameters: HashMap::from([(name.to_string(), value.to_string())]),
            ..Default::default()
        }
    }

    async fn seeded_api() -> OrderApi {
        let store: InMemoryOrderStore = InMemoryOrderStore::default();
        store
            .write(order_with_contacts("order-1", Some("a@b.com"), None))
            .await
            .unwrap();

        OrderApi::new(Arc::new(store), Arc::new(FixedClock::default()), TEST_INDEX)
    }

    #[tokio::test]
    async fn create_order_reads_body() {
        let api: OrderApi = seeded_api().await;
        let request: ApiGatewayV2httpRequest = ApiGatewayV2httpRequest {
            body: Some(r#"{"companyName":"Acme","carName":"X1","phoneNumber":"+447700900000"}"#.to_string()),
            ..Default::default()
        };

        let response: ApiResponse = handle_create_order(&api, event(request)).await.unwrap();

        assert_eq!(200, response.status_code);
        assert_eq!("*", response.headers["Access-Control-Allow-Origin"]);
    }

    #[tokio::test]
    async fn create_order_decodes_base64_body() {
        let api: OrderApi = seeded_api().await;
        let body: &str = r#"{"companyName":"Acme","carName":"X1","email":"c@d.com"}"#;
        let request: ApiGatewayV2httpRequest = ApiGatewayV2httpRequest {
            body: Some(base64::engine::general_purpose::STANDARD.encode(body)),
            is_base64_encoded: true,
            ..Default::default()
        };

        let response: ApiResponse = handle_create_order(&api, event(request)).await.unwrap();

        assert_eq!(200, response.status_code);
    }

    #[tokio::test]
    async fn create_order_rejects_invalid_base64_body() {
        let api: OrderApi = seeded_api().await;
        let request: ApiGatewayV2httpRequest = ApiGatewayV2httpRequest {
            body: Some("not base64!".to_string()),
            is_base64_encoded: true,
            ..Default::default()
        };

        let response: ApiResponse = handle_create_order(&api, event(request)).await.unwrap();

        assert_eq!(400, response.status_code);
        assert!(response.data()["message"]
            .as_str()
            .unwrap()
            .starts_with("Malformed request body"));
    }

    #[tokio::test]
    async fn get_order_reads_path_parameter() {
        let api: OrderApi = seeded_api().await;

        let response: ApiResponse = handle_get_order(&api, event(with_path("orderId", "order-1")))
            .await
            .unwrap();

        assert_eq!(200, response.status_code);
        assert_eq!("order-1", response.data()["orderId"]);
    }

    #[tokio::test]
    async fn get_orders_reads_path_parameter() {
        let api: OrderApi = seeded_api().await;

        let response: ApiResponse = handle_get_orders(&api, event(with_path("userId", "a@b.com")))
            .await
            .unwrap();

        assert_eq!(200, response.status_code);
        assert_eq!(1, response.data().as_array().unwrap().len());
    }

    #[tokio::test]
    async fn missing_parameters_are_bad_requests() {
        let api: OrderApi = seeded_api().await;

        let get: ApiResponse = handle_get_order(&api, event(Default::default())).await.unwrap();
        let list: ApiResponse = handle_get_orders(&api, event(Default::default())).await.unwrap();
        let renew: ApiResponse = handle_renew_order(&api, event(Default::default())).await.unwrap();

        assert_eq!(400, get.status_code);
        assert_eq!(400, list.status_code);
        assert_eq!(400, renew.status_code);
    }
}
