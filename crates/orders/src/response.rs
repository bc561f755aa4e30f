use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Response in the shape API Gateway expects from a proxy integration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// The parsed `data` member of the body.
    pub fn data(&self) -> Value {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|mut body| body.get_mut("data").map(Value::take))
            .unwrap_or(Value::Null)
    }
}

/// Wrap `data` as `{"data": ...}` with permissive CORS headers.
/// Headers passed by the caller override the defaults.
pub fn format_json_response(
    status_code: u16,
    data: Value,
    headers: Option<BTreeMap<String, String>>,
) -> ApiResponse {
    let mut merged: BTreeMap<String, String> = BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        // Allows cookies on cross-origin requests
        ("Access-Control-Allow-Credentials".to_string(), "true".to_string()),
    ]);
    merged.extend(headers.unwrap_or_default());

    ApiResponse {
        status_code,
        headers: merged,
        body: json!({ "data": data }).to_string(),
    }
}

pub(crate) fn ok(data: Value) -> ApiResponse {
    format_json_response(200, data, None)
}

/// `{"data": {"message": ...}}` with the given status.
pub(crate) fn message(status_code: u16, message: impl Display) -> ApiResponse {
    format_json_response(status_code, json!({ "message": message.to_string() }), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_payload_under_data() {
        let response: ApiResponse = format_json_response(200, json!({ "orderId": "1" }), None);

        assert_eq!(200, response.status_code);
        assert_eq!(r#"{"data":{"orderId":"1"}}"#, response.body);
        assert_eq!(json!({ "orderId": "1" }), response.data());
    }

    #[test]
    fn sets_cors_headers() {
        let response: ApiResponse = ok(json!({}));

        assert_eq!("*", response.headers["Access-Control-Allow-Origin"]);
        assert_eq!("true", response.headers["Access-Control-Allow-Credentials"]);
    }

    #[test]
    fn caller_headers_override_defaults() {
        let headers: BTreeMap<String, String> = BTreeMap::from([
            ("Access-Control-Allow-Origin".to_string(), "https://orders.example.com".to_string()),
            ("Cache-Control".to_string(), "no-store".to_string()),
        ]);

        let response: ApiResponse = format_json_response(404, json!({}), Some(headers));

        assert_eq!(404, response.status_code);
        assert_eq!(
            "https://orders.example.com",
            response.headers["Access-Control-Allow-Origin"]
        );
        assert_eq!("no-store", response.headers["Cache-Control"]);
        assert_eq!("true", response.headers["Access-Control-Allow-Credentials"]);
    }

    #[test]
    fn serializes_status_code_in_camel_case() {
        let value: Value = serde_json::to_value(message(400, "bad")).unwrap();

        assert_eq!(400, value["statusCode"]);
        assert_eq!(r#"{"data":{"message":"bad"}}"#, value["body"]);
    }
}
