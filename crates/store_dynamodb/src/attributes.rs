use aws_sdk_dynamodb::types::AttributeValue;
use model::ExpiryPatch;
use std::collections::HashMap;

pub(crate) const ORDER_ID: &str = "orderId";
pub(crate) const TTL: &str = "TTL";
pub(crate) const EXPIRED: &str = "expired";
pub(crate) const WARRANTY_EXPIRY: &str = "warrantyExpiry";
pub(crate) const SORT_KEY: &str = "sk";

/// Attribute names are substituted so reserved words such as `TTL` are safe.
/// Applied to a missing key this creates a record holding only these attributes.
pub(crate) const RENEWAL_UPDATE: &str =
    "SET #expired = :expired, #ttl = :ttl, #warrantyExpiry = :warrantyExpiry, #sk = :sk";

pub(crate) fn order_key(order_id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([(ORDER_ID.to_string(), AttributeValue::S(order_id.to_string()))])
}

pub(crate) fn patch_names() -> HashMap<String, String> {
    [
        ("#expired", EXPIRED),
        ("#ttl", TTL),
        ("#warrantyExpiry", WARRANTY_EXPIRY),
        ("#sk", SORT_KEY),
    ]
    .into_iter()
    .map(|(placeholder, name)| (placeholder.to_string(), name.to_string()))
    .collect()
}

pub(crate) fn patch_values(patch: &ExpiryPatch) -> HashMap<String, AttributeValue> {
    let expired: AttributeValue = match patch.expired {
        Some(expired) => AttributeValue::Bool(expired),
        // Cleared flags are written as an explicit null
        None => AttributeValue::Null(true),
    };

    HashMap::from([
        (":expired".to_string(), expired),
        (":ttl".to_string(), AttributeValue::N(patch.ttl.to_string())),
        (
            ":warrantyExpiry".to_string(),
            AttributeValue::N(patch.warranty_expiry.to_string()),
        ),
        (":sk".to_string(), AttributeValue::S(patch.sk.clone())),
    ])
}
