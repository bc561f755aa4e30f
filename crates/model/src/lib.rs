use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod env;
pub mod expiry;

pub use expiry::{Expiry, ExpiryPatch};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A warranty record. Active orders and renewal offers share this shape;
/// offers carry `expired = Some(true)`.
///
/// Renewing an id with no stored record leaves only the key and expiry
/// attributes, so the descriptive fields default to empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub car_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    // Index keys: contact identifier and expiry instant
    #[serde(default)]
    pub pk: String,
    pub sk: String,

    #[serde(rename = "TTL")]
    pub ttl: i64,
    pub warranty_expiry: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

impl Order {
    /// A renewal offer for `source`, reachable only through `contact`.
    pub fn renewal_offer(source: &Order, contact: &Contact, expiry: &Expiry) -> Order {
        let (email, phone_number) = match contact {
            Contact::Email(email) => (Some(email.clone()), None),
            Contact::Phone(phone_number) => (None, Some(phone_number.clone())),
        };

        Order {
            order_id: new_order_id(),
            company_name: source.company_name.clone(),
            car_name: source.car_name.clone(),
            email,
            phone_number,
            pk: contact.address().to_string(),
            sk: expiry.sort_key(),
            ttl: expiry.ttl(),
            warranty_expiry: expiry.warranty_expiry(),
            expired: Some(true),
        }
    }

    /// The record left by renewing `order_id` when nothing was stored under it.
    pub fn from_patch(order_id: &str, patch: &ExpiryPatch) -> Order {
        let mut order: Order = Order {
            order_id: order_id.to_string(),
            company_name: String::new(),
            car_name: String::new(),
            email: None,
            phone_number: None,
            pk: String::new(),
            sk: String::new(),
            ttl: 0,
            warranty_expiry: 0,
            expired: None,
        };
        order.apply(patch);
        order
    }

    pub fn is_expired_offer(&self) -> bool {
        self.expired == Some(true)
    }

    /// Every contact channel present on the record, email first.
    pub fn contacts(&self) -> Vec<Contact> {
        let email = non_empty(&self.email).map(|email| Contact::Email(email.to_string()));
        let phone = non_empty(&self.phone_number).map(|phone| Contact::Phone(phone.to_string()));

        email.into_iter().chain(phone).collect()
    }

    pub fn apply(&mut self, patch: &ExpiryPatch) {
        self.ttl = patch.ttl;
        self.expired = patch.expired;
        self.warranty_expiry = patch.warranty_expiry;
        self.sk = patch.sk.clone();
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Generate a fresh order identifier.
pub fn new_order_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A way of reaching a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Email(String),
    Phone(String),
}

impl Contact {
    pub fn address(&self) -> &str {
        match self {
            Contact::Email(email) => email,
            Contact::Phone(phone_number) => phone_number,
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Contact::Email(_) => Channel::Email,
            Contact::Phone(_) => Channel::Sms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
        }
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order(email: Option<&str>, phone_number: Option<&str>) -> Order {
        Order {
            order_id: "order-1".to_string(),
            company_name: "Acme".to_string(),
            car_name: "X1".to_string(),
            email: email.map(str::to_string),
            phone_number: phone_number.map(str::to_string),
            pk: email.or(phone_number).unwrap_or_default().to_string(),
            sk: "2026-01-01T00:00:00.000Z".to_string(),
            ttl: 1_767_225_600,
            warranty_expiry: 1_767_225_600_000,
            expired: None,
        }
    }

    #[test]
    fn contacts_lists_email_before_phone() {
        let contacts: Vec<Contact> = order(Some("a@b.com"), Some("+441234")).contacts();

        assert_eq!(
            vec![
                Contact::Email("a@b.com".to_string()),
                Contact::Phone("+441234".to_string())
            ],
            contacts
        );
    }

    #[test]
    fn contacts_ignores_empty_values() {
        let contacts: Vec<Contact> = order(Some(""), Some("+441234")).contacts();

        assert_eq!(vec![Contact::Phone("+441234".to_string())], contacts);
    }

    #[test]
    fn renewal_offer_uses_single_contact() {
        let source: Order = order(Some("a@b.com"), Some("+441234"));
        let now: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let expiry: Expiry = Expiry::offer_from(now);

        let offer: Order =
            Order::renewal_offer(&source, &Contact::Phone("+441234".to_string()), &expiry);

        assert_ne!(source.order_id, offer.order_id);
        assert_eq!("+441234", offer.pk);
        assert_eq!(None, offer.email);
        assert_eq!(Some("+441234".to_string()), offer.phone_number);
        assert_eq!("2026-01-31T00:00:00.000Z", offer.sk);
        assert!(offer.is_expired_offer());
    }

    #[test]
    fn order_serializes_with_table_attribute_names() {
        let value = serde_json::to_value(order(Some("a@b.com"), None)).unwrap();

        assert_eq!("order-1", value["orderId"]);
        assert_eq!("Acme", value["companyName"]);
        assert_eq!(1_767_225_600, value["TTL"]);
        assert_eq!(1_767_225_600_000i64, value["warrantyExpiry"]);
        assert!(value.get("phoneNumber").is_none());
        assert!(value.get("expired").is_none());
    }

    #[test]
    fn renewed_record_without_order_fields_still_reads() {
        let value = serde_json::json!({
            "orderId": "order-1",
            "sk": "2028-10-19T12:00:00.000Z",
            "TTL": 1_855_483_200,
            "warrantyExpiry": 1_855_483_200_000i64,
            "expired": null
        });

        let order: Order = serde_json::from_value(value).unwrap();

        assert_eq!("order-1", order.order_id);
        assert_eq!("", order.company_name);
        assert_eq!("", order.pk);
        assert_eq!(None, order.expired);
        assert!(order.contacts().is_empty());
    }

    #[test]
    fn from_patch_holds_only_expiry_fields() {
        let now: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let patch: ExpiryPatch = ExpiryPatch::renewal(&Expiry::warranty_from(now));

        let order: Order = Order::from_patch("order-1", &patch);

        assert_eq!("order-1", order.order_id);
        assert_eq!(patch.sk, order.sk);
        assert_eq!(patch.ttl, order.ttl);
        assert_eq!(patch.warranty_expiry, order.warranty_expiry);
        assert_eq!(None, order.expired);
        assert!(order.email.is_none() && order.phone_number.is_none());
    }
}
