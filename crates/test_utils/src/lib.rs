use async_trait::async_trait;
use aws_lambda_events::dynamodb::Event;
use chrono::{DateTime, TimeZone, Utc};
use model::{Channel, Clock, Expiry, ExpiryPatch, Order};
use notify::{DeliveryError, EmailMessage, EmailSender, SmsMessage, SmsSender};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use store::StoreErrorReason::BackendFailure;
use store::StoreOperation::{Get, Query, Update, Write};
use store::{IndexQuery, OrderStore, StoreError};

/// Test table values
pub const TEST_TABLE: &str = "orders";
pub const TEST_INDEX: &str = "index1";
pub const TEST_BASE_URL: &str = "https://api.orders.example.com";

/// 2026-10-19T12:00:00Z, the instant every fixed clock reports.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
        .single()
        .expect("Fixed instant should be valid")
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        FixedClock(fixed_now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// An active order expiring two years after `fixed_now()`.
pub fn order_with_contacts(
    order_id: &str,
    email: Option<&str>,
    phone_number: Option<&str>,
) -> Order {
    let expiry: Expiry = Expiry::warranty_from(fixed_now());

    Order {
        order_id: order_id.to_string(),
        company_name: "Acme".to_string(),
        car_name: "X1".to_string(),
        email: email.map(str::to_string),
        phone_number: phone_number.map(str::to_string),
        pk: email.or(phone_number).unwrap_or_default().to_string(),
        sk: expiry.sort_key(),
        ttl: expiry.ttl(),
        warranty_expiry: expiry.warranty_expiry(),
        expired: None,
    }
}

/// An order in `user`'s partition with an explicit sort key.
pub fn order_for_user(order_id: &str, user: &str, sk: &str) -> Order {
    Order {
        sk: sk.to_string(),
        ..order_with_contacts(order_id, Some(user), None)
    }
}

/// Records every message instead of sending it.
#[derive(Default, Clone)]
pub struct RecordingSender {
    emails: Arc<Mutex<Vec<EmailMessage>>>,
    sms: Arc<Mutex<Vec<SmsMessage>>>,
}

impl RecordingSender {
    pub fn emails(&self) -> Vec<EmailMessage> {
        self.emails.lock().unwrap().clone()
    }

    pub fn sms(&self) -> Vec<SmsMessage> {
        self.sms.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send_email(&self, message: EmailMessage) -> Result<(), DeliveryError> {
        self.emails.lock().unwrap().push(message);
        Ok(())
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send_sms(&self, message: SmsMessage) -> Result<(), DeliveryError> {
        self.sms.lock().unwrap().push(message);
        Ok(())
    }
}

/// A transport which rejects every message.
#[derive(Default, Clone, Copy)]
pub struct FailingSender;

pub const DELIVERY_FAILURE: &str = "transport unavailable";

#[async_trait]
impl EmailSender for FailingSender {
    async fn send_email(&self, message: EmailMessage) -> Result<(), DeliveryError> {
        Err(DeliveryError::new(Channel::Email, message.to, DELIVERY_FAILURE))
    }
}

#[async_trait]
impl SmsSender for FailingSender {
    async fn send_sms(&self, message: SmsMessage) -> Result<(), DeliveryError> {
        Err(DeliveryError::new(Channel::Sms, message.phone_number, DELIVERY_FAILURE))
    }
}

/// A table whose every operation fails with a backend error.
#[derive(Default, Clone, Copy)]
pub struct FailingOrderStore;

pub const STORE_FAILURE: &str = "table unavailable";

#[async_trait]
impl OrderStore for FailingOrderStore {
    async fn write(&self, order: Order) -> Result<Order, StoreError> {
        Err(StoreError::new(order.order_id, Write, BackendFailure(STORE_FAILURE.into())))
    }

    async fn update(&self, order_id: &str, _: ExpiryPatch) -> Result<ExpiryPatch, StoreError> {
        Err(StoreError::new(order_id, Update, BackendFailure(STORE_FAILURE.into())))
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Err(StoreError::new(order_id, Get, BackendFailure(STORE_FAILURE.into())))
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<Order>, StoreError> {
        Err(StoreError::new(query.pk_value, Query, BackendFailure(STORE_FAILURE.into())))
    }
}

/// A DynamoDB stream record, in the JSON shape Lambda delivers.
pub fn stream_record(event_name: &str, sequence_number: &str, old_image: &Order) -> Value {
    let image: serde_dynamo::Item =
        serde_dynamo::to_item(old_image).expect("Order should convert to an item");

    json!({
        "eventID": format!("event-{sequence_number}"),
        "eventName": event_name,
        "eventVersion": "1.1",
        "eventSource": "aws:dynamodb",
        "awsRegion": "us-east-1",
        "eventSourceARN": "arn:aws:dynamodb:us-east-1:123456789012:table/orders/stream/2026-10-19T00:00:00.000",
        "dynamodb": {
            "ApproximateCreationDateTime": 1792411200,
            "Keys": { "orderId": { "S": old_image.order_id } },
            "OldImage": image,
            "SequenceNumber": sequence_number,
            "SizeBytes": 256,
            "StreamViewType": "OLD_IMAGE"
        }
    })
}

/// Wrap stream records into a stream event.
pub fn stream_event(records: Vec<Value>) -> Event {
    serde_json::from_value(json!({ "Records": records }))
        .expect("Stream event should deserialize")
}

/// A stream event of TTL removals, one per image.
pub fn removal_event(images: &[&Order]) -> Event {
    let records: Vec<Value> = images
        .iter()
        .enumerate()
        .map(|(index, image)| stream_record("REMOVE", &format!("{}", 100 + index), image))
        .collect();

    stream_event(records)
}
