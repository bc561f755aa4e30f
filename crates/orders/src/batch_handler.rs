use crate::notifier::{BatchReport, ExpiredRecord, ExpiryNotifier};
use aws_lambda_events::dynamodb::{Event, EventRecord};
use aws_lambda_events::streams::{DynamoDbBatchItemFailure, DynamoDbEventResponse};
use lambda_runtime::{tracing, Error, LambdaEvent};

/// Stream event name for items removed from the table, including TTL expiry.
pub const REMOVE: &str = "REMOVE";

/// Handle a batch of DynamoDB stream records, notifying on every removal.
///
/// Failed records are reported back as batch item failures so only they are
/// retried. The event source mapping must have `ReportBatchItemFailures` set.
pub async fn handle_stream_batch(
    notifier: &ExpiryNotifier,
    event: LambdaEvent<Event>,
) -> Result<DynamoDbEventResponse, Error> {
    let records: Vec<EventRecord> = event.payload.records;

    tracing::info!("Handling batch of [{}] from DynamoDB stream", records.len());

    let expired: Vec<ExpiredRecord> = records
        .into_iter()
        .filter(|record| record.event_name == REMOVE)
        .map(expired_record)
        .collect::<Result<_, Error>>()?;

    let report: BatchReport = notifier.notify_batch(expired).await;

    tracing::info!(
        "Notified {}, skipped {}, failed {}",
        report.notified,
        report.skipped,
        report.failures.len()
    );

    Ok(DynamoDbEventResponse {
        batch_item_failures: collect_batch_failures(&report),
    })
}

/// Streams only accept a sequence number as a batch item failure, so a record
/// without one fails the whole batch.
fn expired_record(record: EventRecord) -> Result<ExpiredRecord, Error> {
    let Some(record_id) = record.change.sequence_number else {
        return Err(format!("Stream record {} has no sequence number", record.event_id).into());
    };

    Ok(ExpiredRecord {
        record_id,
        image: record.change.old_image,
    })
}

fn collect_batch_failures(report: &BatchReport) -> Vec<DynamoDbBatchItemFailure> {
    for failure in &report.failures {
        tracing::error!(
            "Failed to process record {}, {}",
            failure.record_id,
            failure.reason
        );
    }

    report
        .failed_record_ids()
        .into_iter()
        .map(|id| DynamoDbBatchItemFailure {
            item_identifier: Some(id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OrderApi;
    use crate::response::ApiResponse;
    use chrono::{DateTime, Duration, Utc};
    use lambda_runtime::Context;
    use model::Order;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use store_in_memory::InMemoryOrderStore;
    use test_utils::{
        fixed_now, order_with_contacts, removal_event, stream_event, stream_record,
        FailingSender, FixedClock, RecordingSender, TEST_BASE_URL, TEST_INDEX,
    };

    fn notifier(store: &InMemoryOrderStore, sender: &RecordingSender) -> ExpiryNotifier {
        ExpiryNotifier::new(
            Arc::new(store.clone()),
            Arc::new(sender.clone()),
            Arc::new(sender.clone()),
            Arc::new(FixedClock::default()),
            TEST_BASE_URL,
        )
    }

    #[tokio::test]
    async fn only_removals_are_notified() {
        let store: InMemoryOrderStore = InMemoryOrderStore::default();
        let sender: RecordingSender = RecordingSender::default();
        let order: Order = order_with_contacts("order-1", Some("a@b.com"), None);

        let event: Event = stream_event(vec![
            stream_record("INSERT", "1", &order),
            stream_record("MODIFY", "2", &order),
            stream_record(REMOVE, "3", &order),
        ]);

        let response: DynamoDbEventResponse = handle_stream_batch(
            &notifier(&store, &sender),
            LambdaEvent::new(event, Context::default()),
        )
        .await
        .unwrap();

        assert!(response.batch_item_failures.is_empty());
        assert_eq!(1, sender.emails().len());
        assert_eq!(1, store.orders().len());
    }

    #[tokio::test]
    async fn failed_records_are_reported_by_sequence_number() {
        let notifier: ExpiryNotifier = ExpiryNotifier::new(
            Arc::new(InMemoryOrderStore::default()),
            Arc::new(FailingSender),
            Arc::new(FailingSender),
            Arc::new(FixedClock::default()),
            TEST_BASE_URL,
        );
        let first: Order = order_with_contacts("order-1", Some("a@b.com"), Some("+447700900000"));
        let mut offer: Order = order_with_contacts("offer-1", Some("c@d.com"), None);
        offer.expired = Some(true);

        let event: Event = removal_event(&[&first, &offer]);

        let response: DynamoDbEventResponse =
            handle_stream_batch(&notifier, LambdaEvent::new(event, Context::default()))
                .await
                .unwrap();

        // Both branches of the first record failed but it is reported once
        let ids: Vec<Option<String>> = response
            .batch_item_failures
            .into_iter()
            .map(|failure| failure.item_identifier)
            .collect();
        assert_eq!(vec![Some("100".to_string())], ids);
    }

    #[tokio::test]
    async fn record_without_sequence_number_fails_the_batch() {
        let store: InMemoryOrderStore = InMemoryOrderStore::default();
        let sender: RecordingSender = RecordingSender::default();
        let order: Order = order_with_contacts("order-1", Some("a@b.com"), None);

        let mut unsequenced: Value = stream_record(REMOVE, "101", &order);
        unsequenced["dynamodb"]
            .as_object_mut()
            .unwrap()
            .remove("SequenceNumber");
        let event: Event = stream_event(vec![stream_record(REMOVE, "100", &order), unsequenced]);

        let result = handle_stream_batch(
            &notifier(&store, &sender),
            LambdaEvent::new(event, Context::default()),
        )
        .await;

        let err: Error = result.expect_err("Batch should fail");
        assert_eq!("Stream record event-101 has no sequence number", err.to_string());
        // Nothing is sent before the whole batch is retried
        assert!(sender.emails().is_empty());
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn expired_warranty_can_be_renewed_from_the_offer() {
        let store: InMemoryOrderStore = InMemoryOrderStore::default();
        let sender: RecordingSender = RecordingSender::default();

        // Place an order, then let its warranty lapse
        let api: OrderApi = OrderApi::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock::default()),
            TEST_INDEX,
        );
        let created: ApiResponse = api
            .create_order(Some(
                &json!({ "companyName": "Acme", "carName": "X1", "email": "a@b.com" }).to_string(),
            ))
            .await;
        let order_id: String = created.data()["orderId"].as_str().unwrap().to_string();
        let lapsed: Order = store.orders()[0].clone();

        // TTL removes the order before the stream delivers it
        let store: InMemoryOrderStore = InMemoryOrderStore::default();

        let response: DynamoDbEventResponse = handle_stream_batch(
            &notifier(&store, &sender),
            LambdaEvent::new(removal_event(&[&lapsed]), Context::default()),
        )
        .await
        .unwrap();
        assert!(response.batch_item_failures.is_empty());

        let emails = sender.emails();
        assert_eq!(1, emails.len());
        let offers: Vec<Order> = store.orders();
        assert_eq!(1, offers.len());
        assert!(emails[0].body.contains(&format!("order {order_id}")));
        assert!(emails[0]
            .body
            .contains(&format!("/renew?orderId={}", offers[0].order_id)));

        // Redeem the original order id two years on
        let renewed_at: DateTime<Utc> = fixed_now() + Duration::days(731);
        let api: OrderApi = OrderApi::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock(renewed_at)),
            TEST_INDEX,
        );
        let renewed: ApiResponse = api.renew_order(Some(&order_id)).await;
        assert_eq!(200, renewed.status_code);

        let found: Value = api.get_order(Some(&order_id)).await.data();
        let expected_expiry: DateTime<Utc> = renewed_at + Duration::days(730);

        assert_eq!(json!(order_id), found["orderId"]);
        assert!(found.get("expired").is_none());
        assert_eq!(json!(expected_expiry.timestamp_millis()), found["warrantyExpiry"]);
        assert_eq!(json!(expected_expiry.timestamp()), found["TTL"]);
    }
}
