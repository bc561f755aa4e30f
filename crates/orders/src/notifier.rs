use futures::{stream, StreamExt};
use lambda_runtime::tracing;
use lambda_runtime::tracing::{Instrument, Span};
use model::{Channel, Clock, Contact, Expiry, Order};
use notify::{DeliveryError, EmailMessage, EmailSender, SmsMessage, SmsSender};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use store::{OrderStore, StoreError};

/// The prior image of a record removed from the table.
#[derive(Debug, Clone)]
pub struct ExpiredRecord {
    // Identifies the record when reporting failures back to the stream
    pub record_id: String,
    pub image: serde_dynamo::Item,
}

/// Turns lapsed warranties into renewal offers and tells the customer.
pub struct ExpiryNotifier {
    store: Arc<dyn OrderStore>,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
    clock: Arc<dyn Clock>,
    base_url: String,
    concurrency: usize,
}

impl ExpiryNotifier {
    pub fn new(
        store: Arc<dyn OrderStore>,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        ExpiryNotifier {
            store,
            email,
            sms,
            clock,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            concurrency: model::env::DEFAULT_NOTIFY_CONCURRENCY,
        }
    }

    /// Limit how many offers are created and sent at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Notify every contact of every lapsed order in the batch.
    ///
    /// Each contact is handled independently; all are awaited and every
    /// failure is reported rather than the first one.
    pub async fn notify_batch(&self, records: Vec<ExpiredRecord>) -> BatchReport {
        let mut report: BatchReport = BatchReport::default();
        let mut branches: Vec<(String, Arc<Order>, Contact)> = Vec::new();

        for record in records {
            let order: Order = match serde_dynamo::from_item(record.image) {
                Ok(order) => order,
                // Retrying cannot fix the image, so it is not reported as a failure
                Err(err) => {
                    tracing::error!("Skipping unreadable record {}: {err}", record.record_id);
                    report.skipped += 1;
                    continue;
                }
            };

            let contacts: Vec<Contact> = order.contacts();
            if order.is_expired_offer() || contacts.is_empty() {
                tracing::debug!(order_id = %order.order_id, "Skipping record");
                report.skipped += 1;
                continue;
            }

            let order: Arc<Order> = Arc::new(order);
            for contact in contacts {
                branches.push((record.record_id.clone(), order.clone(), contact));
            }
        }

        tracing::info!(
            "Sending {} renewal offers, {} records skipped",
            branches.len(),
            report.skipped
        );

        let outcomes: Vec<(String, Channel, Result<Order, NotificationError>)> =
            stream::iter(branches)
                .map(|(record_id, order, contact)| {
                    let span: Span = tracing::span!(
                        tracing::Level::INFO,
                        "Expired order",
                        record_id,
                        order_id = order.order_id.as_str(),
                        channel = %contact.channel()
                    );

                    async move {
                        let result = self.offer_renewal(&order, &contact).await;
                        (record_id, contact.channel(), result)
                    }
                    .instrument(span)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        for (record_id, channel, result) in outcomes {
            match result {
                Ok(offer) => {
                    tracing::info!(offer_id = %offer.order_id, "Sent renewal offer by {channel}");
                    report.notified += 1;
                }
                Err(err) => {
                    tracing::error!("Failed to notify record {record_id} by {channel}: {err}");
                    report.failures.push(NotificationFailure {
                        record_id,
                        channel,
                        reason: err.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Store an offer for `contact` and send it the renewal link.
    async fn offer_renewal(&self, order: &Order, contact: &Contact) -> Result<Order, NotificationError> {
        let expiry: Expiry = Expiry::offer_from(self.clock.now());
        let offer: Order = self
            .store
            .write(Order::renewal_offer(order, contact, &expiry))
            .await?;

        let body: String = self.renewal_text(order, &offer, &expiry);

        match contact {
            Contact::Email(email) => {
                self.email
                    .send_email(EmailMessage {
                        to: email.clone(),
                        subject: format!("The warranty on your {} has expired", order.car_name),
                        body,
                    })
                    .await?
            }
            Contact::Phone(phone_number) => {
                self.sms
                    .send_sms(SmsMessage {
                        phone_number: phone_number.clone(),
                        body,
                    })
                    .await?
            }
        }

        Ok(offer)
    }

    fn renewal_text(&self, order: &Order, offer: &Order, expiry: &Expiry) -> String {
        format!(
            "The {} warranty on your {} (order {}) has expired. \
             You can renew it until {} at {}/renew?orderId={}",
            order.company_name,
            order.car_name,
            order.order_id,
            expiry.date_string(),
            self.base_url,
            offer.order_id
        )
    }
}

/// Outcome of one stream batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    // Offers created and sent
    pub notified: usize,
    // Records needing no notification, or whose image could not be read
    pub skipped: usize,
    pub failures: Vec<NotificationFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of records with at least one failure, in first-seen order.
    pub fn failed_record_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for failure in &self.failures {
            if !ids.contains(&failure.record_id) {
                ids.push(failure.record_id.clone());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFailure {
    pub record_id: String,
    pub channel: Channel,
    pub reason: String,
}

#[derive(Debug)]
pub enum NotificationError {
    Store(StoreError),
    Delivery(DeliveryError),
}

impl From<StoreError> for NotificationError {
    fn from(value: StoreError) -> Self {
        NotificationError::Store(value)
    }
}

impl From<DeliveryError> for NotificationError {
    fn from(value: DeliveryError) -> Self {
        NotificationError::Delivery(value)
    }
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationError::Store(err) => write!(f, "{err}"),
            NotificationError::Delivery(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for NotificationError {}
