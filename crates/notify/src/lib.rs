use async_trait::async_trait;
use model::{Channel, Error};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub phone_number: String,
    pub body: String,
}

/// Outbound email transport.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<(), DeliveryError>;
}

/// Outbound SMS transport.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, message: SmsMessage) -> Result<(), DeliveryError>;
}

/// A message could not be handed to its transport.
#[derive(Debug)]
pub struct DeliveryError {
    pub channel: Channel,
    pub recipient: String,
    pub reason: Error,
}

impl DeliveryError {
    pub fn new(channel: Channel, recipient: impl Into<String>, reason: impl Into<Error>) -> Self {
        DeliveryError {
            channel,
            recipient: recipient.into(),
            reason: reason.into(),
        }
    }
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to send {} to {}: {}",
            self.channel, self.recipient, self.reason
        )
    }
}

impl std::error::Error for DeliveryError {}
