use async_trait::async_trait;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use notify::{DeliveryError, EmailMessage, EmailSender};
use model::Channel;

const CHARSET: &str = "UTF-8";

pub struct SesEmailSender {
    pub ses: aws_sdk_sesv2::Client,
    // Verified SES identity messages are sent from
    pub sender: String,
}

impl SesEmailSender {
    pub fn new(ses: aws_sdk_sesv2::Client, sender: impl Into<String>) -> Self {
        Self {
            ses,
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl EmailSender for SesEmailSender {
    async fn send_email(&self, message: EmailMessage) -> Result<(), DeliveryError> {
        let recipient: String = message.to.clone();
        let failed = |err: aws_sdk_sesv2::error::BuildError| {
            DeliveryError::new(Channel::Email, recipient.clone(), err)
        };

        let subject: Content = Content::builder()
            .data(message.subject)
            .charset(CHARSET)
            .build()
            .map_err(failed)?;
        let text: Content = Content::builder()
            .data(message.body)
            .charset(CHARSET)
            .build()
            .map_err(failed)?;

        let content: EmailContent = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(subject)
                    .body(Body::builder().text(text).build())
                    .build(),
            )
            .build();

        self.ses
            .send_email()
            .from_email_address(self.sender.as_str())
            .destination(Destination::builder().to_addresses(message.to.as_str()).build())
            .content(content)
            .send()
            .await
            .map_err(|err| DeliveryError::new(Channel::Email, message.to.clone(), err))?;

        Ok(())
    }
}
