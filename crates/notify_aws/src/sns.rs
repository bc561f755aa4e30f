use async_trait::async_trait;
use model::Channel;
use notify::{DeliveryError, SmsMessage, SmsSender};

pub struct SnsSmsSender {
    pub sns: aws_sdk_sns::Client,
}

impl SnsSmsSender {
    pub fn new(sns: aws_sdk_sns::Client) -> Self {
        Self { sns }
    }
}

#[async_trait]
impl SmsSender for SnsSmsSender {
    async fn send_sms(&self, message: SmsMessage) -> Result<(), DeliveryError> {
        self.sns
            .publish()
            .phone_number(message.phone_number.as_str())
            .message(message.body)
            .send()
            .await
            .map_err(|err| DeliveryError::new(Channel::Sms, message.phone_number.clone(), err))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sns::operation::publish::{PublishError, PublishOutput};
    use aws_sdk_sns::types::error::InvalidParameterException;
    use aws_smithy_mocks::{mock, mock_client, Rule};

    fn message() -> SmsMessage {
        SmsMessage {
            phone_number: "+447700900000".to_string(),
            body: "Renew here".to_string(),
        }
    }

    #[tokio::test]
    async fn publishes_directly_to_phone_number() {
        let publish_rule: Rule = mock!(aws_sdk_sns::Client::publish)
            .match_requests(|req| {
                req.phone_number() == Some("+447700900000") && req.message() == Some("Renew here")
            })
            .then_output(|| PublishOutput::builder().message_id("message-1").build());

        let sns: aws_sdk_sns::Client = mock_client!(aws_sdk_sns, [&publish_rule]);

        SnsSmsSender::new(sns)
            .send_sms(message())
            .await
            .expect("SMS should be sent");

        assert_eq!(1, publish_rule.num_calls());
    }

    #[tokio::test]
    async fn rejected_publish_is_delivery_error() {
        let publish_rule: Rule = mock!(aws_sdk_sns::Client::publish).then_error(|| {
            PublishError::InvalidParameterException(
                InvalidParameterException::builder()
                    .message("Invalid phone number")
                    .build(),
            )
        });

        let sns: aws_sdk_sns::Client = mock_client!(aws_sdk_sns, [&publish_rule]);

        let err: DeliveryError = SnsSmsSender::new(sns)
            .send_sms(message())
            .await
            .expect_err("SMS should fail");

        assert_eq!(Channel::Sms, err.channel);
        assert_eq!("+447700900000", err.recipient);
    }
}
