//! SNS SMS 配信実装
//!
//! Amazon SNS の `Publish` API で SMS を送信する。
//! `phone_number` を指定すると直接送信、`topic_arn` を指定するとトピック公開になる。

use async_trait::async_trait;
use aws_sdk_sns::{Client, error::DisplayErrorContext};
use notify_relay_domain::notification::{NotificationError, ProviderAck, SmsMessage};

use super::SmsChannel;

/// SNS SMS 配信
pub struct SnsSmsChannel {
    client: Client,
}

impl SnsSmsChannel {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SmsChannel for SnsSmsChannel {
    async fn send_sms(&self, sms: &SmsMessage) -> Result<ProviderAck, NotificationError> {
        let output = self
            .client
            .publish()
            .phone_number(&sms.destination)
            .message(&sms.message)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(ProviderAck::new(output.message_id().unwrap_or_default()))
    }

    async fn publish_to_topic(
        &self,
        topic_arn: &str,
        message: &str,
    ) -> Result<ProviderAck, NotificationError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(ProviderAck::new(output.message_id().unwrap_or_default()))
    }
}
