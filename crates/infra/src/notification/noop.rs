//! Noop 配信実装
//!
//! 実際には送信せず、ログ出力のみ行う。
//! ローカル開発や通知無効化時に使用する。

use async_trait::async_trait;
use notify_relay_domain::notification::{
    EmailMessage,
    NotificationError,
    ProviderAck,
    SmsMessage,
};

use super::{EmailChannel, SmsChannel};

const NOOP_MESSAGE_ID: &str = "noop";

/// Noop SMS 配信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopSmsChannel;

#[async_trait]
impl SmsChannel for NoopSmsChannel {
    async fn send_sms(&self, sms: &SmsMessage) -> Result<ProviderAck, NotificationError> {
        tracing::info!(destination = %sms.destination, "Noop: SMS 送信をスキップ");
        Ok(ProviderAck::new(NOOP_MESSAGE_ID))
    }

    async fn publish_to_topic(
        &self,
        topic_arn: &str,
        _message: &str,
    ) -> Result<ProviderAck, NotificationError> {
        tracing::info!(topic_arn, "Noop: トピック公開をスキップ");
        Ok(ProviderAck::new(NOOP_MESSAGE_ID))
    }
}

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopEmailChannel;

#[async_trait]
impl EmailChannel for NoopEmailChannel {
    async fn send_email(&self, email: &EmailMessage) -> Result<ProviderAck, NotificationError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(ProviderAck::new(NOOP_MESSAGE_ID))
    }
}
