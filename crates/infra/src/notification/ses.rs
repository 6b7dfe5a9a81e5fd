//! SES メール送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。本番環境で使用する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::DisplayErrorContext,
    types::{Body, Content, Destination, EmailContent, Message},
};
use notify_relay_domain::notification::{EmailMessage, NotificationError, ProviderAck};

use super::EmailChannel;

/// SES メール送信
///
/// 送信元アドレスは [`EmailMessage::from`] を使う。SES で検証済みであること。
pub struct SesEmailChannel {
    client: Client,
}

impl SesEmailChannel {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn content(data: &str, part: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| NotificationError::SendFailed(format!("{part}の構築に失敗: {e}")))
}

#[async_trait]
impl EmailChannel for SesEmailChannel {
    async fn send_email(&self, email: &EmailMessage) -> Result<ProviderAck, NotificationError> {
        let destination = Destination::builder().to_addresses(&email.to).build();

        let message = Message::builder()
            .subject(content(&email.subject, "件名")?)
            .body(
                Body::builder()
                    .html(content(&email.html_body, "HTML 本文")?)
                    .text(content(&email.text_body, "テキスト本文")?)
                    .build(),
            )
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(ProviderAck::new(output.message_id().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesEmailChannel>();
    }

    #[test]
    fn test_contentは本文を保持する() {
        let built = content("Message: hi", "件名").unwrap();
        assert_eq!(built.data(), "Message: hi");
    }
}
