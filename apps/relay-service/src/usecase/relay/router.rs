//! # 配送ルーター
//!
//! 宛先種別に応じてレンダリング済みメッセージを配信チャネルへ振り分ける。
//!
//! | 宛先種別 | 一次配送 | 二次配信 |
//! |---------|---------|---------|
//! | 電話番号 | [`SmsChannel::send_sms`] | トピック設定時のみ [`SmsChannel::publish_to_topic`] |
//! | メール | [`EmailChannel::send_email`] | なし |
//!
//! 再試行はしない。失敗は `NotificationError::SendFailed` としてそのまま返す。

use std::sync::Arc;

use notify_relay_domain::{
    RecipientKind,
    delivery::SecondaryOutcome,
    notification::{
        DeliveryChannel,
        EmailMessage,
        NotificationError,
        ProviderAck,
        RenderedMessage,
        SmsMessage,
    },
};
use notify_relay_infra::{EmailChannel, SmsChannel};

use super::TemplateRenderer;

/// 一次配送の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: DeliveryChannel,
    pub ack:     ProviderAck,
}

/// 配送ルーター
pub struct DeliveryRouter {
    sms:          Arc<dyn SmsChannel>,
    email:        Arc<dyn EmailChannel>,
    renderer:     Arc<TemplateRenderer>,
    from_address: String,
    topic_arn:    Option<String>,
}

impl DeliveryRouter {
    pub fn new(
        sms: Arc<dyn SmsChannel>,
        email: Arc<dyn EmailChannel>,
        renderer: Arc<TemplateRenderer>,
        from_address: String,
        topic_arn: Option<String>,
    ) -> Self {
        Self {
            sms,
            email,
            renderer,
            from_address,
            topic_arn,
        }
    }

    /// 一次配送を行う
    ///
    /// 1 回の呼び出しで使うチャネルは 1 つだけ。
    pub async fn deliver(
        &self,
        kind: RecipientKind,
        rendered: &RenderedMessage,
        recipient: &str,
    ) -> Result<Delivery, NotificationError> {
        match kind {
            RecipientKind::Phone => {
                let sms = SmsMessage {
                    destination: recipient.to_string(),
                    message:     rendered.body.clone(),
                };
                let ack = self.sms.send_sms(&sms).await?;
                Ok(Delivery {
                    channel: DeliveryChannel::Sms,
                    ack,
                })
            }
            RecipientKind::Email => {
                let email = EmailMessage {
                    from:      self.from_address.clone(),
                    to:        recipient.to_string(),
                    subject:   rendered.subject.clone().unwrap_or_default(),
                    html_body: self.renderer.email_html(rendered)?,
                    text_body: rendered.body.clone(),
                };
                let ack = self.email.send_email(&email).await?;
                Ok(Delivery {
                    channel: DeliveryChannel::Email,
                    ack,
                })
            }
        }
    }

    /// 一次配送が成功した後の二次配信を行う
    ///
    /// 電話番号宛てでトピックが設定されている場合のみ公開する。
    /// 失敗しても `Err` にはせず、[`SecondaryOutcome::Failed`] として返す。
    pub async fn broadcast(
        &self,
        kind: RecipientKind,
        rendered: &RenderedMessage,
    ) -> Option<SecondaryOutcome> {
        let topic_arn = match (kind, &self.topic_arn) {
            (RecipientKind::Phone, Some(topic_arn)) => topic_arn,
            _ => return None,
        };

        let outcome = match self.sms.publish_to_topic(topic_arn, &rendered.body).await {
            Ok(ack) => SecondaryOutcome::Published(ack),
            Err(e) => SecondaryOutcome::Failed(e.detail().to_string()),
        };
        Some(outcome)
    }
}
