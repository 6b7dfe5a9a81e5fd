//! # 通知送信
//!
//! SMS とメールの配信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: チャネルごとに [`SmsChannel`] / [`EmailChannel`] で抽象化
//! - **実装の切替**: 環境変数（`RELAY_SMS_BACKEND` / `NOTIFICATION_BACKEND`）でランタイム選択
//!
//! | チャネル | 実装 | 用途 |
//! |---------|------|------|
//! | SMS | [`SnsSmsChannel`] | 本番（Amazon SNS） |
//! | SMS | [`NoopSmsChannel`] | ローカル開発・SMS 無効化 |
//! | メール | [`SesEmailChannel`] | 本番（Amazon SES v2） |
//! | メール | [`SmtpEmailChannel`] | ローカル開発（Mailpit） |
//! | メール | [`NoopEmailChannel`] | テスト・メール無効化 |

mod noop;
mod ses;
mod smtp;
mod sns;

use async_trait::async_trait;
pub use noop::{NoopEmailChannel, NoopSmsChannel};
use notify_relay_domain::notification::{
    EmailMessage,
    NotificationError,
    ProviderAck,
    SmsMessage,
};
pub use ses::SesEmailChannel;
pub use smtp::SmtpEmailChannel;
pub use sns::SnsSmsChannel;

/// SMS 配信トレイト
#[async_trait]
pub trait SmsChannel: Send + Sync {
    /// 電話番号へ SMS を直接送信する
    async fn send_sms(&self, sms: &SmsMessage) -> Result<ProviderAck, NotificationError>;

    /// トピックへメッセージを公開する（購読者全員へのブロードキャスト）
    async fn publish_to_topic(
        &self,
        topic_arn: &str,
        message: &str,
    ) -> Result<ProviderAck, NotificationError>;
}

/// メール送信トレイト
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<ProviderAck, NotificationError>;
}
