//! # 通知
//!
//! キューに積まれた通知ペイロードと、チャネルへ渡すメッセージを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`NotificationPayload`] | 通知ペイロード | `QueueRecord::raw_body` をデコードしたもの |
//! | [`RenderedMessage`] | レンダリング済みメッセージ | 宛先種別ごとの本文と件名 |
//! | [`SmsMessage`] / [`EmailMessage`] | チャネル送信メッセージ | 各チャネルにそのまま渡す値 |
//! | [`ProviderAck`] | プロバイダ受領 ID | 送信成功時にプロバイダが返すメッセージ ID |
//!
//! ## 設計方針
//!
//! - **デコード時に検証**: JSON オブジェクトでない本文や文字列でないフィールドは
//!   その場で [`NotificationError::DecodeFailed`] にする
//! - **旧フィールド名の受け入れ**: 旧プロデューサーが書く `phoneNumber` / `recipientEmail` /
//!   `message` / `emailContent` も読む。正規名と旧名が両方あれば正規名を優先する

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// `emailSubject` が無い場合の件名
pub const DEFAULT_EMAIL_SUBJECT: &str = "Notification from SQS";

/// 通知本文テンプレートの接頭辞
pub const MESSAGE_PREFIX: &str = "Message: ";

/// 通知処理のエラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// ペイロードが不正（プロデューサー側の不具合）
    #[error("ペイロードのデコードに失敗: {0}")]
    DecodeFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// チャネル送信に失敗
    #[error("送信に失敗: {0}")]
    SendFailed(String),
}

impl NotificationError {
    /// 接頭辞を除いた詳細メッセージを返す
    ///
    /// 呼び出し元へ返す `{"error": ...}` にはこちらを使う。
    pub fn detail(&self) -> &str {
        match self {
            Self::DecodeFailed(detail) | Self::TemplateFailed(detail) | Self::SendFailed(detail) => {
                detail
            }
        }
    }
}

/// 通知ペイロード
///
/// すべてのフィールドは任意。必須かどうかはチャネルとレンダラーが判断する。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PayloadWire")]
pub struct NotificationPayload {
    /// 宛先（電話番号またはメールアドレス）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient:       Option<String>,
    /// 本文
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_content: Option<String>,
    /// メール件名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_subject:   Option<String>,
}

/// デコード時のフィールド配置
///
/// 正規名と旧名を別フィールドで受け、両方ある場合は正規名を優先する。
/// 空白のみの値は無いものとして次の候補を見る。
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadWire {
    #[serde(default)]
    recipient:       Option<String>,
    #[serde(default)]
    phone_number:    Option<String>,
    #[serde(default)]
    recipient_email: Option<String>,
    #[serde(default)]
    message_content: Option<String>,
    #[serde(default)]
    message:         Option<String>,
    #[serde(default)]
    email_content:   Option<String>,
    #[serde(default)]
    email_subject:   Option<String>,
}

impl From<PayloadWire> for NotificationPayload {
    fn from(wire: PayloadWire) -> Self {
        let recipient = first_present([wire.recipient, wire.phone_number, wire.recipient_email]);
        let message_content =
            first_present([wire.message_content, wire.message, wire.email_content]);

        Self {
            recipient,
            message_content,
            email_subject: wire.email_subject,
        }
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    let mut fallback = None;
    for candidate in candidates.into_iter().flatten() {
        if !candidate.trim().is_empty() {
            return Some(candidate);
        }
        fallback.get_or_insert(candidate);
    }
    fallback
}

impl NotificationPayload {
    /// キューレコードの本文をデコードする
    ///
    /// 本文は JSON オブジェクトでなければならない。配列や文字列は
    /// フィールド構造を持たないため `DecodeFailed` とする。
    pub fn decode(raw_body: &str) -> Result<Self, NotificationError> {
        let value: serde_json::Value = serde_json::from_str(raw_body)
            .map_err(|e| NotificationError::DecodeFailed(format!("invalid JSON: {e}")))?;

        if !value.is_object() {
            return Err(NotificationError::DecodeFailed(
                "payload must be a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| NotificationError::DecodeFailed(format!("invalid payload: {e}")))
    }

    /// 空白のみでない宛先を返す
    pub fn recipient(&self) -> Option<&str> {
        non_blank(self.recipient.as_deref())
    }

    /// 空白のみでない本文を返す
    pub fn message_content(&self) -> Option<&str> {
        non_blank(self.message_content.as_deref())
    }

    /// 空白のみでない件名を返す
    pub fn email_subject(&self) -> Option<&str> {
        non_blank(self.email_subject.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// レンダリング済みメッセージ
///
/// `subject` はメール宛先の場合にのみ存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// 本文（レンダリング成功時は常に空でない）
    pub body:    String,
    /// 件名
    pub subject: Option<String>,
}

/// 配送チャネル
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryChannel {
    /// SMS 直接送信
    Sms,
    /// トランザクションメール
    Email,
}

/// SMS 送信メッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    /// 送信先電話番号（E.164 形式）
    pub destination: String,
    /// 本文
    pub message:     String,
}

/// メールメッセージ
///
/// ルーターが組み立て、`EmailChannel` に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信元メールアドレス
    pub from:      String,
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// プロバイダの受領 ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{message_id}")]
pub struct ProviderAck {
    pub message_id: String,
}

impl ProviderAck {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
        }
    }
}
