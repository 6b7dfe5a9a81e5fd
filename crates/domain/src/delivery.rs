//! # 配送結果
//!
//! 1 回のリレーサイクルの結果と、呼び出し元へ返す結果形状を定義する。
//!
//! ## ステータスコード対応
//!
//! | 結果 | statusCode | body |
//! |------|-----------|------|
//! | [`DeliveryResult::Delivered`] | 200 | チャネルごとの確認メッセージ |
//! | [`DeliveryResult::InvalidRecipient`] | 400 | `Invalid email or phone number.` |
//! | [`DeliveryResult::NoWorkFound`] | 404 | `No messages found in SQS queue.` |
//! | [`DeliveryResult::MissingRecipient`] | 404 | `No recipient identifier provided.` |
//! | [`DeliveryResult::DecodeFailed`] ほか失敗 | 500 | `{"error":"<message>"}` |
//!
//! 500 の body は JSON オブジェクトを文字列化したもの。
//! 呼び出し元との互換性のため二重エンコードのまま返す。

use serde::{Deserialize, Serialize};

use crate::notification::{DeliveryChannel, ProviderAck};

pub const NO_WORK_FOUND_BODY: &str = "No messages found in SQS queue.";
pub const MISSING_RECIPIENT_BODY: &str = "No recipient identifier provided.";
pub const INVALID_RECIPIENT_BODY: &str = "Invalid email or phone number.";

/// ブロードキャストトピックへの二次配信の結果
///
/// 一次配送の成否には影響しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryOutcome {
    Published(ProviderAck),
    Failed(String),
}

/// リレーサイクルの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// 配送成功
    Delivered {
        channel:        DeliveryChannel,
        ack:            ProviderAck,
        /// キューからの削除に成功したか（失敗時はリース満了後に再配送される）
        record_deleted: bool,
        secondary:      Option<SecondaryOutcome>,
    },
    /// キューが空
    NoWorkFound,
    /// 宛先がどこからも得られない
    MissingRecipient,
    /// 宛先がメールアドレスにも電話番号にも一致しない
    InvalidRecipient { recipient: String },
    /// ペイロードが不正
    DecodeFailed { reason: String },
    /// チャネル送信の失敗、またはサイクルのタイムアウト
    DeliveryFailed { reason: String },
    /// キューからの受信に失敗
    ReceiveFailed { reason: String },
}

impl DeliveryResult {
    /// HTTP ステータスコード相当の値
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Delivered { .. } => 200,
            Self::InvalidRecipient { .. } => 400,
            Self::NoWorkFound | Self::MissingRecipient => 404,
            Self::DecodeFailed { .. } | Self::DeliveryFailed { .. } | Self::ReceiveFailed { .. } => {
                500
            }
        }
    }

    /// 呼び出し元へ返す body 文字列
    pub fn body(&self) -> String {
        match self {
            Self::Delivered { channel, .. } => match channel {
                DeliveryChannel::Sms => "Message processed and sent via SMS.".to_string(),
                DeliveryChannel::Email => "Message processed and sent via email.".to_string(),
            },
            Self::NoWorkFound => NO_WORK_FOUND_BODY.to_string(),
            Self::MissingRecipient => MISSING_RECIPIENT_BODY.to_string(),
            Self::InvalidRecipient { .. } => INVALID_RECIPIENT_BODY.to_string(),
            Self::DecodeFailed { reason }
            | Self::DeliveryFailed { reason }
            | Self::ReceiveFailed { reason } => error_body(reason),
        }
    }

    /// 結果形状に変換する
    pub fn to_response(&self) -> RelayResponse {
        RelayResponse {
            status_code: self.status_code(),
            body:        self.body(),
        }
    }

    /// レコードがキューから削除されたか
    pub fn record_deleted(&self) -> bool {
        matches!(
            self,
            Self::Delivered {
                record_deleted: true,
                ..
            }
        )
    }
}

fn error_body(reason: &str) -> String {
    serde_json::json!({ "error": reason }).to_string()
}

/// 呼び出し元へ返す結果形状 `{ statusCode, body }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub status_code: u16,
    pub body:        String,
}

impl From<DeliveryResult> for RelayResponse {
    fn from(result: DeliveryResult) -> Self {
        result.to_response()
    }
}
