//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` で調査しやすいよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! リレーサイクルは結果 1 つにつき必ず 1 イベントを出力する:
//!
//! ```text
//! jq 'select(.["event.action"] | startswith("relay."))'
//! ```
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` / `tracing::warn!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。JSON 出力ではフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側のクレートは `tracing` に依存すること。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID（キューのメッセージ ID など）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        pub const RELAY_DELIVERED: &str = "relay.delivered";
        pub const RELAY_NO_WORK: &str = "relay.no_work";
        pub const RELAY_MISSING_RECIPIENT: &str = "relay.missing_recipient";
        pub const RELAY_INVALID_RECIPIENT: &str = "relay.invalid_recipient";
        pub const RELAY_DECODE_FAILED: &str = "relay.decode_failed";
        pub const RELAY_DELIVERY_FAILED: &str = "relay.delivery_failed";
        pub const RELAY_RECEIVE_FAILED: &str = "relay.receive_failed";
        pub const RELAY_DELETION_FAILED: &str = "relay.deletion_failed";
        pub const TOPIC_PUBLISH_FAILED: &str = "relay.topic_publish_failed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const QUEUE_RECORD: &str = "queue_record";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// キュー操作（受信・削除・疎通確認）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部配信サービス呼び出し（SNS、SES、SMTP）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const QUEUE: &str = "queue";
        pub const DELIVERY: &str = "delivery";
        pub const PAYLOAD: &str = "payload";
        pub const TIMEOUT: &str = "timeout";
    }
}

#[cfg(test)]
mod tests {
    use super::event;

    #[test]
    fn test_リレーのアクションはすべてrelay接頭辞を持つ() {
        let actions = [
            event::action::RELAY_DELIVERED,
            event::action::RELAY_NO_WORK,
            event::action::RELAY_MISSING_RECIPIENT,
            event::action::RELAY_INVALID_RECIPIENT,
            event::action::RELAY_DECODE_FAILED,
            event::action::RELAY_DELIVERY_FAILED,
            event::action::RELAY_RECEIVE_FAILED,
            event::action::RELAY_DELETION_FAILED,
            event::action::TOPIC_PUBLISH_FAILED,
        ];

        for action in actions {
            assert!(action.starts_with("relay."), "{action}");
        }
    }

    #[test]
    fn test_マクロはsubscriberなしでもパニックしない() {
        crate::log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::RELAY_NO_WORK,
            event.result = event::result::SKIPPED,
            "キューは空"
        );
    }
}
