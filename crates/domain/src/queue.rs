//! # キューレコード
//!
//! キューから受信した 1 件のメッセージと、リレーサイクルの識別子を定義する。
//!
//! レコードは受信後に変更されない。配送が確認されたときだけ
//! [`ReceiptHandle`] を使って削除される。

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// リレーサイクル ID
///
/// 1 回の起動（1 サイクル）ごとに UUID v7 で採番し、トレーシングスパンに付与する。
/// 時刻順に並ぶため、ログをサイクル順に追える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct CycleId(Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

/// 受信ハンドル
///
/// キュープロバイダが受信ごとに発行する不透明な文字列。削除に必要。
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
#[display("{_0}")]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// キューから受信した 1 件のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    /// 削除用の受信ハンドル
    pub receipt:     ReceiptHandle,
    /// プロバイダのメッセージ ID（ログ用）
    pub message_id:  Option<String>,
    /// シリアライズされたペイロード
    pub raw_body:    String,
    /// 受信時刻（ログ用）
    pub received_at: DateTime<Utc>,
}
