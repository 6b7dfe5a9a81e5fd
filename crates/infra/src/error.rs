//! # インフラ層エラー定義
//!
//! キュー操作で発生するエラーを表現する。
//! 配信チャネルの失敗はドメインの `NotificationError` で返すため、ここには含めない。
//!
//! ## 設計方針
//!
//! - **struct + enum**: [`InfraError`] が種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持する
//! - **生成時に SpanTrace を捕捉**: convenience constructor 経由でのみ生成し、
//!   どのリレーサイクルで失敗したかをログから辿れるようにする
//! - **SDK エラーは文字列化**: アダプタ境界で `DisplayErrorContext` を通して渡す
//! - **詳細とログ表示を分ける**: [`detail()`](InfraError::detail) はプロバイダの文言だけ、
//!   `Display` は操作名の接頭辞付き

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// キュー操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum QueueOperation {
    #[display("受信")]
    Receive,
    #[display("削除")]
    Delete,
    #[display("疎通確認")]
    Connectivity,
}

/// インフラ層で発生するエラー
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Queue { operation: QueueOperation::Delete, .. } => { /* 再配送を許容 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// キュー操作の失敗
    #[error("キューの{operation}に失敗: {message}")]
    Queue {
        operation: QueueOperation,
        message:   String,
    },

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 接頭辞を除いた詳細メッセージ
    ///
    /// 呼び出し元へ返す `{"error": ...}` に使う。
    pub fn detail(&self) -> String {
        match &self.kind {
            InfraErrorKind::Queue { message, .. } | InfraErrorKind::Unexpected(message) => {
                message.clone()
            }
        }
    }

    pub fn queue(operation: QueueOperation, message: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Queue {
            operation,
            message: message.into(),
        })
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(message.into()))
    }

    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}
