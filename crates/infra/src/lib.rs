//! # notify-relay インフラ層
//!
//! キューと外部配信サービスとの通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **キュー**: Amazon SQS からの 1 件受信と削除（[`queue`]）
//! - **配信チャネル**: SNS による SMS、SES / SMTP によるメール（[`notification`]）
//! - **SDK 設定**: リージョンとエンドポイントの共通設定（[`aws`]）
//!
//! ## 依存関係
//!
//! ```text
//! relay-service → infra → domain
//! ```
//!
//! プロバイダ固有のエラー型はこのクレートの外に出さない。
//! キューは [`InfraError`]、配信チャネルはドメインの `NotificationError` に変換して返す。

pub mod aws;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod queue;

pub use error::{InfraError, InfraErrorKind, QueueOperation};
pub use notification::{EmailChannel, SmsChannel};
pub use queue::QueueClient;
