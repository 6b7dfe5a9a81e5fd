//! # notify-relay ドメイン層
//!
//! 通知リレーの中核となる型と純粋関数を定義する。
//!
//! ## 設計方針
//!
//! - **副作用なし**: このクレートはネットワークにも時計にも触れない
//!   （`QueueRecord::received_at` は受信側が埋める）
//! - **全域関数**: 宛先分類は必ず 3 つのいずれかを返し、パニックしない
//! - **結果形状の一元化**: サイクル結果から `{ statusCode, body }` への変換はここで定義する
//!
//! ## 依存関係の方向
//!
//! ```text
//! relay-service → infra → domain
//!        ↘                  ↑
//!          ─────────────────
//! ```
//!
//! ## モジュール構成
//!
//! - [`recipient`] - 宛先識別子の分類（メール / 電話番号 / 不正）
//! - [`notification`] - 通知ペイロード、レンダリング結果、チャネル送信メッセージ
//! - [`queue`] - キューから受信した 1 件のレコード
//! - [`delivery`] - 1 サイクルの結果と呼び出し元へ返す結果形状

pub mod delivery;
pub mod notification;
pub mod queue;
pub mod recipient;

pub use delivery::{DeliveryResult, RelayResponse};
pub use notification::NotificationError;
pub use recipient::{Classification, RecipientKind};
